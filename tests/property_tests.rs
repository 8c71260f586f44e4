use amazon_ads::ClientConfig;
use amazon_ads::executor::query_string;
use amazon_ads::resources::operations;
use amazon_ads::response::is_success;
use proptest::prelude::*;
use serde_json::{Map, Value};

proptest! {
    #[test]
    fn query_has_one_encoded_pair_per_param(
        params in proptest::collection::btree_map("[a-zA-Z][a-zA-Z0-9]{0,8}", "\\PC*", 1..8)
    ) {
        let map: Map<String, Value> = params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        let query = query_string(&map);

        prop_assert!(!query.ends_with('&'));
        let pairs: Vec<&str> = query.split('&').collect();
        prop_assert_eq!(pairs.len(), params.len());
        for (pair, (key, value)) in pairs.iter().zip(params.iter()) {
            let (k, v) = pair.split_once('=').unwrap();
            prop_assert_eq!(k, key.as_str());
            prop_assert!(!v.contains('&') && !v.contains('=') && !v.contains(' '));
            prop_assert_eq!(urlencoding::decode(v).unwrap().into_owned(), value.clone());
        }
    }

    #[test]
    fn success_iff_first_digit_is_two_or_three(code in 100u16..1000) {
        let first = code / 100;
        prop_assert_eq!(is_success(code), first == 2 || first == 3);
    }

    #[test]
    fn every_templated_path_renders_ids(id in 1u64..u64::MAX) {
        let id = id.to_string();
        for op in operations() {
            let ids = vec![id.as_str(); op.arity()];
            let path = op.render_path(&ids).unwrap();
            let rendered = !path.contains("{}");
            prop_assert!(rendered, "unrendered slot in {}", path);
            if op.arity() > 0 {
                prop_assert!(path.contains(&id));
            }
        }
    }

    #[test]
    fn construction_rejects_malformed_client_ids(suffix in "[0-9a-f]{0,31}|[0-9a-f]{33,40}|[g-z]{32}") {
        let config = ClientConfig::new(
            format!("amzn1.application-oa2-client.{suffix}"),
            "0".repeat(64),
            "na",
        )
        .with_access_token("Atza|token");
        prop_assert!(config.validate().is_err());
    }

    #[test]
    fn construction_accepts_well_formed_credentials(
        id in "[0-9a-f]{32}",
        secret in "[0-9a-f]{64}",
        region in "(?i)na|eu|fe",
        token in "Atza(\\||%7C|%7c)[A-Za-z0-9]{1,20}",
    ) {
        let config = ClientConfig::new(format!("amzn1.application-oa2-client.{id}"), secret, region)
            .with_access_token(token);
        prop_assert!(config.validate().is_ok());
    }
}
