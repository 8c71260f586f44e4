use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use amazon_ads::{AdsClient, ApiRequest, ClientConfig, Error, ResponseKind};
use flate2::Compression;
use flate2::write::GzEncoder;
use reqwest::Method;
use serde_json::{Value, json};
use wiremock::matchers::{body_string, body_string_contains, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const CLIENT_ID: &str = "amzn1.application-oa2-client.0123456789abcdef0123456789abcdef";
const SECRET: &str = "fedcba9876543210fedcba9876543210fedcba9876543210fedcba9876543210";
const REPORT: &str = r#"[{"campaignId":111,"impressions":42,"clicks":3}]"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(server: &MockServer) -> ClientConfig {
    init_logging();
    ClientConfig::new(CLIENT_ID, SECRET, "na")
        .with_access_token("Atza|initial")
        .with_refresh_token("Atzr|refresh")
        .with_endpoint(server.uri())
        .with_token_endpoint(format!("{}/auth/o2/token", server.uri()))
        .with_identity_endpoint(server.uri())
}

async fn connect(server: &MockServer) -> AdsClient {
    AdsClient::connect(config(server)).await.unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

async fn received(server: &MockServer, route: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == route)
        .collect()
}

fn header_of<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

async fn mount_report_redirect(server: &MockServer, status: u16, body: Vec<u8>, hits: u64) {
    Mock::given(method("GET"))
        .and(path("/v2/reports/amzn1.report.1/download"))
        .respond_with(
            ResponseTemplate::new(307).insert_header("Location", format!("{}/files/report.json.gz", server.uri())),
        )
        .expect(hits)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/report.json.gz"))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(body))
        .expect(hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn bootstrap_refresh_populates_access_token() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/o2/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=Atzr%7Cabc"))
        .and(body_string_contains(format!("client_id={CLIENT_ID}")))
        .and(body_string_contains(format!("client_secret={SECRET}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "Atza|fresh",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/profiles"))
        .and(header("authorization", "bearer Atza|fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.access_token = None;
    config.refresh_token = Some("Atzr%7Cabc".to_string());
    let client = AdsClient::connect(config).await?;
    assert_eq!(client.access_token(), "Atza|fresh");

    let response = client.call("listProfiles", &[], None).await?;
    assert!(response.success);
    Ok(())
}

#[tokio::test]
async fn failed_bootstrap_refresh_fails_construction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/o2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "The request has an invalid grant parameter"
        })))
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.access_token = None;
    let err = AdsClient::connect(config).await.unwrap_err();
    match err {
        Error::Authentication { status, body, .. } => {
            assert_eq!(status, Some(400));
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn invalid_config_never_touches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut bad_id = config(&server);
    bad_id.client_id = "amzn1.application-oa2-client.nothex".into();
    assert!(AdsClient::connect(bad_id).await.unwrap_err().is_configuration());

    let mut bad_region = config(&server);
    bad_region.region = "xx".into();
    assert!(AdsClient::connect(bad_region).await.unwrap_err().is_configuration());

    let mut no_tokens = config(&server);
    no_tokens.access_token = None;
    no_tokens.refresh_token = None;
    assert!(AdsClient::connect(no_tokens).await.unwrap_err().is_configuration());
}

#[tokio::test]
async fn explicit_refresh_replaces_bearer_token() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/o2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "X"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/o2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/profiles"))
        .and(header("authorization", "bearer X"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let grant = client.refresh_access_token().await?;
    assert_eq!(grant.access_token, "X");
    assert_eq!(client.access_token(), "X");
    client.call("listProfiles", &[], None).await?;

    let err = client.refresh_access_token().await.unwrap_err();
    assert!(err.is_authentication());
    assert_eq!(client.access_token(), "X");
    Ok(())
}

#[tokio::test]
async fn refresh_tolerates_odd_optional_fields() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/o2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "Atza|stringy",
            "token_type": null,
            "expires_in": "3600"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let grant = client.refresh_access_token().await?;
    assert_eq!(grant.expires_in, Some(3600));
    assert_eq!(grant.token_type, None);
    assert_eq!(client.access_token(), "Atza|stringy");
    Ok(())
}

#[tokio::test]
async fn non_json_token_response_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/o2/token"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html><body>Service Unavailable</body></html>"))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    match client.refresh_access_token().await.unwrap_err() {
        Error::Authentication { message, status, body } => {
            assert!(message.contains("not JSON"));
            assert_eq!(status, Some(503));
            assert!(body.contains("Service Unavailable"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(client.access_token(), "Atza|initial");
}

#[tokio::test]
async fn composes_standard_headers_with_caller_precedence() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/profiles"))
        .and(header("authorization", "bearer Atza|initial"))
        .and(header("amazon-advertising-api-clientid", CLIENT_ID))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(2)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    client.execute(ApiRequest::get("profiles")).await?;
    client
        .execute(ApiRequest::get("/profiles").with_header("Content-Type", "text/plain"))
        .await?;

    let requests = received(&server, "/v2/profiles").await;
    assert_eq!(requests.len(), 2);
    assert_eq!(header_of(&requests[0], "content-type"), Some("application/json"));
    assert_eq!(header_of(&requests[1], "content-type"), Some("text/plain"));
    assert!(header_of(&requests[0], "user-agent").unwrap().starts_with("AdvertisingAPI Rust Client Library v"));
    assert!(header_of(&requests[0], "amazon-advertising-api-scope").is_none());
    Ok(())
}

#[tokio::test]
async fn profile_scope_is_added_and_removed() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/sd/campaigns/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"campaignId": 77})))
        .expect(2)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    client.set_profile_id("3456789012");
    assert_eq!(client.profile_id().as_deref(), Some("3456789012"));
    client.call("getSponsoredDisplayCampaign", &["77"], None).await?;
    client.clear_profile_id();
    client.call("getSponsoredDisplayCampaign", &["77"], None).await?;

    let requests = received(&server, "/v2/sd/campaigns/77").await;
    assert_eq!(header_of(&requests[0], "amazon-advertising-api-scope"), Some("3456789012"));
    assert!(header_of(&requests[1], "amazon-advertising-api-scope").is_none());
    Ok(())
}

#[tokio::test]
async fn get_params_become_encoded_query() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/sd/campaigns"))
        .and(query_param("stateFilter", "enabled,paused"))
        .and(query_param("name", "summer sale"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let params = json!({"stateFilter": "enabled,paused", "name": "summer sale", "count": 5});
    let response = client.call("listSponsoredDisplayCampaigns", &[], Some(params)).await?;
    assert!(response.success);

    let requests = received(&server, "/v2/sd/campaigns").await;
    assert_eq!(
        requests[0].url.query(),
        Some("stateFilter=enabled%2Cpaused&name=summer%20sale&count=5")
    );
    assert!(requests[0].body.is_empty());
    Ok(())
}

#[tokio::test]
async fn body_methods_send_exact_json() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let expected = r#"[{"name":"Display Q3","budget":12.5,"state":"enabled"}]"#;
    Mock::given(method("POST"))
        .and(path("/v2/sd/campaigns"))
        .and(body_string(expected))
        .respond_with(ResponseTemplate::new(207).set_body_json(json!([{"code": "SUCCESS", "campaignId": 1}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v2/sd/campaigns"))
        .and(body_string(r#"[{"campaignId":1,"state":"paused"}]"#))
        .respond_with(ResponseTemplate::new(207).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let body: Value = serde_json::from_str(expected)?;
    let created = client.call("createSponsoredDisplayCampaigns", &[], Some(body)).await?;
    assert!(created.success);
    assert_eq!(created.code, 207);
    let parsed: Value = created.json()?;
    assert_eq!(parsed[0]["campaignId"], 1);

    let patch = json!([{"campaignId": 1, "state": "paused"}]);
    client
        .call("update-partial-sponsored-display-campaigns", &[], Some(patch))
        .await?;

    let requests = received(&server, "/v2/sd/campaigns").await;
    assert!(requests.iter().all(|r| r.url.query().is_none()));
    Ok(())
}

#[tokio::test]
async fn empty_params_send_no_body() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/sd/campaigns/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "SUCCESS", "campaignId": 9})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    client.call("archiveSponsoredDisplayCampaign", &["9"], None).await?;
    client
        .execute(ApiRequest::put("profiles").with_params(json!({})))
        .await?;

    for route in ["/v2/sd/campaigns/9", "/v2/profiles"] {
        let requests = received(&server, route).await;
        assert_eq!(requests.len(), 1);
        assert!(requests[0].body.is_empty(), "{route} carried a body");
    }
    Ok(())
}

#[tokio::test]
async fn http_failures_are_envelopes_not_errors() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/sd/adGroups/5"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "NOT_FOUND",
            "details": "Ad group not found",
            "requestId": "5M6JQ0XWZ1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/sd/adGroups"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/profiles/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-amz-request-id", "OK-REQ-1")
                .set_body_json(json!({"profileId": 1})),
        )
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let missing = client.call("getSponsoredDisplayAdGroup", &["5"], None).await?;
    assert!(!missing.success);
    assert_eq!(missing.code, 404);
    assert_eq!(missing.request_id, "5M6JQ0XWZ1");
    assert!(missing.text().unwrap().contains("Ad group not found"));

    let throttled = client.call("listSponsoredDisplayAdGroups", &[], None).await?;
    assert!(!throttled.success);
    assert_eq!(throttled.code, 429);
    assert_eq!(throttled.request_id, "0");

    let found = client.call("getProfile", &["1"], None).await?;
    assert!(found.success);
    assert_eq!(found.request_id, "OK-REQ-1");
    Ok(())
}

#[tokio::test]
async fn redirect_downloads_and_inflates_report_inline() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_report_redirect(&server, 200, gzip(REPORT.as_bytes()), 2).await;

    let client = connect(&server).await;
    client.set_profile_id("42");
    let response = client.call("downloadReport", &["amzn1.report.1"], None).await?;
    assert!(response.success);
    assert_eq!(response.code, 200);
    assert_eq!(response.kind(), ResponseKind::Inline);
    assert_eq!(response.text(), Some(REPORT));

    client.clear_profile_id();
    let response = client.call("downloadReport", &["amzn1.report.1"], None).await?;
    assert_eq!(response.text(), Some(REPORT));

    let download = received(&server, "/files/report.json.gz").await;
    assert_eq!(download.len(), 2);
    assert!(header_of(&download[0], "authorization").is_none());
    assert_eq!(header_of(&download[0], "amazon-advertising-api-scope"), Some("42"));
    assert!(header_of(&download[1], "authorization").is_none());
    assert!(header_of(&download[1], "amazon-advertising-api-scope").is_none());
    Ok(())
}

#[tokio::test]
async fn redirect_saves_report_to_disk_and_removes_archive() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_report_redirect(&server, 200, gzip(REPORT.as_bytes()), 1).await;
    let dir = tempfile::tempdir()?;

    let config = config(&server).with_save_file(true).with_download_dir(dir.path());
    let client = AdsClient::connect(config).await?;
    let response = client.call("downloadReport", &["amzn1.report.1"], None).await?;

    assert!(response.success);
    assert_eq!(response.kind(), ResponseKind::File);
    let saved = response.path().unwrap();
    assert_eq!(saved.parent(), Some(dir.path()));
    assert_eq!(saved.extension().and_then(|e| e.to_str()), Some("json"));
    assert_eq!(std::fs::read_to_string(saved)?, REPORT);
    let rows: Value = response.json()?;
    assert_eq!(rows[0]["clicks"], 3);

    let names = files_in(dir.path());
    assert_eq!(names.len(), 1);
    assert!(names.iter().all(|n| !n.ends_with(".gz")));
    Ok(())
}

#[tokio::test]
async fn failed_redirect_fetch_is_returned_without_decompression() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let denied = b"<Error><Code>AccessDenied</Code></Error>".to_vec();
    mount_report_redirect(&server, 403, denied, 1).await;

    let client = connect(&server).await;
    let response = client.call("downloadReport", &["amzn1.report.1"], None).await?;
    assert!(!response.success);
    assert_eq!(response.code, 403);
    assert_eq!(response.kind(), ResponseKind::Inline);
    assert!(response.text().unwrap().contains("AccessDenied"));
    assert_eq!(response.request_id, "0");
    Ok(())
}

#[tokio::test]
async fn failed_redirect_fetch_leaves_no_files_in_save_mode() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_report_redirect(&server, 500, b"upstream error".to_vec(), 1).await;
    let dir = tempfile::tempdir()?;

    let config = config(&server).with_save_file(true).with_download_dir(dir.path());
    let client = AdsClient::connect(config).await?;
    let response = client.call("downloadReport", &["amzn1.report.1"], None).await?;
    assert!(!response.success);
    assert_eq!(response.code, 500);
    assert_eq!(response.text(), Some("upstream error"));
    assert!(files_in(dir.path()).is_empty());
    Ok(())
}

async fn mount_unreachable_redirect(server: &MockServer) {
    // Nothing listens on the discard port.
    Mock::given(method("GET"))
        .and(path("/v2/reports/amzn1.report.1/download"))
        .respond_with(ResponseTemplate::new(307).insert_header("Location", "http://127.0.0.1:9/file.json.gz"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn unreachable_redirect_target_is_a_failure_envelope() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_unreachable_redirect(&server).await;

    let client = connect(&server).await;
    let response = client.call("downloadReport", &["amzn1.report.1"], None).await?;
    assert!(!response.success);
    assert_eq!(response.code, 0);
    assert_eq!(response.request_id, "0");
    assert_eq!(response.info.url, "http://127.0.0.1:9/file.json.gz");
    assert!(!response.text().unwrap_or_default().is_empty());
    Ok(())
}

#[tokio::test]
async fn unreachable_redirect_target_leaves_no_files_in_save_mode() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_unreachable_redirect(&server).await;
    let dir = tempfile::tempdir()?;

    let config = config(&server).with_save_file(true).with_download_dir(dir.path());
    let client = AdsClient::connect(config).await?;
    let response = client.call("downloadReport", &["amzn1.report.1"], None).await?;
    assert!(!response.success);
    assert_eq!(response.code, 0);
    assert_eq!(response.kind(), ResponseKind::Inline);
    assert!(files_in(dir.path()).is_empty());
    Ok(())
}

#[tokio::test]
async fn corrupt_archive_is_an_error_and_leaves_no_files() {
    let server = MockServer::start().await;
    mount_report_redirect(&server, 200, b"definitely not gzip".to_vec(), 1).await;
    let dir = tempfile::tempdir().unwrap();

    let config = config(&server).with_save_file(true).with_download_dir(dir.path());
    let client = AdsClient::connect(config).await.unwrap();
    let err = client
        .call("downloadReport", &["amzn1.report.1"], None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decompress(_)));
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn user_profile_uses_identity_host() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .and(header("authorization", "bearer Atza|initial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "amzn1.account.ABC",
            "email": "ads@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let response = client.user_profile().await?;
    assert!(response.success);
    let profile: Value = response.json()?;
    assert_eq!(profile["email"], "ads@example.com");
    Ok(())
}

#[tokio::test]
async fn report_request_picks_prefix_from_campaign_type() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/hsa/keywords/report"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "reportId": "amzn1.report.1",
            "status": "IN_PROGRESS"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/sp/campaigns/snapshot"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"snapshotId": "s1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let params = json!({
        "campaignType": "sponsoredBrands",
        "reportDate": "20240101",
        "metrics": "impressions,clicks"
    });
    let report = client.request_report("keywords", params).await?;
    assert!(report.success);
    assert_eq!(report.code, 202);
    let snapshot = client.request_snapshot("campaigns", None).await?;
    assert!(snapshot.success);
    Ok(())
}

#[tokio::test]
async fn misuse_is_rejected_before_dispatch() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let err = client
        .execute(ApiRequest::new(Method::TRACE, "profiles"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedMethod(_)));

    let err = client.call("getSponsoredDisplayCampaign", &[], None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidParams(_)));

    let err = client.call("createSponsoredDisplayCampaigns", &[], None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidParams(_)));

    let err = client.call("noSuchOperation", &[], None).await.unwrap_err();
    assert!(matches!(err, Error::UnknownOperation(_)));

    let err = client
        .execute(ApiRequest::get("sd/campaigns").with_params(json!(["a"])))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParams(_)));
}

#[tokio::test]
async fn shared_client_serves_concurrent_callers() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(8)
        .mount(&server)
        .await;

    let client = Arc::new(connect(&server).await);
    let mut tasks = Vec::new();
    for i in 0..8 {
        let client = Arc::clone(&client);
        tasks.push(tokio::spawn(async move {
            client.set_profile_id(i.to_string());
            client.call("listProfiles", &[], None).await
        }));
    }
    for task in tasks {
        assert!(task.await??.success);
    }
    Ok(())
}
