use crate::error::{Error, Result};

pub const API_VERSION: &str = "v2";
pub const APPLICATION_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const IDENTITY_HOST: &str = "api.amazon.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub code: &'static str,
    pub production: &'static str,
    pub sandbox: &'static str,
    pub token: &'static str,
}

const REGIONS: &[Region] = &[
    Region {
        code: "na",
        production: "advertising-api.amazon.com",
        sandbox: "advertising-api-test.amazon.com",
        token: "api.amazon.com/auth/o2/token",
    },
    Region {
        code: "eu",
        production: "advertising-api-eu.amazon.com",
        sandbox: "advertising-api-test.amazon.com",
        token: "api.amazon.co.uk/auth/o2/token",
    },
    Region {
        code: "fe",
        production: "advertising-api-fe.amazon.com",
        sandbox: "advertising-api-test.amazon.com",
        token: "api.amazon.co.jp/auth/o2/token",
    },
];

/// Hosts for one region, already normalized to absolute URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionEndpoints {
    pub base_url: String,
    pub token_url: String,
}

pub fn regions() -> &'static [Region] {
    REGIONS
}

pub fn find_region(code: &str) -> Option<&'static Region> {
    let code = code.trim();
    REGIONS.iter().find(|r| r.code.eq_ignore_ascii_case(code))
}

pub fn resolve(region: &str, sandbox: bool) -> Result<RegionEndpoints> {
    let region = find_region(region).ok_or_else(|| Error::config(format!("invalid region {region:?}")))?;
    let host = if sandbox { region.sandbox } else { region.production };
    Ok(RegionEndpoints {
        base_url: normalize_endpoint(host),
        token_url: normalize_endpoint(region.token),
    })
}

pub fn user_agent() -> String {
    format!("AdvertisingAPI Rust Client Library v{APPLICATION_VERSION}")
}

pub(crate) fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.to_string();
    }
    format!("https://{}", endpoint)
}

pub(crate) fn versioned(base: &str, api_version: &str) -> String {
    let base = base.trim_end_matches('/');
    let version = api_version.trim().trim_matches('/');
    if version.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base, version)
}
