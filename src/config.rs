use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::regions::{self, API_VERSION};

static CLIENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^amzn1\.application-oa2-client\.[0-9a-f]{32}$").expect("valid regex"));
static CLIENT_SECRET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-f]{64}$").expect("valid regex"));
static ACCESS_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Atza(\||%7C|%7c)").expect("valid regex"));
static REFRESH_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Atzr(\||%7C|%7c)").expect("valid regex"));

/// Construction options for [`AdsClient`](crate::AdsClient).
///
/// Deserializes from camelCase keys; any key not listed here is rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub region: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub sandbox: bool,
    #[serde(default)]
    pub save_file: bool,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Accepted for compatibility. Downloaded archives are always removed.
    #[serde(default)]
    pub delete_gzip_file: bool,
    /// Whole-request timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub token_endpoint: Option<String>,
    #[serde(default)]
    pub identity_endpoint: Option<String>,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

impl ClientConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            region: region.into(),
            access_token: None,
            refresh_token: None,
            sandbox: false,
            save_file: false,
            api_version: default_api_version(),
            delete_gzip_file: false,
            timeout_ms: None,
            connect_timeout_ms: None,
            download_dir: None,
            endpoint: None,
            token_endpoint: None,
            identity_endpoint: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn with_save_file(mut self, save_file: bool) -> Self {
        self.save_file = save_file;
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(millis(timeout));
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(millis(timeout));
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_identity_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.identity_endpoint = Some(endpoint.into());
        self
    }

    /// Reads the `AMAZON_ADS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).ok_or_else(|| Error::config(format!("{key} missing")));

        let mut config = Self::new(
            required("AMAZON_ADS_CLIENT_ID")?,
            required("AMAZON_ADS_CLIENT_SECRET")?,
            required("AMAZON_ADS_REGION")?,
        );
        config.access_token = get("AMAZON_ADS_ACCESS_TOKEN");
        config.refresh_token = get("AMAZON_ADS_REFRESH_TOKEN");
        if let Some(value) = get("AMAZON_ADS_SANDBOX") {
            config.sandbox = parse_flag("AMAZON_ADS_SANDBOX", &value)?;
        }
        if let Some(value) = get("AMAZON_ADS_SAVE_FILE") {
            config.save_file = parse_flag("AMAZON_ADS_SAVE_FILE", &value)?;
        }
        if let Some(version) = lookup("AMAZON_ADS_API_VERSION") {
            config.api_version = version.trim().to_string();
        }
        if let Some(value) = get("AMAZON_ADS_TIMEOUT") {
            let secs = value
                .parse::<u64>()
                .map_err(|_| Error::config(format!("invalid value for AMAZON_ADS_TIMEOUT: {value}")))?;
            config.timeout_ms = Some(secs.saturating_mul(1000));
        }
        config.endpoint = get("AMAZON_ADS_ENDPOINT");
        config.download_dir = get("AMAZON_ADS_DOWNLOAD_DIR").map(PathBuf::from);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !CLIENT_ID.is_match(&self.client_id) {
            return Err(Error::config("invalid parameter value for clientId"));
        }
        if !CLIENT_SECRET.is_match(&self.client_secret) {
            return Err(Error::config("invalid parameter value for clientSecret"));
        }
        if regions::find_region(&self.region).is_none() {
            return Err(Error::config(format!("invalid region {:?}", self.region)));
        }
        if let Some(token) = self.access_token.as_deref() {
            validate_access_token(token)?;
        }
        if let Some(token) = self.refresh_token.as_deref() {
            if !REFRESH_TOKEN.is_match(token) {
                return Err(Error::config("invalid parameter value for refreshToken"));
            }
        }
        if self.access_token.is_none() && self.refresh_token.is_none() {
            return Err(Error::config("either accessToken or refreshToken is required"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}

pub(crate) fn validate_access_token(token: &str) -> Result<()> {
    if !ACCESS_TOKEN.is_match(token) {
        return Err(Error::config("invalid parameter value for accessToken"));
    }
    Ok(())
}

fn millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(Error::config(format!("invalid value for {key}: {value}"))),
    }
}
