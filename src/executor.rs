use std::fs::OpenOptions;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use flate2::read::GzDecoder;
use log::{debug, warn};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde_json::{Map, Value};
use tokio::fs::File;

use crate::auth::{TokenGrant, TokenManager};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::regions::{self, IDENTITY_HOST};
use crate::response::{ApiResponse, ResponseBody, is_success};
use crate::transport::{HttpRequest, Payload, Transport};

pub const HEADER_CLIENT_ID: &str = "Amazon-Advertising-API-ClientId";
pub const HEADER_SCOPE: &str = "Amazon-Advertising-API-Scope";

const REPORT_PREFIX: &str = "amzn_ads_";
const REPORT_SUFFIX: &str = ".json.gz";

/// Which host a request path is joined onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Base {
    #[default]
    Api,
    /// The Login with Amazon host serving `user/profile`.
    Identity,
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub base: Base,
    pub path: String,
    pub method: Method,
    pub params: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            base: Base::Api,
            path: path.into(),
            method,
            params: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_base(mut self, base: Base) -> Self {
        self.base = base;
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Shared request core: headers, URL building, dispatch and the report
/// redirect path.
#[derive(Debug)]
pub struct Executor {
    transport: Transport,
    tokens: TokenManager,
    base_url: String,
    token_url: String,
    identity_url: String,
    user_agent: String,
    profile_id: RwLock<Option<String>>,
    save_file: bool,
    download_dir: PathBuf,
}

impl Executor {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let region = regions::resolve(&config.region, config.sandbox)?;
        let host = config
            .endpoint
            .as_deref()
            .map(regions::normalize_endpoint)
            .unwrap_or(region.base_url);
        let token_url = config
            .token_endpoint
            .as_deref()
            .map(regions::normalize_endpoint)
            .unwrap_or(region.token_url);
        let identity_url = regions::normalize_endpoint(config.identity_endpoint.as_deref().unwrap_or(IDENTITY_HOST));

        Ok(Self {
            transport: Transport::new(config.timeout(), config.connect_timeout())?,
            tokens: TokenManager::new(
                config.client_id.clone(),
                config.client_secret.clone(),
                config.access_token.clone(),
                config.refresh_token.clone(),
            ),
            base_url: regions::versioned(&host, &config.api_version),
            token_url,
            identity_url,
            user_agent: regions::user_agent(),
            profile_id: RwLock::new(None),
            save_file: config.save_file,
            download_dir: config.download_dir.clone().unwrap_or_else(std::env::temp_dir),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn profile_id(&self) -> Option<String> {
        self.profile_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_profile_id(&self, profile_id: Option<String>) {
        *self.profile_id.write().unwrap_or_else(PoisonError::into_inner) = profile_id;
    }

    pub async fn refresh_access_token(&self) -> Result<TokenGrant> {
        self.tokens
            .refresh(&self.transport, &self.token_url, &self.user_agent)
            .await
    }

    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let method = normalize_method(&request.method)?;
        let mut url = join_url(self.root(request.base), &request.path);
        let mut payload = None;

        if method == Method::GET {
            if let Some(query) = query_params(request.params.as_ref())? {
                url.push('?');
                url.push_str(&query_string(query));
            }
        } else if let Some(params) = request.params.as_ref().filter(|p| !is_empty(p)) {
            payload = Some(Payload::Json(serde_json::to_string(params)?));
        }

        let mut http = HttpRequest::new(method, url);
        http.headers = self.compose_headers(&request.headers)?;
        http.payload = payload;
        debug!("{} {}", http.method, http.url);

        let raw = self.transport.send(http).await?;
        if raw.status == 307 {
            match raw.redirect_url.as_deref() {
                Some(location) => return self.download(location).await,
                None => warn!("307 from {} without a Location header", raw.url),
            }
        }
        Ok(ApiResponse::from_raw(raw))
    }

    fn root(&self, base: Base) -> &str {
        match base {
            Base::Api => &self.base_url,
            Base::Identity => &self.identity_url,
        }
    }

    fn compose_headers(&self, extra: &[(String, String)]) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            header_value(AUTHORIZATION.as_str(), &format!("bearer {}", self.tokens.bearer().trim()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, header_value(USER_AGENT.as_str(), &self.user_agent)?);
        headers.insert(
            HeaderName::from_static("amazon-advertising-api-clientid"),
            header_value(HEADER_CLIENT_ID, self.tokens.client_id())?,
        );
        self.insert_scope(&mut headers)?;

        for (name, value) in extra {
            let key = HeaderName::from_bytes(name.as_bytes()).map_err(|_| Error::InvalidHeader(name.clone()))?;
            headers.insert(key, header_value(name, value)?);
        }
        Ok(headers)
    }

    fn insert_scope(&self, headers: &mut HeaderMap) -> Result<()> {
        if let Some(profile_id) = self.profile_id() {
            headers.insert(
                HeaderName::from_static("amazon-advertising-api-scope"),
                header_value(HEADER_SCOPE, &profile_id)?,
            );
        }
        Ok(())
    }

    /// The redirect target is pre-signed, so no Authorization header is sent.
    async fn download(&self, location: &str) -> Result<ApiResponse> {
        debug!("following report redirect to {location}");
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(USER_AGENT.as_str(), &self.user_agent)?);
        self.insert_scope(&mut headers)?;

        let mut request = HttpRequest::new(Method::GET, location);
        request.headers = headers;

        if self.save_file {
            return self.save_report(request).await;
        }

        let raw = match self.transport.fetch(request).await {
            Ok(raw) => raw,
            Err(Error::Http(err)) => return Ok(ApiResponse::unreachable(location, err.to_string())),
            Err(err) => return Err(err),
        };
        if !is_success(raw.status) {
            return Ok(ApiResponse::from_raw(raw));
        }
        let compressed = raw.body.clone();
        let text = tokio::task::spawn_blocking(move || gunzip(&compressed))
            .await
            .map_err(io::Error::other)??;
        Ok(ApiResponse::with_body(raw, ResponseBody::Inline(text)))
    }

    /// Streams the archive into a unique temp file and extracts it next to
    /// it. The archive is removed on every path when `archive` drops.
    async fn save_report(&self, request: HttpRequest) -> Result<ApiResponse> {
        let archive = tempfile::Builder::new()
            .prefix(REPORT_PREFIX)
            .suffix(REPORT_SUFFIX)
            .tempfile_in(&self.download_dir)?;
        let location = request.url.clone();
        let mut file = File::from_std(archive.as_file().try_clone()?);
        let fetched = self.transport.fetch_to(request, &mut file).await;
        drop(file);
        let raw = match fetched {
            Ok(raw) => raw,
            Err(Error::Http(err)) => return Ok(ApiResponse::unreachable(&location, err.to_string())),
            Err(err) => return Err(err),
        };

        if !is_success(raw.status) {
            return Ok(ApiResponse::from_raw(raw));
        }

        let source = archive.path().to_path_buf();
        let target = extracted_path(&source);
        let output = target.clone();
        tokio::task::spawn_blocking(move || extract(&source, &output))
            .await
            .map_err(io::Error::other)??;
        archive.close()?;

        debug!("report saved to {}", target.display());
        Ok(ApiResponse::with_body(raw, ResponseBody::File(target)))
    }
}

fn normalize_method(method: &Method) -> Result<Method> {
    match method.as_str().to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        _ => Err(Error::UnsupportedMethod(method.to_string())),
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader(name.to_string()))
}

fn join_url(root: &str, path: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Null, `{}` and `[]` all mean "no parameters".
pub fn is_empty(params: &Value) -> bool {
    match params {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn query_params(params: Option<&Value>) -> Result<Option<&Map<String, Value>>> {
    match params {
        None => Ok(None),
        Some(value) if is_empty(value) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(Error::InvalidParams(format!(
            "GET parameters must be a JSON object, got {other}"
        ))),
    }
}

/// `key=value` pairs joined by `&`; values are percent-encoded, keys are not.
pub fn query_string(params: &Map<String, Value>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&query_value(value))))
        .collect::<Vec<_>>()
        .join("&")
}

fn query_value(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(query_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn gunzip(data: &[u8]) -> Result<String> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(Error::Decompress)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn extracted_path(archive: &Path) -> PathBuf {
    archive.with_extension("")
}

fn extract(source: &Path, target: &Path) -> Result<()> {
    let input = std::fs::File::open(source)?;
    let mut decoder = GzDecoder::new(BufReader::new(input));
    let mut output = OpenOptions::new().write(true).create_new(true).open(target)?;
    let copied = io::copy(&mut decoder, &mut output).and_then(|_| output.flush());
    if let Err(err) = copied {
        drop(output);
        let _ = std::fs::remove_file(target);
        return Err(Error::Decompress(err));
    }
    Ok(())
}
