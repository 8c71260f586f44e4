use std::sync::{PoisonError, RwLock};

use log::{info, warn};
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::config::validate_access_token;
use crate::error::{Error, Result};
use crate::transport::{HttpRequest, Payload, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
}

impl TokenGrant {
    /// Reads a token endpoint body. Only `access_token` is required; the
    /// other fields are dropped when they have an unexpected shape.
    pub fn parse(body: &str) -> std::result::Result<Self, String> {
        let value: Value = serde_json::from_str(body).map_err(|err| format!("response is not JSON: {err}"))?;
        let access_token = value
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| "'access_token' not found in response".to_string())?;
        Ok(Self {
            access_token: access_token.to_string(),
            token_type: value.get("token_type").and_then(Value::as_str).map(str::to_string),
            expires_in: value.get("expires_in").and_then(seconds),
        })
    }
}

fn seconds(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64),
        _ => None,
    }
}

/// Client credentials plus the current bearer token.
#[derive(Debug)]
pub struct TokenManager {
    client_id: String,
    client_secret: String,
    refresh_token: Option<String>,
    access_token: RwLock<String>,
}

impl TokenManager {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: Option<String>,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token,
            access_token: RwLock::new(access_token.unwrap_or_default()),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn has_token(&self) -> bool {
        !self.bearer().is_empty()
    }

    pub fn bearer(&self) -> String {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_access_token(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        validate_access_token(&token)?;
        self.store(token);
        Ok(())
    }

    fn store(&self, token: String) {
        *self.access_token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Exchanges the refresh token for a new access token and stores it.
    pub async fn refresh(&self, transport: &Transport, token_url: &str, user_agent: &str) -> Result<TokenGrant> {
        let refresh_token = self.refresh_token.as_deref().ok_or_else(|| Error::Authentication {
            message: "no refresh token configured".to_string(),
            status: None,
            body: String::new(),
        })?;
        let refresh_token = urlencoding::decode(refresh_token)
            .map(|t| t.into_owned())
            .unwrap_or_else(|_| refresh_token.to_string());

        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(user_agent).map_err(|_| Error::InvalidHeader(USER_AGENT.to_string()))?;
        headers.insert(USER_AGENT, agent);

        let mut request = HttpRequest::new(Method::POST, token_url);
        request.headers = headers;
        request.payload = Some(Payload::Form(vec![
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("refresh_token".to_string(), refresh_token),
            ("client_id".to_string(), self.client_id.clone()),
            ("client_secret".to_string(), self.client_secret.clone()),
        ]));

        let response = transport.send(request).await?;
        let body = String::from_utf8_lossy(&response.body).into_owned();
        let grant = match TokenGrant::parse(&body) {
            Ok(grant) => grant,
            Err(reason) => {
                warn!("token refresh failed with status {}", response.status);
                return Err(Error::Authentication {
                    message: format!("unable to refresh token, {reason}"),
                    status: Some(response.status),
                    body,
                });
            }
        };

        info!("refreshed access token (expires in {:?}s)", grant.expires_in);
        self.store(grant.access_token.clone());
        Ok(grant)
    }
}
