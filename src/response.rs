use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::transport::RawResponse;

/// Request id reported when neither the headers nor the body carry one.
pub const NO_REQUEST_ID: &str = "0";

const REQUEST_ID_HEADERS: &[&str] = &["x-amz-request-id", "x-amzn-requestid"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Inline,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Inline(String),
    /// Path of a decompressed report written to disk.
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ResponseInfo {
    pub url: String,
    pub redirect_url: Option<String>,
    pub headers: HeaderMap,
    pub elapsed: Duration,
}

/// The uniform result of every call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub success: bool,
    pub code: u16,
    pub body: ResponseBody,
    pub info: ResponseInfo,
    pub request_id: String,
}

/// Lenient status rule: any three-digit code starting with 2 or 3.
pub fn is_success(code: u16) -> bool {
    (200..400).contains(&code)
}

impl ApiResponse {
    pub(crate) fn from_raw(raw: RawResponse) -> Self {
        let body = String::from_utf8_lossy(&raw.body).into_owned();
        Self::with_body(raw, ResponseBody::Inline(body))
    }

    pub(crate) fn with_body(raw: RawResponse, body: ResponseBody) -> Self {
        let success = is_success(raw.status);
        let request_id = if success {
            request_id_from_headers(&raw.headers)
        } else {
            warn!("{} returned {}", raw.url, raw.status);
            request_id_from_body(&raw.body)
        };
        Self {
            success,
            code: raw.status,
            body,
            info: ResponseInfo {
                url: raw.url,
                redirect_url: raw.redirect_url,
                headers: raw.headers,
                elapsed: raw.elapsed,
            },
            request_id,
        }
    }

    /// Envelope for a fetch that never produced a status line.
    pub(crate) fn unreachable(url: &str, message: String) -> Self {
        warn!("{url} failed before a response: {message}");
        Self {
            success: false,
            code: 0,
            body: ResponseBody::Inline(message),
            info: ResponseInfo {
                url: url.to_string(),
                redirect_url: None,
                headers: HeaderMap::new(),
                elapsed: Duration::ZERO,
            },
            request_id: NO_REQUEST_ID.to_string(),
        }
    }

    pub fn kind(&self) -> ResponseKind {
        match self.body {
            ResponseBody::Inline(_) => ResponseKind::Inline,
            ResponseBody::File(_) => ResponseKind::File,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Inline(text) => Some(text),
            ResponseBody::File(_) => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.body {
            ResponseBody::File(path) => Some(path),
            ResponseBody::Inline(_) => None,
        }
    }

    /// Parses the body as JSON, reading it from disk for file responses.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match &self.body {
            ResponseBody::Inline(text) => Ok(serde_json::from_str(text)?),
            ResponseBody::File(path) => {
                let contents = std::fs::read(path)?;
                Ok(serde_json::from_slice(&contents)?)
            }
        }
    }
}

fn request_id_from_headers(headers: &HeaderMap) -> String {
    REQUEST_ID_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| NO_REQUEST_ID.to_string())
}

pub(crate) fn request_id_from_body(body: &[u8]) -> String {
    let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
        return NO_REQUEST_ID.to_string();
    };
    match map.get("requestId") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => NO_REQUEST_ID.to_string(),
    }
}
