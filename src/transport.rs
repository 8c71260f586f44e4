use std::time::{Duration, Instant};

use bytes::Bytes;
use log::debug;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Client, Method, RequestBuilder, Response, redirect};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::response::is_success;

#[derive(Debug, Clone)]
pub enum Payload {
    Json(String),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub payload: Option<Payload>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            payload: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub url: String,
    pub redirect_url: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub elapsed: Duration,
}

/// Thin wrapper over two `reqwest` clients.
///
/// API calls never follow redirects so a 307 reaches the executor; report
/// downloads follow them like any file fetch.
#[derive(Debug, Clone)]
pub struct Transport {
    api: Client,
    download: Client,
}

impl Transport {
    pub fn new(timeout: Option<Duration>, connect_timeout: Option<Duration>) -> Result<Self> {
        let api = builder(timeout, connect_timeout).redirect(redirect::Policy::none()).build()?;
        let download = builder(timeout, connect_timeout)
            .redirect(redirect::Policy::limited(10))
            .build()?;
        Ok(Self { api, download })
    }

    pub async fn send(&self, request: HttpRequest) -> Result<RawResponse> {
        let started = Instant::now();
        let response = prepare(&self.api, request).send().await?;
        read_response(response, started).await
    }

    pub async fn fetch(&self, request: HttpRequest) -> Result<RawResponse> {
        let started = Instant::now();
        let response = prepare(&self.download, request).send().await?;
        read_response(response, started).await
    }

    /// Streams a successful body into `file`; the returned body is empty in
    /// that case. Failure bodies are kept in memory for the envelope.
    pub async fn fetch_to(&self, request: HttpRequest, file: &mut File) -> Result<RawResponse> {
        let started = Instant::now();
        let mut response = prepare(&self.download, request).send().await?;
        let status = response.status().as_u16();
        if !is_success(status) {
            return read_response(response, started).await;
        }

        let (url, redirect_url, headers) = parts(&response);
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await? {
            written += chunk.len();
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        debug!("streamed {written} bytes from {url}");

        Ok(RawResponse {
            status,
            url,
            redirect_url,
            headers,
            body: Bytes::new(),
            elapsed: started.elapsed(),
        })
    }
}

fn builder(timeout: Option<Duration>, connect_timeout: Option<Duration>) -> reqwest::ClientBuilder {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(timeout) = connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    builder
}

fn prepare(client: &Client, request: HttpRequest) -> RequestBuilder {
    let builder = client.request(request.method, &request.url).headers(request.headers);
    match request.payload {
        Some(Payload::Json(body)) => builder.body(body),
        Some(Payload::Form(fields)) => builder.form(&fields),
        None => builder,
    }
}

fn parts(response: &Response) -> (String, Option<String>, HeaderMap) {
    let url = response.url().to_string();
    let redirect_url = if response.status().is_redirection() {
        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(|location| {
                response
                    .url()
                    .join(location)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| location.to_string())
            })
    } else {
        None
    };
    (url, redirect_url, response.headers().clone())
}

async fn read_response(response: Response, started: Instant) -> Result<RawResponse> {
    let status = response.status().as_u16();
    let (url, redirect_url, headers) = parts(&response);
    let body = response.bytes().await?;
    Ok(RawResponse {
        status,
        url,
        redirect_url,
        headers,
        body,
        elapsed: started.elapsed(),
    })
}
