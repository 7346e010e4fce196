//! HTTP client for the monitoring API.

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    auth::AuthMethod,
    config::{ClientBuilder, ClientConfig},
    envelope::{self, decode_paginated, decode_standard},
    errors::truncate_body,
    retry::{parse_retry_after, RetryPolicy, RetryState},
    types::{Paginated, Response},
    Error, Request,
};

/// HTTP client for the monitoring API.
///
/// Cheap to clone; clones share one connection pool and one immutable
/// configuration, so a single client can serve any number of concurrent
/// calls.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    /// Base URL without a trailing slash.
    base_url: String,
    auth: Option<AuthMethod>,
    retry: RetryPolicy,
    debug: bool,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("auth", &self.authentication_method())
            .field("retry", &self.inner.retry)
            .field("debug", &self.inner.debug)
            .finish()
    }
}

/// A successful (2xx) response before envelope decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// Number of HTTP attempts made, including this one.
    pub attempts: u32,
}

impl Client {
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// Builds a client, resolving the authentication scheme up front.
    ///
    /// Fails with [`Error::Configuration`] when the base URL is unusable, a
    /// credential cannot be sent as a header, or no credentials are set and
    /// `allow_unauthenticated` is off.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| {
            Error::Configuration(format!("invalid base URL {:?}: {}", config.base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Configuration(format!(
                "base URL must be http or https, got {:?}",
                parsed.scheme()
            )));
        }

        let auth = AuthMethod::resolve(config.credentials)?;
        if auth.is_none() && !config.allow_unauthenticated {
            return Err(Error::Configuration(
                "no authentication method configured: set a bearer token, API key/secret, \
                 server UUID/secret or monitoring key"
                    .into(),
            ));
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Configuration(format!("failed to build HTTP client: {}", e))
            })?;

        if config.debug {
            tracing::debug!(
                base_url = %base_url,
                auth = auth.as_ref().map_or("none", AuthMethod::name),
                "monitoring API client configured"
            );
        }

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                auth,
                retry: config.retry,
                debug: config.debug,
            }),
        })
    }

    /// Name of the active authentication scheme, for diagnostics.
    pub fn authentication_method(&self) -> Option<&'static str> {
        self.inner.auth.as_ref().map(AuthMethod::name)
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry
    }

    /// Executes a request whose envelope carries a single `data` value.
    pub async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<Response<T>, Error> {
        let raw = self.send(request).await?;
        let mut response =
            decode_standard(raw.status, &raw.body).map_err(log_decode_failure)?;
        response.attempts = raw.attempts;
        Ok(response)
    }

    /// Executes a request whose envelope carries a `data` array and `meta`.
    pub async fn execute_paginated<T: DeserializeOwned>(
        &self,
        request: Request,
    ) -> Result<Paginated<T>, Error> {
        let raw = self.send(request).await?;
        let mut page =
            decode_paginated(raw.status, &raw.body).map_err(log_decode_failure)?;
        page.attempts = raw.attempts;
        Ok(page)
    }

    /// Runs the request through the retry loop and returns the raw 2xx
    /// response without decoding the envelope.
    pub async fn send(&self, mut request: Request) -> Result<RawResponse, Error> {
        let body = request.validate()?;
        let url = self.url_for(&request)?;
        let call = self.run(&request, url, body);
        match request.deadline {
            Some(deadline) => tokio::time::timeout(deadline, call).await.map_err(|_| {
                tracing::warn!(
                    "{} {} did not complete within {:?}",
                    request.method,
                    request.path,
                    deadline
                );
                Error::DeadlineExceeded(deadline)
            })?,
            None => call.await,
        }
    }

    fn url_for(&self, request: &Request) -> Result<Url, Error> {
        let path = request.path.trim();
        let joined = if path.starts_with('/') {
            format!("{}{}", self.inner.base_url, path)
        } else {
            format!("{}/{}", self.inner.base_url, path)
        };
        let mut url = Url::parse(&joined).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidRequest(format!("invalid URL {:?}: {}", joined, e))
        })?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn run(
        &self,
        request: &Request,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, Error> {
        let policy = &self.inner.retry;
        let started = Instant::now();
        let mut state = RetryState::start();

        loop {
            state = match state {
                RetryState::Attempting { attempt } => {
                    let outcome = self
                        .attempt(&request.method, &url, body.as_deref(), attempt)
                        .await;
                    RetryState::Attempting { attempt }.on_outcome(policy, outcome)
                }
                RetryState::Backoff {
                    attempt,
                    delay,
                    last,
                } => {
                    tracing::warn!(
                        "{} {} failed (attempt {}/{}): {}; retrying in {:.1}s",
                        request.method,
                        request.path,
                        attempt,
                        policy.max_retries + 1,
                        last,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    RetryState::Backoff {
                        attempt,
                        delay,
                        last,
                    }
                    .on_backoff_elapsed()
                }
                RetryState::Succeeded {
                    attempts,
                    mut value,
                } => {
                    value.attempts = attempts;
                    if self.inner.debug {
                        tracing::debug!(
                            method = %request.method,
                            path = %request.path,
                            status = value.status,
                            attempts,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "request succeeded"
                        );
                    }
                    return Ok(value);
                }
                terminal => {
                    if let RetryState::Exhausted { attempts, last } = &terminal {
                        tracing::error!(
                            "{} {} gave up after {} attempts: {}",
                            request.method,
                            request.path,
                            attempts,
                            last
                        );
                    }
                    return terminal.into_result();
                }
            };
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&[u8]>,
        attempt: u32,
    ) -> Result<RawResponse, Error> {
        let mut builder = self
            .inner
            .http
            .request(method.clone(), url.clone())
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_vec());
        }
        if let Some(auth) = &self.inner.auth {
            builder = auth.apply(builder)?;
        }

        let started = Instant::now();
        if self.inner.debug {
            tracing::debug!(
                method = %method,
                path = url.path(),
                auth = self.authentication_method().unwrap_or("none"),
                attempt,
                "sending request"
            );
        }

        let resp = builder.send().await.map_err(|e| {
            tracing::debug!("Request to {} failed: {}", url.path(), e);
            Error::Network(e)
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Network(e)
        })?;

        if self.inner.debug {
            tracing::debug!(
                method = %method,
                path = url.path(),
                status = status.as_u16(),
                attempt,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "received response"
            );
        }

        if !status.is_success() {
            let snippet = truncate_body(&String::from_utf8_lossy(&bytes));
            let message = envelope::error_details(&bytes).map(|(message, _)| message);
            tracing::debug!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
                message,
                retry_after: parse_retry_after(&headers),
            });
        }

        Ok(RawResponse {
            status: status.as_u16(),
            headers,
            body: bytes.to_vec(),
            attempts: attempt,
        })
    }
}

fn log_decode_failure(err: Error) -> Error {
    match &err {
        Error::Decode { source, body } => {
            tracing::error!("Failed to parse response: {} | body: {}", source, body)
        }
        Error::Api { message, code, .. } => {
            tracing::debug!("API reported failure: {} ({:?})", message, code)
        }
        _ => {}
    }
    err
}
