//! Client configuration and its builder.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use crate::auth::{BearerToken, Credentials, MonitoringKey, TokenProvider};
use crate::retry::RetryPolicy;
use crate::{Client, Error};

/// Default per-attempt HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a [`Client`] needs. Fixed once the client is built.
#[derive(Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
    /// Timeout applied to each individual HTTP attempt.
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Emit per-request debug log lines.
    pub debug: bool,
    pub user_agent: String,
    /// Build the client even when no credentials are configured, for
    /// endpoints that do not require authentication.
    pub allow_unauthenticated: bool,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: Credentials::default(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            debug: false,
            user_agent: default_user_agent(),
            allow_unauthenticated: false,
        }
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Fluent builder for [`Client`].
///
/// ```no_run
/// # fn main() -> Result<(), monitoring_api::Error> {
/// let client = monitoring_api::Client::builder("https://api.example.com")
///     .api_key("key", "secret")
///     .max_retries(5)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(base_url),
        }
    }

    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.config.credentials.bearer =
            Some(BearerToken::Static(SecretString::from(token.into())));
        self
    }

    /// Fetches the bearer token from `provider` on every attempt.
    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.config.credentials.bearer = Some(BearerToken::Provider(provider));
        self
    }

    pub fn api_key(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.config.credentials.api_key = Some((key.into(), SecretString::from(secret.into())));
        self
    }

    pub fn server_credentials(mut self, uuid: impl Into<String>, secret: impl Into<String>) -> Self {
        self.config.credentials.server = Some((uuid.into(), SecretString::from(secret.into())));
        self
    }

    pub fn monitoring_key(mut self, key: MonitoringKey) -> Self {
        self.config.credentials.monitoring_key = Some(key);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.retry.max_retries = max_retries;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn allow_unauthenticated(mut self, allow: bool) -> Self {
        self.config.allow_unauthenticated = allow;
        self
    }

    pub fn into_config(self) -> ClientConfig {
        self.config
    }

    pub fn build(self) -> Result<Client, Error> {
        Client::new(self.config)
    }
}
