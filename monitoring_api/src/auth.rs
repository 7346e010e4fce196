//! Authentication scheme resolution.
//!
//! A client carries at most one [`AuthMethod`], chosen from the configured
//! [`Credentials`] by fixed precedence: bearer token, then API key/secret,
//! then server UUID/secret, then monitoring-agent key.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

use crate::Error;

pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");
pub const API_SECRET_HEADER: HeaderName = HeaderName::from_static("x-api-secret");

// Compatibility shim: the server also accepts the legacy `X-Server-UUID` /
// `X-Server-Secret` pair, and endpoints have disagreed historically on which
// they require. Only the unprefixed pair is sent.
pub const SERVER_UUID_HEADER: HeaderName = HeaderName::from_static("server-uuid");
pub const SERVER_SECRET_HEADER: HeaderName = HeaderName::from_static("server-secret");

const MONITORING_KEY_PREFIX: &str = "mag_";

/// Source of bearer tokens that may be refreshed outside the client.
///
/// Called once per attempt, so a token rotated between retries is picked up.
pub trait TokenProvider: Send + Sync + fmt::Debug {
    fn bearer_token(&self) -> Result<String, Error>;
}

/// Where the bearer token comes from.
#[derive(Debug)]
pub enum BearerToken {
    Static(SecretString),
    Provider(Arc<dyn TokenProvider>),
}

/// A monitoring-agent key, `mag_<keyID>.<secretKey>` on the wire.
pub struct MonitoringKey {
    key_id: String,
    secret: SecretString,
}

impl MonitoringKey {
    pub fn new(key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// Parses the full `mag_<keyID>.<secretKey>` token.
    pub fn parse(token: &str) -> Result<Self, Error> {
        let malformed =
            || Error::Configuration("monitoring key must look like mag_<keyID>.<secretKey>".into());
        let rest = token.strip_prefix(MONITORING_KEY_PREFIX).ok_or_else(malformed)?;
        let (key_id, secret) = rest.split_once('.').ok_or_else(malformed)?;
        if key_id.is_empty() || secret.is_empty() {
            return Err(malformed());
        }
        Ok(Self::new(key_id, secret))
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    fn token(&self) -> String {
        format!(
            "{}{}.{}",
            MONITORING_KEY_PREFIX,
            self.key_id,
            self.secret.expose_secret()
        )
    }
}

impl fmt::Debug for MonitoringKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitoringKey")
            .field("key_id", &self.key_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Credentials as supplied by the caller. Any subset may be populated;
/// [`AuthMethod::resolve`] decides which one is used.
#[derive(Debug, Default)]
pub struct Credentials {
    pub bearer: Option<BearerToken>,
    pub api_key: Option<(String, SecretString)>,
    pub server: Option<(String, SecretString)>,
    pub monitoring_key: Option<MonitoringKey>,
}

/// The single authentication scheme a client uses.
#[derive(Debug)]
pub enum AuthMethod {
    Bearer(BearerToken),
    ApiKey { key: String, secret: SecretString },
    ServerCredentials { uuid: String, secret: SecretString },
    MonitoringKey(MonitoringKey),
}

impl AuthMethod {
    /// Picks the highest-precedence populated scheme. Blank values count as
    /// not configured. Returns `Ok(None)` when nothing is configured and an
    /// error when the chosen credentials cannot be sent as header values.
    pub fn resolve(credentials: Credentials) -> Result<Option<AuthMethod>, Error> {
        let Credentials {
            bearer,
            api_key,
            server,
            monitoring_key,
        } = credentials;

        let method = if let Some(bearer) = bearer.filter(|b| match b {
            BearerToken::Static(token) => !token.expose_secret().is_empty(),
            BearerToken::Provider(_) => true,
        }) {
            AuthMethod::Bearer(bearer)
        } else if let Some((key, secret)) = api_key.filter(|(k, s)| filled(k, s)) {
            AuthMethod::ApiKey { key, secret }
        } else if let Some((uuid, secret)) = server.filter(|(u, s)| filled(u, s)) {
            AuthMethod::ServerCredentials { uuid, secret }
        } else if let Some(key) = monitoring_key.filter(|k| filled(&k.key_id, &k.secret)) {
            AuthMethod::MonitoringKey(key)
        } else {
            return Ok(None);
        };

        method.validate()?;
        Ok(Some(method))
    }

    /// Short scheme name for logs. Never includes secret material.
    pub fn name(&self) -> &'static str {
        match self {
            AuthMethod::Bearer(_) => "bearer",
            AuthMethod::ApiKey { .. } => "api_key",
            AuthMethod::ServerCredentials { .. } => "server_credentials",
            AuthMethod::MonitoringKey(_) => "monitoring_key",
        }
    }

    /// Attaches this scheme's headers to an outgoing request.
    pub fn apply(&self, builder: RequestBuilder) -> Result<RequestBuilder, Error> {
        Ok(match self {
            AuthMethod::Bearer(BearerToken::Static(token)) => {
                builder.header(AUTHORIZATION, bearer_value(token.expose_secret())?)
            }
            AuthMethod::Bearer(BearerToken::Provider(provider)) => {
                builder.header(AUTHORIZATION, bearer_value(&provider.bearer_token()?)?)
            }
            AuthMethod::ApiKey { key, secret } => builder
                .header(API_KEY_HEADER, sensitive_value(key)?)
                .header(API_SECRET_HEADER, sensitive_value(secret.expose_secret())?),
            AuthMethod::ServerCredentials { uuid, secret } => builder
                .header(SERVER_UUID_HEADER, sensitive_value(uuid)?)
                .header(SERVER_SECRET_HEADER, sensitive_value(secret.expose_secret())?),
            AuthMethod::MonitoringKey(key) => {
                builder.header(AUTHORIZATION, bearer_value(&key.token())?)
            }
        })
    }

    fn validate(&self) -> Result<(), Error> {
        match self {
            AuthMethod::Bearer(BearerToken::Static(token)) => {
                bearer_value(token.expose_secret()).map(drop)
            }
            AuthMethod::Bearer(BearerToken::Provider(_)) => Ok(()),
            AuthMethod::ApiKey { key, secret } => {
                sensitive_value(key)?;
                sensitive_value(secret.expose_secret()).map(drop)
            }
            AuthMethod::ServerCredentials { uuid, secret } => {
                sensitive_value(uuid)?;
                sensitive_value(secret.expose_secret()).map(drop)
            }
            AuthMethod::MonitoringKey(key) => bearer_value(&key.token()).map(drop),
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn filled(id: &str, secret: &SecretString) -> bool {
    !id.is_empty() && !secret.expose_secret().is_empty()
}

fn sensitive_value(value: &str) -> Result<HeaderValue, Error> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        Error::Configuration("credential contains characters not allowed in a header".into())
    })?;
    header.set_sensitive(true);
    Ok(header)
}

fn bearer_value(token: &str) -> Result<HeaderValue, Error> {
    sensitive_value(&format!("Bearer {}", token))
}
