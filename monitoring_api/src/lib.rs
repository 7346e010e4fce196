//! Client library for the monitoring API.
//!
//! Every call goes through one executor ([`Client::execute`] /
//! [`Client::execute_paginated`]) that joins the URL, attaches the resolved
//! credentials, retries transient failures with backoff, and decodes the
//! `{status, message, data[, meta]}` envelope.

pub mod auth;
mod client;
mod config;
pub mod envelope;
mod errors;
mod query;
mod request;
pub mod retry;
mod services;
pub mod types;

pub use self::auth::{AuthMethod, MonitoringKey, TokenProvider};
pub use self::client::{Client, RawResponse};
pub use self::config::{ClientBuilder, ClientConfig, DEFAULT_TIMEOUT};
pub use self::errors::Error;
pub use self::query::{OrganizationQuery, Query, QueryCommon, ServerQuery, SortDirection};
pub use self::request::Request;
pub use self::retry::RetryPolicy;
