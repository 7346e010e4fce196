//! Response envelope decoding.
//!
//! Every endpoint answers with one of three shapes:
//!
//! - standard: `{"status": "success", "message": "...", "data": {...}}`
//! - paginated: `{"status": "success", "message": "...", "data": [...], "meta": {...}}`
//! - error: `{"status": "error", "message": "...", "error": "..."}`
//!
//! The `status` field is inspected before the payload so that an error
//! envelope never has its `data` decoded, whatever the HTTP status was.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::{Paginated, PaginationMeta, Response};
use crate::Error;

const STATUS_SUCCESS: &str = "success";

#[derive(Deserialize)]
struct Head {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct StandardBody<T> {
    #[serde(default)]
    data: Option<T>,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct PaginatedBody<T> {
    #[serde(default, deserialize_with = "null_as_empty")]
    data: Vec<T>,
    #[serde(default)]
    meta: Option<PaginationMeta>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads the envelope head and turns a non-success `status` into [`Error::Api`].
fn check_status(status: u16, body: &[u8]) -> Result<String, Error> {
    let head: Head = serde_json::from_slice(body).map_err(|e| Error::decode(e, body))?;
    if head.status != STATUS_SUCCESS {
        return Err(Error::Api {
            status,
            message: head.message,
            code: head.error.and_then(error_code),
        });
    }
    Ok(head.message)
}

/// The optional `error` field is usually a string code but some endpoints
/// send a structured object; keep whatever was sent as text.
fn error_code(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Decodes a standard envelope whose `data` is a single value.
///
/// An empty body (`204 No Content`, or a bare 2xx from a command endpoint)
/// decodes as success with no data. `attempts` on the returned value is 1;
/// the executor overwrites it.
pub fn decode_standard<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<Response<T>, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Response {
            status,
            message: String::new(),
            data: None,
            attempts: 1,
        });
    }
    let message = check_status(status, body)?;
    let parsed: StandardBody<T> =
        serde_json::from_slice(body).map_err(|e| Error::decode(e, body))?;
    Ok(Response {
        status,
        message,
        data: parsed.data,
        attempts: 1,
    })
}

/// Decodes a paginated envelope whose `data` is an array.
pub fn decode_paginated<T: DeserializeOwned>(
    status: u16,
    body: &[u8],
) -> Result<Paginated<T>, Error> {
    let message = check_status(status, body)?;
    let parsed: PaginatedBody<T> =
        serde_json::from_slice(body).map_err(|e| Error::decode(e, body))?;
    Ok(Paginated {
        status,
        message,
        data: parsed.data,
        meta: parsed.meta,
        attempts: 1,
    })
}

/// Extracts `(message, code)` from an error envelope carried on a non-2xx
/// response. Returns `None` for bodies that are not an envelope.
pub(crate) fn error_details(body: &[u8]) -> Option<(String, Option<String>)> {
    let head: Head = serde_json::from_slice(body).ok()?;
    if head.message.is_empty() {
        return None;
    }
    Some((head.message, head.error.and_then(error_code)))
}
