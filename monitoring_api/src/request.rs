//! The request descriptor handed to [`Client::execute`](crate::Client::execute).

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;

use crate::Error;

/// Describes one API call: verb, path, query, optional JSON body and an
/// optional deadline covering every attempt of the call.
///
/// Built by facades and consumed by the executor; never retained.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<Result<Vec<u8>, serde_json::Error>>,
    pub(crate) deadline: Option<Duration>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            deadline: None,
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

    /// Appends a query parameter. Repeated keys are sent repeatedly.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Appends every pair from an iterator.
    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the JSON body. Encoding happens here, once; an encoding failure
    /// surfaces as [`Error::InvalidRequest`] when the request is executed.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = Some(serde_json::to_vec(body));
        self
    }

    /// Bounds the whole call, retries and backoff included.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    /// Checks the descriptor and hands back the encoded body.
    pub(crate) fn validate(&mut self) -> Result<Option<Vec<u8>>, Error> {
        if self.path.trim().is_empty() {
            return Err(Error::InvalidRequest("path must not be empty".into()));
        }
        match self.body.take() {
            None => Ok(None),
            Some(Ok(bytes)) => Ok(Some(bytes)),
            Some(Err(e)) => Err(Error::InvalidRequest(format!(
                "body is not JSON-serializable: {}",
                e
            ))),
        }
    }
}
