use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::CustomTime;

/// Payload of `/v1/healthz`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HealthStatus {
    pub status: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub timestamp: CustomTime,

    /// Per-dependency status, e.g. `{"database": "ok"}`.
    #[serde(default)]
    pub services: Option<HashMap<String, String>>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy")
    }
}
