//! Server records: the machines that report to the monitoring API.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{organization::OrganizationID, CustomTime};

/// UUID identifying a server, as sent in `Server-UUID` and in
/// `/v1/server/{uuid}/...` paths.
pub type ServerUUID = String;

/// Reported health of a server. Values this client does not know decode
/// as [`ServerStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerStatus {
    Online,
    Offline,
    Warning,
    Critical,
    #[default]
    Unknown,
}

impl ServerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStatus::Online => "online",
            ServerStatus::Offline => "offline",
            ServerStatus::Warning => "warning",
            ServerStatus::Critical => "critical",
            ServerStatus::Unknown => "unknown",
        }
    }
}

impl Serialize for ServerStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ServerStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(match raw.to_ascii_lowercase().as_str() {
            "online" => ServerStatus::Online,
            "offline" => ServerStatus::Offline,
            "warning" => ServerStatus::Warning,
            "critical" => ServerStatus::Critical,
            _ => ServerStatus::Unknown,
        })
    }
}

/// A server as returned by `/v1/servers` and `/v1/server/{uuid}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Server {
    pub id: u64,

    pub server_uuid: ServerUUID,

    pub hostname: String,

    pub organization_id: OrganizationID,

    #[serde(default)]
    pub main_ip: Option<String>,

    #[serde(default)]
    pub os: Option<String>,

    #[serde(default)]
    pub os_version: Option<String>,

    #[serde(default)]
    pub environment: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub classification: Option<String>,

    #[serde(default)]
    pub status: ServerStatus,

    /// `None` when the server omitted the field, `Some(vec![])` when it sent `[]`.
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,

    #[serde(default)]
    pub last_heartbeat: CustomTime,

    #[serde(default)]
    pub created_at: CustomTime,

    #[serde(default)]
    pub updated_at: CustomTime,
}

/// Body of `PUT /v1/server/{uuid}/details`. Unset fields are left untouched.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ServerDetailsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}
