use serde::{Deserialize, Serialize};

use super::CustomTime;

/// Numeric identifier for an organization.
pub type OrganizationID = u64;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Organization {
    pub id: OrganizationID,

    pub uuid: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub industry: Option<String>,

    #[serde(default)]
    pub max_servers: Option<u32>,

    #[serde(default)]
    pub created_at: CustomTime,

    #[serde(default)]
    pub updated_at: CustomTime,
}
