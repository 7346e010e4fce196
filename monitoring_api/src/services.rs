//! Per-resource facades. Each one builds a [`Request`] and hands it to the
//! executor; none of them touch HTTP directly.

use serde::de::IgnoredAny;
use url::Url;

use crate::{
    query::{OrganizationQuery, Query, ServerQuery},
    types::{HealthStatus, Organization, OrganizationID, Paginated, Server, ServerDetailsUpdate},
    Client, Error, Request,
};

/// Path of a server-identity endpoint. The noun is singular: `/v1/server/...`.
///
/// The UUID is percent-encoded as a single path segment, so `?` or `#` in it
/// cannot leak into the query or fragment.
fn server_path(server_uuid: &str, suffix: &str) -> Result<String, Error> {
    let uuid = server_uuid.trim();
    let invalid = || Error::InvalidRequest(format!("invalid server UUID {:?}", server_uuid));
    if uuid.is_empty() || uuid.contains('/') || uuid == "." || uuid == ".." {
        return Err(invalid());
    }
    let mut url = Url::parse("http://localhost/v1/server").map_err(|_| invalid())?;
    url.path_segments_mut().map_err(|_| invalid())?.push(uuid);
    Ok(format!("{}{}", url.path(), suffix))
}

impl Client {
    /// Checks API health. Works without credentials.
    pub async fn health(&self) -> Result<HealthStatus, Error> {
        self.execute(Request::get("/v1/healthz"))
            .await?
            .require_data()
    }

    /// Fetches a page of organizations matching the given query.
    pub async fn list_organizations(
        &self,
        query: &OrganizationQuery,
    ) -> Result<Paginated<Organization>, Error> {
        self.execute_paginated(query.add_to_request(Request::get("/v1/organizations")))
            .await
    }

    /// Fetches a single organization by its numeric ID.
    pub async fn get_organization(&self, id: OrganizationID) -> Result<Organization, Error> {
        self.execute(Request::get(format!("/v1/organizations/{}", id)))
            .await?
            .require_data()
    }

    /// Fetches a page of servers matching the given query.
    pub async fn list_servers(&self, query: &ServerQuery) -> Result<Paginated<Server>, Error> {
        self.execute_paginated(query.add_to_request(Request::get("/v1/servers")))
            .await
    }

    /// Fetches a single server by UUID.
    pub async fn get_server(&self, server_uuid: &str) -> Result<Server, Error> {
        self.execute(Request::get(server_path(server_uuid, "")?))
            .await?
            .require_data()
    }

    /// Records a heartbeat for the server. Normally called with server
    /// credentials.
    pub async fn send_heartbeat(&self, server_uuid: &str) -> Result<(), Error> {
        self.execute::<IgnoredAny>(Request::post(server_path(server_uuid, "/heartbeat")?))
            .await
            .map(drop)
    }

    /// Updates descriptive fields of a server and returns the stored record.
    pub async fn update_server_details(
        &self,
        server_uuid: &str,
        details: &ServerDetailsUpdate,
    ) -> Result<Server, Error> {
        self.execute(Request::put(server_path(server_uuid, "/details")?).json(details))
            .await?
            .require_data()
    }
}
