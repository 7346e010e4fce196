use crate::types::{OrganizationID, ServerStatus};
use crate::Request;

use super::{common::QueryCommon, Query};

/// Query for `GET /v1/servers`.
#[derive(Clone, Debug, Default)]
pub struct ServerQuery {
    pub common: QueryCommon,
    pub organization_id: Option<OrganizationID>,
    pub environment: Option<String>,
    pub classification: Option<String>,
    pub statuses: Vec<ServerStatus>,
    pub tags: Vec<String>,
}

impl Query for ServerQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn add_to_request(&self, request: Request) -> Request {
        let mut request = self.common.add_to_request(request);
        if let Some(organization_id) = self.organization_id {
            request = request.query("organization_id", organization_id);
        }
        if let Some(environment) = &self.environment {
            request = request.query("environment", environment);
        }
        if let Some(classification) = &self.classification {
            request = request.query("classification", classification);
        }
        for status in self.statuses.iter() {
            request = request.query("status", status.as_str());
        }
        for tag in self.tags.iter() {
            request = request.query("tag", tag);
        }
        request
    }
}

impl ServerQuery {
    pub fn with_organization_id(mut self, organization_id: OrganizationID) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    pub fn with_environment(mut self, environment: &str) -> Self {
        self.environment = Some(environment.to_string());
        self
    }

    pub fn with_classification(mut self, classification: &str) -> Self {
        self.classification = Some(classification.to_string());
        self
    }

    pub fn with_status(mut self, status: ServerStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(|t| t.to_string()));
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        query::{Query, ServerQuery, SortDirection},
        types::ServerStatus,
        Request,
    };

    fn rendered(query: ServerQuery) -> String {
        query
            .add_to_request(Request::get("/v1/servers"))
            .query_params()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    #[test]
    fn test_server_query() {
        insta::assert_snapshot!(rendered(ServerQuery::default()), @"page=1");

        insta::assert_snapshot!(
            rendered(
                ServerQuery::default()
                    .with_page(3)
                    .with_limit(50)
                    .with_organization_id(12)
                    .with_status(ServerStatus::Online)
                    .with_status(ServerStatus::Critical)
                    .with_tags(&["db", "eu-west"])
            ),
            @"page=3&limit=50&organization_id=12&status=online&status=critical&tag=db&tag=eu-west"
        );

        insta::assert_snapshot!(
            rendered(
                ServerQuery::default()
                    .with_search("web")
                    .with_sort("hostname", SortDirection::Desc)
                    .with_filter("os", "linux")
                    .with_environment("production")
            ),
            @"page=1&search=web&sort=hostname&order=desc&os=linux&environment=production"
        );
    }
}
