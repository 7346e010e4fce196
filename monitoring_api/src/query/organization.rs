use crate::Request;

use super::{common::QueryCommon, Query};

/// Query for `GET /v1/organizations`.
#[derive(Clone, Debug, Default)]
pub struct OrganizationQuery {
    pub common: QueryCommon,
    pub industry: Option<String>,
}

impl Query for OrganizationQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn add_to_request(&self, request: Request) -> Request {
        let mut request = self.common.add_to_request(request);
        if let Some(industry) = &self.industry {
            request = request.query("industry", industry);
        }
        request
    }
}

impl OrganizationQuery {
    pub fn with_industry(mut self, industry: &str) -> Self {
        self.industry = Some(industry.to_string());
        self
    }
}
