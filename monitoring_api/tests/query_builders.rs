use monitoring_api::types::ServerStatus;
use monitoring_api::{OrganizationQuery, Query, Request, ServerQuery, SortDirection};

fn params(request: &Request) -> Vec<(&str, &str)> {
    request
        .query_params()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}

#[test]
fn organization_query_defaults() {
    let request = OrganizationQuery::default().add_to_request(Request::get("/v1/organizations"));
    assert_eq!(params(&request), vec![("page", "1")]);
}

#[test]
fn organization_query_with_everything() {
    let request = OrganizationQuery::default()
        .with_page(4)
        .with_limit(10)
        .with_search("acme")
        .with_sort("created_at", SortDirection::Desc)
        .with_industry("finance")
        .add_to_request(Request::get("/v1/organizations"));
    let params = params(&request);
    assert!(params.contains(&("page", "4")));
    assert!(params.contains(&("limit", "10")));
    assert!(params.contains(&("search", "acme")));
    assert!(params.contains(&("sort", "created_at")));
    assert!(params.contains(&("order", "desc")));
    assert!(params.contains(&("industry", "finance")));
}

#[test]
fn server_query_repeats_multi_value_filters() {
    let request = ServerQuery::default()
        .with_status(ServerStatus::Warning)
        .with_status(ServerStatus::Offline)
        .with_tag("db")
        .with_tag("eu-west")
        .add_to_request(Request::get("/v1/servers"));
    let params = params(&request);
    assert!(params.contains(&("status", "warning")));
    assert!(params.contains(&("status", "offline")));
    assert!(params.contains(&("tag", "db")));
    assert!(params.contains(&("tag", "eu-west")));
}

#[test]
fn pass_through_filters_are_unmodified() {
    let request = ServerQuery::default()
        .with_filter("os", "Ubuntu 22.04")
        .with_filter("page_size", "100")
        .add_to_request(Request::get("/v1/servers"));
    let params = params(&request);
    assert!(params.contains(&("os", "Ubuntu 22.04")));
    assert!(params.contains(&("page_size", "100")));
}
