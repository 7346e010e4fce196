//! Shared query infrastructure: the [`Query`] trait, [`QueryCommon`] fields, and [`SortDirection`].

use std::fmt;
use std::str::FromStr;

use crate::Request;

/// Trait implemented by all query builders. Provides request serialization
/// and shared builder methods for pagination, search, sorting and filters.
pub trait Query {
    /// Appends this query's parameters to the request, returning it.
    fn add_to_request(&self, request: Request) -> Request;

    /// Returns a mutable reference to the common query fields.
    fn get_common(&mut self) -> &mut QueryCommon;

    /// Sets the page number (1-indexed).
    fn with_page(mut self, page: u64) -> Self
    where
        Self: Sized,
    {
        self.get_common().page = page;
        self
    }

    /// Sets the number of results per page.
    fn with_limit(mut self, limit: u64) -> Self
    where
        Self: Sized,
    {
        self.get_common().limit = Some(limit);
        self
    }

    /// Free-text search.
    fn with_search(mut self, search: &str) -> Self
    where
        Self: Sized,
    {
        self.get_common().search = Some(search.to_string());
        self
    }

    /// Sorts by the given field.
    fn with_sort(mut self, field: &str, direction: SortDirection) -> Self
    where
        Self: Sized,
    {
        let common = self.get_common();
        common.sort = Some(field.to_string());
        common.sort_direction = direction;
        self
    }

    /// Adds a resource-specific filter, passed through unmodified.
    fn with_filter(mut self, key: &str, value: &str) -> Self
    where
        Self: Sized,
    {
        self.get_common()
            .filters
            .push((key.to_string(), value.to_string()));
        self
    }
}

/// Sort order for list results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        })
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

/// Fields shared by all list queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryCommon {
    /// Page number (1-indexed). Defaults to 1.
    pub page: u64,
    /// Results per page. `None` uses the API default.
    pub limit: Option<u64>,
    pub search: Option<String>,
    /// Field to sort by. `None` uses the API default ordering.
    pub sort: Option<String>,
    pub sort_direction: SortDirection,
    /// Extra `key=value` filters, sent in insertion order.
    pub filters: Vec<(String, String)>,
}

impl Default for QueryCommon {
    fn default() -> QueryCommon {
        QueryCommon {
            page: 1,
            limit: None,
            search: None,
            sort: None,
            sort_direction: SortDirection::Asc,
            filters: Vec::new(),
        }
    }
}

impl QueryCommon {
    /// Appends the pagination, search, sort and filter parameters.
    pub fn add_to_request(&self, request: Request) -> Request {
        let mut request = request.query("page", self.page);
        if let Some(limit) = self.limit {
            request = request.query("limit", limit);
        }
        if let Some(search) = &self.search {
            request = request.query("search", search);
        }
        if let Some(sort) = &self.sort {
            request = request
                .query("sort", sort)
                .query("order", self.sort_direction);
        }
        request.query_pairs(self.filters.iter().cloned())
    }
}
