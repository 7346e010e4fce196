mod common;
pub use self::common::{Query, QueryCommon, SortDirection};

mod organization;
pub use self::organization::OrganizationQuery;

mod server;
pub use self::server::ServerQuery;
