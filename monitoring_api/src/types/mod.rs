mod meta;
pub use self::meta::{Paginated, PaginationMeta, Response};

mod time;
pub use self::time::CustomTime;

mod server;
pub use self::server::{Server, ServerDetailsUpdate, ServerStatus, ServerUUID};

mod organization;
pub use self::organization::{Organization, OrganizationID};

mod health;
pub use self::health::HealthStatus;
