//! Token lifecycle: acquisition, expiry detection, refresh and the
//! authenticated-request decoration around them.

pub mod decorate;
pub mod manager;
pub mod service_vendor;

pub use decorate::RequestOptions;
pub use manager::{ApiResponse, TokenManager};
pub use service_vendor::ServiceVendor;
