//! # iHealth token library
//!
//! OAuth2 token management for the iHealth OpenAPI: authorization-code
//! exchange, transparent refresh of expired tokens in front of API calls,
//! and a persist hook so tokens survive restarts.
//!
//! Modules:
//! - `config` — client configuration, YAML loading and validation
//! - `token` — token model and token endpoint decoding
//! - `manager` — the token state machine and request decoration
//! - `transport` — HTTP seam (reqwest by default)
//! - `persist` — persist callback and JSON file storage

pub mod config;
pub mod errors;
pub mod helpers;
pub mod manager;
pub mod observability;
pub mod persist;
pub mod token;
pub mod transport;
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use crate::config::settings::ClientConfig;
pub use crate::errors::IHealthError;
pub use crate::manager::{ApiResponse, RequestOptions, ServiceVendor, TokenManager};
pub use crate::persist::{FilePersist, Persist};
pub use crate::token::Token;
