//! HTTP transport seam.
//!
//! The manager never talks to `reqwest` directly: it builds a [`RequestSpec`]
//! and hands it to a [`Transport`]. Production code uses [`http::ReqwestTransport`].

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use ::http::{Method, StatusCode};

use crate::errors::BoxError;

pub mod http;

pub use self::http::ReqwestTransport;

/// Parameter bag sent either as query string or urlencoded form.
pub type Params = BTreeMap<String, String>;

/// One outbound call, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub query: Params,
    /// Urlencoded body; None sends no body.
    pub form: Option<Params>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue the call. Errors are network/timeout failures only; any HTTP
    /// status with a readable body is a response.
    async fn send(&self, spec: RequestSpec) -> Result<TransportResponse, BoxError>;
}
