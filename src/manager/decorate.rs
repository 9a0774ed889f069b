use std::time::Duration;

use http::Method;
use tracing::warn;

use crate::config::settings::ClientConfig;
use crate::manager::service_vendor::ServiceVendor;
use crate::token::Token;
use crate::transport::{Params, RequestSpec};
use crate::utils::constants::USER_ID_PLACEHOLDER;

/// Caller side of an authenticated API call.
///
/// Credentials go into `form` for POST and into `query` for every other method.
/// `_USERID_` in `url` is replaced with the token's user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Method,
    pub url: String,
    pub query: Params,
    pub form: Params,
    /// Overrides the client timeout for this call.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Params::new(),
            form: Params::new(),
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Resolve caller options into the outbound call for `token`.
pub(crate) fn decorate(options: RequestOptions, config: &ClientConfig, token: &Token) -> (RequestSpec, ServiceVendor) {
    let RequestOptions {
        method,
        url,
        mut query,
        mut form,
        timeout,
    } = options;

    let url = match &token.user_id {
        Some(user_id) => url.replace(USER_ID_PLACEHOLDER, user_id),
        None => {
            if url.contains(USER_ID_PLACEHOLDER) {
                warn!("token has no UserID, '{}' left in '{}'", USER_ID_PLACEHOLDER, url);
            }
            url
        }
    };

    let is_post = method == Method::POST;
    let service = ServiceVendor::for_url(&url);
    let bag = if is_post { &mut form } else { &mut query };

    bag.insert("client_id".to_owned(), config.creds.client_id.to_owned());
    bag.insert("client_secret".to_owned(), config.creds.client_secret.to_owned());
    bag.insert("access_token".to_owned(), token.access_token.to_owned());
    if let Some(sc) = &config.sc {
        bag.insert("SC".to_owned(), sc.to_owned());
    }
    match config.service_vendor_code(service.config_key()) {
        Some(sv) => {
            bag.insert("SV".to_owned(), sv.to_owned());
        }
        None => warn!("sv.{} is not configured, sending without SV", service.config_key()),
    }

    let form = (is_post || !form.is_empty()).then_some(form);
    let spec = RequestSpec {
        method,
        url,
        query,
        form,
        timeout: timeout.filter(|t| !t.is_zero()).unwrap_or_else(|| config.timeout()),
    };
    (spec, service)
}
