use std::sync::Arc;

use chrono::Local;
use http::{Method, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::settings::ClientConfig;
use crate::errors::{IHealthError, Result};
use crate::helpers::time::get_instant;
use crate::manager::decorate::{decorate, RequestOptions};
use crate::observability::metrics::{get_metrics, OUTCOME_OK};
use crate::persist::Persist;
use crate::token::endpoint::decode_token_response;
use crate::token::Token;
use crate::transport::{Params, ReqwestTransport, RequestSpec, Transport};
use crate::utils::constants::{GRANT_TYPE_AUTHORIZATION_CODE, RESPONSE_TYPE_REFRESH_TOKEN};

/// Result of [`TokenManager::request`].
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// Raw response body.
    pub body: String,
    /// Set only when this call had to refresh the token first. The new
    /// token was already handed to the persist callback; it is returned for
    /// callers that track tokens on their own.
    pub refreshed: Option<Token>,
}

/// Owns the client configuration and at most one token.
///
/// Token mutations (`fetch_token`, `refresh`, the refresh gate of `request`)
/// are serialized through one lock, so concurrent callers sharing the manager
/// through an `Arc` see at most one refresh per expiry. The persist callback
/// runs after the lock is released and may call back into the manager.
pub struct TokenManager {
    config: ClientConfig,
    token: Mutex<Option<Token>>,
    transport: Arc<dyn Transport>,
    persist: Option<Arc<dyn Persist>>,
}

impl TokenManager {
    pub fn new(config: ClientConfig, persist: Option<Arc<dyn Persist>>) -> Self {
        Self::with_transport(config, persist, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(
        config: ClientConfig,
        persist: Option<Arc<dyn Persist>>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config: config.with_defaults(),
            token: Mutex::new(None),
            transport,
            persist,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Overwrite the in-memory token, typically with one restored from storage.
    /// Nothing is validated and nothing is persisted.
    pub async fn set_token(&self, token: Option<Token>) {
        *self.token.lock().await = token;
    }

    pub async fn get_token(&self) -> Option<Token> {
        self.token.lock().await.clone()
    }

    /// Authorization-code request URL the end user is redirected to.
    pub fn authorize_url(&self) -> Result<String> {
        let endpoint = self.config.authorization_endpoint();
        let mut url = Url::parse(&endpoint)
            .map_err(|e| IHealthError::Config(format!("authorization endpoint '{}': {}", endpoint, e)))?;

        let params = &self.config.authorization;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("redirect_uri", &params.redirect_uri)
                .append_pair("response_type", &params.response_type);
            if let Some(scope) = &params.scope {
                query.append_pair("scope", scope);
            }
            if let Some(state) = &params.state {
                query.append_pair("state", state);
            }
            query.append_pair("client_id", &self.config.creds.client_id);
        }

        Ok(url.to_string())
    }

    /// Exchange an authorization `code` for a token and make it current.
    ///
    /// When persisting fails the new token is still current in memory.
    pub async fn fetch_token(&self, code: &str) -> Result<Token> {
        let fetched = {
            let mut slot = self.token.lock().await;

            let mut query = self.credentials();
            query.insert("code".to_owned(), code.to_owned());
            query.insert("redirect_uri".to_owned(), self.config.authorization.redirect_uri.to_owned());
            query.insert("grant_type".to_owned(), GRANT_TYPE_AUTHORIZATION_CODE.to_owned());

            self.call_token_endpoint(query, "token fetch", &mut slot).await
        };
        let result = self.persisted(fetched).await;

        let metrics = get_metrics().await;
        metrics.token_fetch_total.with_label_values(&[outcome(&result)]).inc();
        if result.is_ok() {
            info!("token acquired with authorization code");
        }
        result
    }

    /// Replace the current token with a renewed one.
    pub async fn refresh(&self) -> Result<Token> {
        let renewed = {
            let mut slot = self.token.lock().await;
            self.refresh_locked(&mut slot).await
        };
        self.finish_refresh(renewed).await
    }

    /// Authenticated call, refreshing an expired token first.
    ///
    /// The refresh gate finishes before the call is dispatched. Fails with
    /// `InvalidState` (no token) or `CorruptToken` (no access token) without
    /// any HTTP traffic.
    pub async fn request(&self, options: RequestOptions) -> Result<ApiResponse> {
        let (token, refreshed) = match self.gate().await? {
            Gate::Current(token) => (token, None),
            Gate::Renewed(renewed) => {
                let token = self.finish_refresh(renewed).await?;
                (token.clone(), Some(token))
            }
        };

        let (spec, service) = decorate(options, &self.config, &token);
        debug!(method = %spec.method, url = %spec.url, service = service.config_key(), "dispatching authenticated call");

        let metrics = get_metrics().await;
        let start = get_instant();
        let result = self.transport.send(spec).await.map_err(IHealthError::Request);
        metrics
            .api_request_duration
            .with_label_values(&[service.config_key()])
            .observe(start.elapsed().as_secs_f64());
        metrics
            .api_requests_total
            .with_label_values(&[service.config_key(), outcome(&result)])
            .inc();

        let response = result?;
        Ok(ApiResponse {
            status: response.status,
            body: response.body,
            refreshed,
        })
    }

    /// Token to decorate with, refreshing it first when expired. The lock is
    /// held for the whole check so only one caller refreshes per expiry.
    async fn gate(&self) -> Result<Gate> {
        let mut slot = self.token.lock().await;
        let current = slot
            .as_ref()
            .ok_or(IHealthError::InvalidState("must set a token before calling request"))?;
        if !current.has_access_token() {
            return Err(IHealthError::CorruptToken(current.redacted()));
        }

        if !current.is_expired() {
            return Ok(Gate::Current(current.clone()));
        }
        match current.expires_at_unix() {
            Some(_) => info!("token expired at {}, refreshing", current.expires_at),
            None => warn!("token expires_at '{}' is unreadable, refreshing", current.expires_at),
        }
        Ok(Gate::Renewed(self.refresh_locked(&mut slot).await))
    }

    async fn finish_refresh(&self, renewed: Result<Token>) -> Result<Token> {
        let result = self.persisted(renewed).await;

        let metrics = get_metrics().await;
        metrics.token_refresh_total.with_label_values(&[outcome(&result)]).inc();
        if result.is_ok() {
            info!("token refreshed");
        }
        result
    }

    async fn refresh_locked(&self, slot: &mut Option<Token>) -> Result<Token> {
        let current = slot
            .as_ref()
            .ok_or(IHealthError::InvalidState("must set a token before calling refresh"))?;
        let refresh_token = current
            .refresh_token
            .as_ref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| IHealthError::CorruptToken(current.redacted()))?;

        let mut query = self.credentials();
        query.insert("redirect_uri".to_owned(), self.config.authorization.redirect_uri.to_owned());
        query.insert("response_type".to_owned(), RESPONSE_TYPE_REFRESH_TOKEN.to_owned());
        query.insert("refresh_token".to_owned(), refresh_token.to_owned());
        if let Some(user_id) = &current.user_id {
            query.insert("UserID".to_owned(), user_id.to_owned());
        }

        self.call_token_endpoint(query, "token refresh", slot).await
    }

    /// GET the token endpoint, decode the body and make the new token current.
    async fn call_token_endpoint(
        &self,
        query: Params,
        context: &'static str,
        slot: &mut Option<Token>,
    ) -> Result<Token> {
        let spec = RequestSpec {
            method: Method::GET,
            url: self.config.token_endpoint(),
            query,
            form: None,
            timeout: self.config.timeout(),
        };
        let response = self
            .transport
            .send(spec)
            .await
            .map_err(|source| IHealthError::Transport { context, source })?;
        debug!(status = %response.status, "{} response received", context);

        let token = decode_token_response(&response.body, Local::now())?;
        *slot = Some(token.clone());
        if let Some(expires_at) = token.expires_at_unix() {
            get_metrics().await.token_expiry_unix.set(expires_at);
        }
        Ok(token)
    }

    /// Hand a freshly stored token to the persist callback. Called with the
    /// token lock released.
    async fn persisted(&self, stored: Result<Token>) -> Result<Token> {
        let token = stored?;
        if let Some(persist) = &self.persist {
            persist.persist(&token).await.map_err(|err| {
                error!("token persist failed, in-memory token is newer than storage: {:#}", err);
                IHealthError::Persistence(err.into())
            })?;
        }
        Ok(token)
    }

    fn credentials(&self) -> Params {
        let mut params = Params::new();
        params.insert("client_id".to_owned(), self.config.creds.client_id.to_owned());
        params.insert("client_secret".to_owned(), self.config.creds.client_secret.to_owned());
        params
    }
}

enum Gate {
    Current(Token),
    Renewed(Result<Token>),
}

fn outcome<T>(result: &Result<T>) -> &'static str {
    match result {
        Ok(_) => OUTCOME_OK,
        Err(err) => err.kind(),
    }
}
