// tests/common/mod.rs
pub use serde_json::json;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use async_trait::async_trait;
use chrono::{Local, TimeDelta};
use http::StatusCode;

use crate::config::settings::{AuthorizationParams, ClientConfig, Creds, Uris};
use crate::errors::BoxError;
use crate::manager::TokenManager;
use crate::persist::Persist;
use crate::token::Token;
use crate::transport::{RequestSpec, Transport, TransportResponse};

pub const TOKEN_PATH: &str = "/OpenApiV2/OAuthv2/userauthorization/";

/// Client config whose token endpoint lives under `token_base`.
pub fn client_config(token_base: &str) -> ClientConfig {
    let sv: HashMap<String, String> = [
        ("OpenApiBP", "sv-bp"),
        ("OpenApiWeight", "sv-weight"),
        ("OpenApiBG", "sv-bg"),
        ("OpenApiSpO2", "sv-spo2"),
        ("OpenApiActivity", "sv-activity"),
        ("OpenApiSleep", "sv-sleep"),
        ("OpenApiUserInfo", "XYZ"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect();

    ClientConfig {
        creds: Creds {
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
        },
        uris: Uris {
            authorization_uri: "https://oauthuser.ihealthlabs.com".into(),
            authorization_path: TOKEN_PATH.into(),
            token_uri: token_base.into(),
            token_path: TOKEN_PATH.into(),
        },
        authorization: AuthorizationParams {
            redirect_uri: "http://localhost:3000/auth_callback/".into(),
            response_type: "code".into(),
            scope: Some("OpenApiWeight OpenApiBP".into()),
            state: Some("3(#0/!~".into()),
        },
        sc: Some("sc-constant".into()),
        sv,
        timeout_ms: None,
        logging: None,
    }
}

pub fn fresh_token(user_id: &str) -> Token {
    Token::issued(
        format!("access-{user_id}"),
        Some(format!("refresh-{user_id}")),
        3600,
        Some(user_id.to_owned()),
        Local::now(),
    )
    .unwrap()
}

/// Token issued two hours ago with a one hour lifetime.
pub fn expired_token(user_id: &str) -> Token {
    Token::issued(
        format!("old-access-{user_id}"),
        Some(format!("old-refresh-{user_id}")),
        3600,
        Some(user_id.to_owned()),
        Local::now() - TimeDelta::hours(2),
    )
    .unwrap()
}

pub fn grant_body(access: &str, refresh: &str, expires: i64, user_id: &str) -> serde_json::Value {
    json!({
        "AccessToken": access,
        "RefreshToken": refresh,
        "Expires": expires,
        "UserID": user_id,
    })
}

/// Transport that records every call and answers from a script.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<RequestSpec>>,
    script: Mutex<VecDeque<Result<String, String>>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, body: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(body.into()));
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.script.lock().unwrap().push_back(Err(message.into()));
    }

    pub fn calls(&self) -> Vec<RequestSpec> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, spec: RequestSpec) -> Result<TransportResponse, BoxError> {
        self.calls.lock().unwrap().push(spec);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(body)) => Ok(TransportResponse { status: StatusCode::OK, body }),
            Some(Err(message)) => Err(message.into()),
            None => Err("no scripted response".into()),
        }
    }
}

/// Persister that remembers every token it was given.
pub fn recording_persist() -> (Arc<dyn Persist>, Arc<Mutex<Vec<Token>>>) {
    let saved: Arc<Mutex<Vec<Token>>> = Arc::default();
    let sink = saved.clone();
    let persist = move |token: Token| {
        let sink = sink.clone();
        async move {
            sink.lock().unwrap().push(token);
            Ok::<(), anyhow::Error>(())
        }
    };
    let persist: Arc<dyn Persist> = Arc::new(persist);
    (persist, saved)
}

pub fn failing_persist() -> Arc<dyn Persist> {
    Arc::new(|_token: Token| async { Err::<(), _>(anyhow::anyhow!("disk full")) })
}

/// Persister that reads the manager's current token back while it runs.
/// Bind the manager through `attach` once it is built.
#[derive(Clone, Default)]
pub struct ReadBackPersist {
    manager: Arc<OnceLock<Weak<TokenManager>>>,
    pub seen: Arc<Mutex<Vec<Option<Token>>>>,
}

impl ReadBackPersist {
    pub fn attach(&self, manager: &Arc<TokenManager>) {
        let _ = self.manager.set(Arc::downgrade(manager));
    }

    pub fn hook(&self) -> Arc<dyn Persist> {
        let this = self.clone();
        Arc::new(move |_token: Token| {
            let this = this.clone();
            async move {
                if let Some(manager) = this.manager.get().and_then(Weak::upgrade) {
                    let current = manager.get_token().await;
                    this.seen.lock().unwrap().push(current);
                }
                Ok::<(), anyhow::Error>(())
            }
        })
    }
}
