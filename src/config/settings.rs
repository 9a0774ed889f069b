use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::utils::constants::DEFAULT_TIMEOUT_MS;

/// ================================
/// Client configuration
/// ================================
///
/// Field aliases accept the camelCase keys of older config files
/// (`clientID`, `tokenUri`, `authorization_uri`, `SC`, `SV`, ...).
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub creds: Creds,
    pub uris: Uris,
    #[serde(alias = "authorization_uri")]
    pub authorization: AuthorizationParams,
    /// API-wide `SC` constant sent with every authenticated call.
    #[serde(default, alias = "SC")]
    pub sc: Option<String>,
    /// Service vendor codes keyed by name, e.g. `OpenApiWeight`.
    #[serde(default, alias = "SV")]
    pub sv: HashMap<String, String>,
    /// Per-call timeout in milliseconds, filled with the default by [`ClientConfig::with_defaults`].
    #[serde(default, alias = "timeout")]
    pub timeout_ms: Option<u64>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Creds {
    #[serde(alias = "clientID")]
    pub client_id: String,
    #[serde(alias = "clientSecret")]
    pub client_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Uris {
    #[serde(alias = "authorizationUri")]
    pub authorization_uri: String,
    #[serde(alias = "authorizationPath")]
    pub authorization_path: String,
    #[serde(alias = "tokenUri")]
    pub token_uri: String,
    #[serde(alias = "tokenPath")]
    pub token_path: String,
}

/// Parameters of the authorization-code redirect.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthorizationParams {
    pub redirect_uri: String,
    #[serde(default = "default_response_type")]
    pub response_type: String,
    pub scope: Option<String>,
    pub state: Option<String>,
}

impl ClientConfig {
    /// Fill unset values. Called once when the manager is built. A zero
    /// timeout counts as unset.
    pub fn with_defaults(mut self) -> Self {
        if self.timeout_ms.unwrap_or(0) == 0 {
            self.timeout_ms = Some(DEFAULT_TIMEOUT_MS);
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        let ms = self.timeout_ms.filter(|ms| *ms > 0).unwrap_or(DEFAULT_TIMEOUT_MS);
        Duration::from_millis(ms)
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}{}", self.uris.token_uri, self.uris.token_path)
    }

    pub fn authorization_endpoint(&self) -> String {
        format!("{}{}", self.uris.authorization_uri, self.uris.authorization_path)
    }

    /// Configured SV code for a service name such as `OpenApiBP`.
    pub fn service_vendor_code(&self, name: &str) -> Option<&str> {
        self.sv.get(name).map(String::as_str)
    }
}

fn default_response_type() -> String {
    "code".to_owned()
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info".to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}
