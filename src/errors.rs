use thiserror::Error;

/// Boxed failure coming from a collaborator (HTTP transport or persist callback).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = IHealthError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum IHealthError {
    /// Network or timeout failure while talking to the token endpoint.
    #[error("{context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: BoxError,
    },

    /// The remote service answered with an `Error` body.
    #[error("{code} {description}")]
    Api { code: String, description: String },

    /// Token endpoint body is not JSON or misses required fields.
    #[error("unexpected token endpoint response: {0}")]
    Parse(#[source] serde_json::Error),

    /// The persist callback failed. The in-memory token is already updated.
    #[error("token persist failed: {0}")]
    Persistence(#[source] BoxError),

    #[error("{0}")]
    InvalidState(&'static str),

    #[error("token appears corrupt: {0}")]
    CorruptToken(String),

    /// Transport failure during an authenticated API call.
    #[error("request: {0}")]
    Request(#[source] BoxError),

    #[error("invalid client config: {0}")]
    Config(String),
}

impl IHealthError {
    /// Short label used for metric outcomes.
    pub fn kind(&self) -> &'static str {
        match self {
            IHealthError::Transport { .. } => "transport",
            IHealthError::Api { .. } => "api",
            IHealthError::Parse(_) => "parse",
            IHealthError::Persistence(_) => "persistence",
            IHealthError::InvalidState(_) => "invalid_state",
            IHealthError::CorruptToken(_) => "corrupt_token",
            IHealthError::Request(_) => "request",
            IHealthError::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_transport_error_is_prefixed() {
        let err = IHealthError::Transport {
            context: "token refresh",
            source: "connection reset".into(),
        };
        assert_eq!(err.to_string(), "token refresh: connection reset");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn api_error_combines_code_and_description() {
        let err = IHealthError::Api {
            code: "401".to_owned(),
            description: "bad code".to_owned(),
        };
        assert_eq!(err.to_string(), "401 bad code");
        assert_eq!(err.kind(), "api");
    }
}
