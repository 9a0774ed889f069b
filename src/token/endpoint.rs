use chrono::{DateTime, Local};
use serde::de::Error as _;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::{IHealthError, Result};
use crate::token::token::Token;

/// Success body of the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    #[serde(rename = "AccessToken")]
    access_token: String,
    #[serde(rename = "RefreshToken", default)]
    refresh_token: Option<String>,
    #[serde(rename = "Expires")]
    expires: i64,
    #[serde(rename = "UserID", default)]
    user_id: Option<Value>,
}

/// Decode a token endpoint body into a fresh [`Token`] issued at `issued_at`.
///
/// The body decides the outcome, not the HTTP status: an `Error` flag yields
/// [`IHealthError::Api`], anything else that is not a full grant yields
/// [`IHealthError::Parse`].
pub fn decode_token_response(body: &str, issued_at: DateTime<Local>) -> Result<Token> {
    let json: Value = serde_json::from_str(body).map_err(IHealthError::Parse)?;

    if json.get("Error").is_some_and(is_truthy) {
        let code = json.get("ErrorCode").map(value_to_string).unwrap_or_default();
        let description = json
            .get("ErrorDescription")
            .map(value_to_string)
            .unwrap_or_default();
        debug!(%code, %description, "token endpoint reported an error");
        return Err(IHealthError::Api { code, description });
    }

    let grant: TokenGrant = serde_json::from_value(json).map_err(IHealthError::Parse)?;
    if grant.access_token.is_empty() {
        return Err(IHealthError::Parse(serde_json::Error::custom("empty AccessToken")));
    }

    let user_id = grant.user_id.as_ref().and_then(|v| match v {
        Value::Null => None,
        other => Some(value_to_string(other)),
    });

    Token::issued(grant.access_token, grant.refresh_token, grant.expires, user_id, issued_at)
        .ok_or_else(|| IHealthError::Parse(serde_json::Error::custom("Expires out of range")))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_owned(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
