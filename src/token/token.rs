use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::helpers::time::{expires_at_after, now_i64, parse_expires_at};

/// Authorization state for one end user of the iHealth API.
///
/// Serialized with the same keys the token file has always used
/// (`UserID` included), so tokens persisted earlier can be restored as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: i64,
    /// Local timestamp, see [`crate::helpers::time::EXPIRES_AT_FORMAT`].
    #[serde(default)]
    pub expires_at: String,
    #[serde(rename = "UserID", alias = "user_id", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Token {
    /// Build a token issued at `issued_at`; `expires_at` is always derived here.
    /// Returns None when `expires_in` overflows the calendar.
    pub fn issued(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
        user_id: Option<String>,
        issued_at: DateTime<Local>,
    ) -> Option<Self> {
        let expires_at = expires_at_after(issued_at, expires_in)?;
        Some(Self {
            access_token,
            refresh_token,
            expires_in,
            expires_at,
            user_id,
        })
    }

    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Unix seconds of `expires_at`, None if the stored value is not parsable.
    pub fn expires_at_unix(&self) -> Option<i64> {
        parse_expires_at(&self.expires_at)
    }

    /// True once the clock reaches `expires_at`. Unreadable expiry counts as expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at_unix()
            .map(|expires_at| now_i64() >= expires_at)
            .unwrap_or(true)
    }

    /// JSON rendering for diagnostics; secrets are masked.
    pub fn redacted(&self) -> String {
        let mut copy = self.clone();
        if copy.has_access_token() {
            copy.access_token = "***".to_owned();
        }
        copy.refresh_token = copy.refresh_token.map(|_| "***".to_owned());
        serde_json::to_string(&copy).unwrap_or_default()
    }
}
