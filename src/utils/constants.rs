//! Shared constants and invariants

pub const DEFAULT_TIMEOUT_MS: u64 = 60 * 1000;

/// Placeholder in request URLs replaced by the token's user id.
pub const USER_ID_PLACEHOLDER: &str = "_USERID_";

pub const GRANT_TYPE_AUTHORIZATION_CODE: &str = "authorization_code";
pub const RESPONSE_TYPE_REFRESH_TOKEN: &str = "refresh_token";
