use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone, Utc};
use tokio::time::Instant;

/// Fixed-width local timestamp used for `expires_at`, e.g. `20150829T10:20:25`.
pub const EXPIRES_AT_FORMAT: &str = "%Y%m%dT%H:%M:%S";

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// `issued_at + expires_in` rendered with [`EXPIRES_AT_FORMAT`].
/// None when the sum leaves chrono's representable range.
pub fn expires_at_after(issued_at: DateTime<Local>, expires_in: i64) -> Option<String> {
    let delta = TimeDelta::try_seconds(expires_in)?;
    issued_at
        .checked_add_signed(delta)
        .map(|at| at.format(EXPIRES_AT_FORMAT).to_string())
}

/// Unix seconds of an `expires_at` string, read in the local clock.
pub fn parse_expires_at(value: &str) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(value, EXPIRES_AT_FORMAT).ok()?;
    resolve_local(naive, &Local).map(|at| at.timestamp())
}

/// Wall-clock time in `tz`. A time skipped by a forward DST shift is read
/// one hour later.
fn resolve_local<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Tz>> {
    naive.and_local_timezone(tz.clone()).earliest().or_else(|| {
        naive
            .checked_add_signed(TimeDelta::hours(1))?
            .and_local_timezone(tz.clone())
            .earliest()
    })
}
