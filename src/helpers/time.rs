use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::time::Instant;

use crate::utils::constants::{DEFAULT_TOKEN_LIFETIME_SECS, EXPIRES_AT_MILLIS_THRESHOLD};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Resolve the `expires_at` of a token response into an absolute instant.
///
/// Values above 10^12 are epoch milliseconds, everything else epoch seconds.
/// This is a heuristic: it holds as long as the authorization service keeps
/// reporting one of those two units. A missing or non-positive value means
/// the token lives for the default lifetime counted from `issued_at`.
pub fn resolve_expires_at(expires_at: Option<i64>, issued_at: DateTime<Utc>) -> DateTime<Utc> {
    let default = || issued_at + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS);

    match expires_at {
        Some(raw) if raw > 0 => {
            let secs = if raw > EXPIRES_AT_MILLIS_THRESHOLD { raw / 1000 } else { raw };
            Utc.timestamp_opt(secs, 0).single().unwrap_or_else(default)
        }
        _ => default(),
    }
}
