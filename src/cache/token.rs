use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::utils::constants::TOKEN_SAFETY_MARGIN_SECS;

/// Cached bearer credential and the instant it stops being usable.
#[derive(Clone, Default)]
pub struct Credential {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>, // None until the first refresh
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credential {
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at: Some(expires_at) }
    }

    /// Check if the token can still be handed out at `now`
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        if self.token.is_empty() {
            return false;
        }
        self.expires_at
            .map(|exp| now + Duration::seconds(TOKEN_SAFETY_MARGIN_SECS) < exp)
            .unwrap_or(false)
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }
}
