use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::token::Credential;
use crate::config::settings::AuthConfig;
use crate::error::{AuthError, Error, Result};
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::sources::oauth::OAuthSource;

#[derive(Debug, Default)]
struct Slot {
    credential: Credential,
    /// outcome of the most recent refresh when it failed
    last_failure: Option<Arc<AuthError>>,
}

/// Self-refreshing access-token cache.
///
/// Holds a single credential behind a read/write lock. Readers that find a
/// fresh token share the read lock; refreshes take the write lock, so at most
/// one request to the authorization endpoint is in flight at a time.
#[derive(Debug)]
pub struct TokenManager {
    source: OAuthSource,
    slot: RwLock<Slot>,
    /// number of finished refresh attempts, readable without the lock
    completed: AtomicU64,
}

impl TokenManager {
    pub fn new(cfg: &AuthConfig) -> Result<Self> {
        Ok(Self::from_source(OAuthSource::new(cfg)?))
    }

    pub fn from_source(source: OAuthSource) -> Self {
        Self {
            source,
            slot: RwLock::new(Slot::default()),
            completed: AtomicU64::new(0),
        }
    }

    /// Return a bearer token with more than the safety margin of validity left.
    pub async fn get_token(&self) -> Result<String> {
        let observed = self.completed.load(Ordering::Acquire);

        {
            let slot = self.slot.read().await;
            if slot.credential.is_fresh() {
                get_metrics().await.token_cache_hits.inc();
                return Ok(slot.credential.token.clone());
            }
        }

        self.refresh(observed).await
    }

    async fn refresh(&self, observed: u64) -> Result<String> {
        let mut slot = self.slot.write().await;

        // someone refreshed while we were waiting
        if slot.credential.is_fresh() {
            get_metrics().await.token_cache_hits.inc();
            return Ok(slot.credential.token.clone());
        }
        // someone failed while we were waiting
        if self.completed.load(Ordering::Acquire) != observed {
            if let Some(failure) = &slot.last_failure {
                return Err(Error::Authentication(failure.clone()));
            }
        }

        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.token_refresh_requests.inc();
        debug!(url = %self.source.url(), "refreshing access token");

        let outcome = self.source.fetch_token().await;
        metrics.token_refresh_duration.observe(start.elapsed().as_secs_f64());

        let result = match outcome {
            Ok(credential) => {
                debug!(expires_at = ?credential.expires_at, "access token refreshed");
                let token = credential.token.clone();
                slot.credential = credential;
                slot.last_failure = None;
                Ok(token)
            }
            Err(e) => {
                metrics.token_refresh_failures.with_label_values(&[failure_reason(&e)]).inc();
                let failure = Arc::new(e);
                slot.last_failure = Some(failure.clone());
                Err(Error::Authentication(failure))
            }
        };

        self.completed.fetch_add(1, Ordering::Release);
        result
    }
}

fn failure_reason(e: &AuthError) -> &'static str {
    match e {
        AuthError::Request(_) => "request",
        AuthError::Transport(_) => "transport",
        AuthError::Status { .. } => "status",
        AuthError::Decode(_) => "decode",
        AuthError::EmptyToken => "empty_token",
    }
}
