use std::fmt;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::cache::token::Credential;
use crate::config::settings::AuthConfig;
use crate::error::{AuthError, Result};
use crate::helpers::time::{now, resolve_expires_at};
use crate::utils::constants::OAUTH_PATH;

/// Body of a successful authorization response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    /// epoch seconds or epoch milliseconds
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl TokenResponse {
    pub fn into_credential(self) -> Result<Credential, AuthError> {
        if self.access_token.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        let expires_at = resolve_expires_at(self.expires_at, now());
        Ok(Credential::new(self.access_token, expires_at))
    }
}

/// OAuth client-credentials source for GigaChat access tokens.
#[derive(Clone)]
pub struct OAuthSource {
    auth_key: String,
    scope: String,
    url: String,
    client: Client,
}

impl fmt::Debug for OAuthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthSource")
            .field("auth_key", &"<redacted>")
            .field("scope", &self.scope)
            .field("url", &self.url)
            .finish()
    }
}

impl OAuthSource {
    pub fn new(cfg: &AuthConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            auth_key: cfg.resolve_auth_key()?,
            scope: cfg.scope.clone(),
            url: format!("{}{}", cfg.oauth_uri(), OAUTH_PATH),
            client: cfg.http_client()?,
        })
    }

    /// Use a caller-supplied HTTP client instead of the one built from config.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run one client-credentials exchange.
    pub async fn fetch_token(&self) -> Result<Credential, AuthError> {
        let rq_uid = Uuid::new_v4().to_string();
        debug!(rq_uid = %rq_uid, url = %self.url, "requesting access token");

        let request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .header("RqUID", rq_uid.as_str())
            .header(AUTHORIZATION, format!("Basic {}", self.auth_key))
            .form(&[("scope", self.scope.as_str())])
            .build()
            .map_err(AuthError::Request)?;

        let response = self.client.execute(request).await.map_err(AuthError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Status { status, body });
        }

        let body = response.text().await.map_err(AuthError::Transport)?;
        let token_response: TokenResponse = serde_json::from_str(&body).map_err(AuthError::Decode)?;
        token_response.into_credential()
    }
}
