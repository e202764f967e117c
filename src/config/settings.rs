use std::fmt;
use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::GIGACHAT;
use crate::utils::constants::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_AUTH_TIMEOUT_SECS, DEFAULT_BASE_URI, DEFAULT_OAUTH_URI, DEFAULT_SCOPE,
};

/// ================================
/// Full client configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub auth: AuthConfig,
    #[serde(default)]
    pub api: ApiConfig,
    pub logging: Option<LoggingConfig>,
}

/// ================================
/// Authorization endpoint
/// ================================
#[derive(Deserialize, Clone)]
pub struct AuthConfig {
    /// base64("client_id:client_secret"), sent as HTTP Basic credentials
    #[serde(default)]
    pub auth_key: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_oauth_uri")]
    pub oauth_uri: String,
    #[serde(default = "default_auth_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("auth_key", &redact(&self.auth_key))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("scope", &self.scope)
            .field("oauth_uri", &self.oauth_uri)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .finish()
    }
}

impl AuthConfig {
    pub fn new(auth_key: impl Into<String>) -> Self {
        Self {
            auth_key: Some(auth_key.into()),
            client_id: None,
            client_secret: None,
            scope: default_scope(),
            oauth_uri: default_oauth_uri(),
            timeout_seconds: DEFAULT_AUTH_TIMEOUT_SECS,
            insecure_skip_verify: false,
        }
    }

    /// Build the auth key from a client id / secret pair.
    pub fn from_client_credentials(client_id: &str, client_secret: &str) -> Self {
        Self::new(encode_client_credentials(client_id, client_secret))
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_oauth_uri(mut self, uri: impl Into<String>) -> Self {
        self.oauth_uri = uri.into();
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }

    /// The key sent as HTTP Basic credentials.
    ///
    /// An explicit `auth_key` wins; otherwise it is derived from
    /// `client_id` and `client_secret`.
    pub fn resolve_auth_key(&self) -> Result<String> {
        if let Some(key) = self.auth_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            return Ok(key.to_owned());
        }
        match (non_empty(&self.client_id), non_empty(&self.client_secret)) {
            (Some(id), Some(secret)) => Ok(encode_client_credentials(id, secret)),
            _ => Err(Error::Config(
                "auth_key or client_id and client_secret must be set".to_owned(),
            )),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.resolve_auth_key()?;
        if self.scope.trim().is_empty() {
            return Err(Error::Config("auth.scope cannot be empty".to_owned()));
        }
        validate_uri("auth.oauth_uri", &self.oauth_uri)?;
        validate_timeout("auth.timeout_seconds", self.timeout_seconds)
    }

    pub fn oauth_uri(&self) -> &str {
        self.oauth_uri.trim_end_matches('/')
    }

    pub fn http_client(&self) -> Result<Client> {
        build_http_client(self.timeout_seconds, self.insecure_skip_verify)
    }
}

/// ================================
/// Chat API endpoint
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_uri")]
    pub base_uri: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_api_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
            default_model: default_model(),
            timeout_seconds: DEFAULT_API_TIMEOUT_SECS,
            insecure_skip_verify: false,
        }
    }
}

impl ApiConfig {
    pub fn with_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = uri.into();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_uri("api.base_uri", &self.base_uri)?;
        if self.default_model.trim().is_empty() {
            return Err(Error::Config("api.default_model cannot be empty".to_owned()));
        }
        validate_timeout("api.timeout_seconds", self.timeout_seconds)
    }

    pub fn base_uri(&self) -> &str {
        self.base_uri.trim_end_matches('/')
    }

    pub fn http_client(&self) -> Result<Client> {
        build_http_client(self.timeout_seconds, self.insecure_skip_verify)
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default = "default_log_format")]
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

impl ClientConfig {
    pub fn new(auth: AuthConfig) -> Self {
        Self { auth, api: ApiConfig::default(), logging: None }
    }

    pub fn validate(&self) -> Result<()> {
        self.auth.validate()?;
        self.api.validate()
    }
}

pub fn encode_client_credentials(client_id: &str, client_secret: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(format!("{client_id}:{client_secret}"))
}

fn build_http_client(timeout_seconds: u64, insecure_skip_verify: bool) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .danger_accept_invalid_certs(insecure_skip_verify)
        .build()
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))
}

fn redact(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn validate_uri(field: &str, uri: &str) -> Result<()> {
    let uri = uri.trim();
    if uri.starts_with("http://") || uri.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::Config(format!("{field} must be an http(s) URI, got '{uri}'")))
    }
}

fn validate_timeout(field: &str, timeout_seconds: u64) -> Result<()> {
    if timeout_seconds == 0 {
        return Err(Error::Config(format!("{field} must be greater than zero")));
    }
    Ok(())
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_owned()
}

fn default_oauth_uri() -> String {
    DEFAULT_OAUTH_URI.to_owned()
}

fn default_auth_timeout() -> u64 {
    DEFAULT_AUTH_TIMEOUT_SECS
}

fn default_base_uri() -> String {
    DEFAULT_BASE_URI.to_owned()
}

fn default_model() -> String {
    GIGACHAT.to_owned()
}

fn default_api_timeout() -> u64 {
    DEFAULT_API_TIMEOUT_SECS
}

fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_auth_key_wins_over_client_credentials() {
        let mut auth = AuthConfig::new("explicit-key");
        auth.client_id = Some("id".into());
        auth.client_secret = Some("secret".into());
        assert_eq!(auth.resolve_auth_key().unwrap(), "explicit-key");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let mut auth = AuthConfig::new("very-secret-key");
        auth.client_id = Some("public-id".into());
        auth.client_secret = Some("very-secret-password".into());
        let config = ClientConfig::new(auth);

        let printed = format!("{:?}", config);
        assert!(!printed.contains("very-secret-key"));
        assert!(!printed.contains("very-secret-password"));
        assert!(printed.contains("public-id"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn auth_key_is_derived_from_client_credentials() {
        let auth = AuthConfig::from_client_credentials("id", "secret");
        // base64("id:secret")
        assert_eq!(auth.resolve_auth_key().unwrap(), "aWQ6c2VjcmV0");
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let mut auth = AuthConfig::new("");
        auth.client_id = Some("id".into());
        let err = auth.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let auth = AuthConfig::new("k").with_oauth_uri("https://auth.local:9443/");
        assert_eq!(auth.oauth_uri(), "https://auth.local:9443");

        let api = ApiConfig::default().with_base_uri("https://api.local//");
        assert_eq!(api.base_uri(), "https://api.local");
    }

    #[test]
    fn invalid_uri_and_zero_timeout_are_rejected() {
        let api = ApiConfig::default().with_base_uri("ftp://nope");
        assert!(api.validate().is_err());

        let auth = AuthConfig::new("k").with_timeout(0);
        assert!(auth.validate().is_err());
    }
}
