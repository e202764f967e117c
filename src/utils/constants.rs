//! Shared constants and invariants

/// A cached token is only handed out while it has more validity left than this.
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 30;
/// Lifetime assumed when the authorization response carries no expiry.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 29 * 60;
/// `expires_at` values above this are epoch milliseconds.
pub const EXPIRES_AT_MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

pub const DEFAULT_SCOPE: &str = "GIGACHAT_API_PERS";
pub const DEFAULT_OAUTH_URI: &str = "https://ngw.devices.sberbank.ru:9443";
pub const DEFAULT_BASE_URI: &str = "https://gigachat.devices.sberbank.ru";
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 60;

// Endpoint paths
pub const OAUTH_PATH: &str = "/api/v2/oauth";
pub const MODELS_PATH: &str = "/api/v1/models";
pub const CHAT_COMPLETIONS_PATH: &str = "/api/v1/chat/completions";
pub const FILES_PATH: &str = "/api/v1/files";

// Event-stream syntax
pub const SSE_DATA_FIELD: &str = "data:";
pub const SSE_DONE_SENTINEL: &str = "[DONE]";
/// longest event-stream line accepted before decoding fails
pub const SSE_MAX_LINE_BYTES: usize = 64 * 1024;
