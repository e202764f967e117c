//! # GigaChat client library
//!
//! Talks to the GigaChat chat-completion API: obtains OAuth access tokens,
//! caches and refreshes them, runs plain and streamed chat completions and
//! generates images through chat.
//!
//! Modules:
//! - `cache` — self-refreshing access-token cache
//! - `sources` — OAuth client-credentials token source
//! - `stream` — server-sent-event decoder for streamed completions
//! - `client` — request layer (chat, streaming, models, images)
//! - `config` — client configuration and YAML loading
//! - `models` — API wire types and model names

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod helpers;
pub mod models;
pub mod observability;
pub mod sources;
pub mod stream;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::cache::token_manager::TokenManager;
pub use crate::client::chat::Client;
pub use crate::client::conversation::{continue_chat, conversation, extract_content};
pub use crate::client::options::{ChatOptions, ImageOptions};
pub use crate::config::settings::{ApiConfig, AuthConfig, ClientConfig};
pub use crate::error::{AuthError, Error, Result};
pub use crate::models::*;
pub use crate::stream::event::StreamEvent;
