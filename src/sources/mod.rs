//! Sources of access tokens.

pub mod oauth;
