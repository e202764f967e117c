//! Request layer on top of the token cache and the stream decoder.

pub mod chat;
pub mod conversation;
pub mod options;
pub mod validation;
