mod common;

mod config_validation;
mod streaming_chat;
