use crate::error::{Error, Result};
use crate::models::Message;

/// Reject requests the API would refuse anyway.
pub fn validate_messages(messages: &[Message]) -> Result<()> {
    if messages.is_empty() {
        return Err(Error::Validation("messages array cannot be empty".to_owned()));
    }

    for (i, msg) in messages.iter().enumerate() {
        if !msg.role.is_request_role() {
            return Err(Error::Validation(format!(
                "invalid role '{}' at index {}. Must be 'user', 'system', or 'assistant'",
                msg.role.as_str(),
                i
            )));
        }
        if msg.content.trim().is_empty() {
            return Err(Error::Validation(format!(
                "message content at index {} must be a non-empty string",
                i
            )));
        }
    }

    Ok(())
}

pub fn validate_non_empty(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{what} cannot be empty")));
    }
    Ok(())
}
