#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;

use thiserror::Error;

use crate::config::constants::{
    MAX_CONVERSATION_ID_LENGTH, MAX_MESSAGE_LENGTH, SANITIZE_MAX_LENGTH,
};

/// Caller-fixable input rejections. Mapped to 400 responses by the request
/// boundary and never logged as application errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Message is required")]
    EmptyMessage,
    #[error("Message exceeds the maximum allowed length")]
    MessageTooLong,
    #[error("Conversation ID must be 1-256 characters of letters, digits, hyphen or underscore")]
    InvalidConversationId,
}

impl ValidationError {
    /// Stable error code used in the boundary's `{error, message}` envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyMessage => "empty_message",
            ValidationError::MessageTooLong => "message_too_long",
            ValidationError::InvalidConversationId => "invalid_conversation_id",
        }
    }
}

/// Cleans raw user text: drops control characters except newline, strips
/// surrounding whitespace and bounds the result to `max_length` characters.
/// Trims again after the cut since truncation can expose trailing whitespace;
/// the function is total and idempotent.
pub fn sanitize(text: &str, max_length: usize) -> String {
    let cleaned = text
        .chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect::<String>();
    let bounded = cleaned.trim().chars().take(max_length).collect::<String>();
    bounded.trim().to_string()
}

/// Sanitizes with the 50k cap, then rejects on the post-sanitization form:
/// empty input and input longer than the 10k message bound.
pub fn validate_message(text: &str) -> Result<String, ValidationError> {
    let sanitized = sanitize(text, SANITIZE_MAX_LENGTH);
    if sanitized.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    if sanitized.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ValidationError::MessageTooLong);
    }
    Ok(sanitized)
}

/// True iff `id` matches `[A-Za-z0-9_-]{1,256}`. The allow-list keeps the id
/// usable as a storage key without quoting or escaping.
pub fn validate_conversation_id(id: &str) -> bool {
    if id.is_empty() || id.len() > MAX_CONVERSATION_ID_LENGTH {
        return false;
    }
    id.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
