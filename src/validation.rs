//! Validation of the text fields framed into a network message.
//!
//! The message text is `title \0 byname \r\n date \r\n body`, so a NUL in a
//! title or a line break in a sender name would shift every following field
//! for the reader on the other end. These checks run before anything is
//! encoded.

/// Longest title accepted, in bytes.
pub const TITLE_MAX: usize = 72;
/// Longest sender display name accepted, in bytes.
pub const SENDER_MAX: usize = 205;
/// Longest addressee name for name-addressed email, in bytes.
pub const TO_NAME_MAX: usize = 80;

/// Field validation errors with helpful messages
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} is too long (maximum {max} bytes)")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} contains a field delimiter (byte 0x{byte:02X})")]
    ContainsDelimiter { field: &'static str, byte: u8 },

    #[error("{field} contains control characters: {chars}")]
    InvalidCharacters { field: &'static str, chars: String },
}

fn check_field(field: &'static str, value: &str, max: usize, allow_empty: bool) -> Result<String, FieldError> {
    let trimmed = value.trim_end();
    if !allow_empty && trimmed.trim_start().is_empty() {
        return Err(FieldError::Empty { field });
    }
    if trimmed.len() > max {
        return Err(FieldError::TooLong { field, max });
    }
    if let Some(b) = trimmed.bytes().find(|b| matches!(b, 0 | b'\r' | b'\n')) {
        return Err(FieldError::ContainsDelimiter { field, byte: b });
    }
    if trimmed.chars().any(|c| c.is_control() && c != '\t') {
        let chars = trimmed
            .chars()
            .filter(|c| c.is_control() && *c != '\t')
            .map(|c| format!("\\u{{{:04x}}}", c as u32))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(FieldError::InvalidCharacters { field, chars });
    }
    Ok(trimmed.to_string())
}

/// Validate a message title. Empty titles are allowed.
pub fn validate_title(title: &str) -> Result<String, FieldError> {
    check_field("title", title, TITLE_MAX, true)
}

/// Validate the sender display name ("byname").
pub fn validate_sender(byname: &str) -> Result<String, FieldError> {
    check_field("sender", byname, SENDER_MAX, false)
}

/// Validate the addressee name carried by name-addressed email.
pub fn validate_to_name(name: &str) -> Result<String, FieldError> {
    check_field("addressee", name, TO_NAME_MAX, false)
}
