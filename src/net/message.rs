//! Framing of the text section of email and post packets:
//!
//! ```text
//! [to_name \0]  title \0  sender \r\n  date \r\n  body
//! ```
//!
//! `to_name` is only present for name-addressed email.
use chrono::{TimeZone, Utc};
use serde::Serialize;

use super::scanner::{Field, FieldScanner};
use super::types::MainType;
use crate::validation::{validate_sender, validate_title, validate_to_name, FieldError};

/// Read bound for single-line header fields of incoming text.
const LINE_FIELD_MAX: usize = 81;
/// Read bound for the sender field of incoming text.
const SENDER_FIELD_MAX: usize = 205;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_name: Option<String>,
    pub title: String,
    pub sender: String,
    pub date: String,
    #[serde(serialize_with = "lossy")]
    pub body: Vec<u8>,
}

/// A parsed message plus the names of any fields the length bounds cut short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub message: NetMessage,
    pub truncated: Vec<&'static str>,
}

/// Render a header timestamp as the date line, e.g. `Tue Nov 14 22:13:20 2023`.
pub fn date_line(timestamp: u32) -> String {
    match Utc.timestamp_opt(i64::from(timestamp), 0).single() {
        Some(dt) => dt.format("%a %b %d %H:%M:%S %Y").to_string(),
        None => String::new(),
    }
}

impl NetMessage {
    pub fn new(title: &str, sender: &str, timestamp: u32, body: &[u8]) -> Self {
        NetMessage {
            to_name: None,
            title: title.to_string(),
            sender: sender.to_string(),
            date: date_line(timestamp),
            body: body.to_vec(),
        }
    }

    pub fn with_to_name(mut self, to_name: &str) -> Self {
        self.to_name = Some(to_name.to_string());
        self
    }

    /// Validate the fields and produce the framed text bytes.
    pub fn encode(&self) -> Result<Vec<u8>, FieldError> {
        let title = validate_title(&self.title)?;
        let sender = validate_sender(&self.sender)?;
        let mut out = Vec::with_capacity(self.date.len() + title.len() + sender.len() + self.body.len() + 8);
        if let Some(to) = &self.to_name {
            // An empty title would merge the two NULs into one delimiter run.
            if title.is_empty() {
                return Err(FieldError::Empty { field: "title" });
            }
            out.extend_from_slice(validate_to_name(to)?.as_bytes());
            out.push(0);
        }
        out.extend_from_slice(title.as_bytes());
        out.push(0);
        out.extend_from_slice(sender.as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(self.date.as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        Ok(out)
    }

    /// Split framed text back into fields. Never fails: missing fields come
    /// back empty and over-long ones are cut at their bound and reported.
    pub fn parse(text: &[u8], message_type: u16) -> ParsedMessage {
        let mut sc = FieldScanner::new(text);
        let mut truncated = Vec::new();

        let to_name = if MainType::from_code(message_type) == Some(MainType::EmailName) {
            Some(take(&mut sc, b"\0", LINE_FIELD_MAX, "addressee", &mut truncated).to_string_lossy())
        } else {
            None
        };
        let title = take(&mut sc, b"\0", LINE_FIELD_MAX, "title", &mut truncated).to_string_lossy();
        let sender = take(&mut sc, b"\r", SENDER_FIELD_MAX, "sender", &mut truncated).to_string_lossy();
        sc.skip_if(b'\n');
        let date = take(&mut sc, b"\r", LINE_FIELD_MAX, "date", &mut truncated).to_string_lossy();
        sc.skip_if(b'\n');

        ParsedMessage {
            message: NetMessage { to_name, title, sender, date, body: sc.rest().to_vec() },
            truncated,
        }
    }
}

/// Scan one field; on truncation record it and drop the rest of the field so
/// the following fields stay aligned.
fn take<'a>(
    sc: &mut FieldScanner<'a>,
    stop: &[u8],
    max: usize,
    name: &'static str,
    truncated: &mut Vec<&'static str>,
) -> Field<'a> {
    let field = sc.next_field(stop, max);
    if field.truncated {
        truncated.push(name);
        sc.next_field(stop, usize::MAX);
    }
    field
}

fn lossy<S: serde::Serializer>(body: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&String::from_utf8_lossy(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: u32 = 1_700_000_000;

    #[test]
    fn date_line_format() {
        assert_eq!(date_line(TS), "Tue Nov 14 22:13:20 2023");
    }

    #[test]
    fn framed_layout() {
        let msg = NetMessage::new("Hi", "ALICE #1 @1", TS, b"body text");
        let raw = msg.encode().unwrap();
        assert_eq!(raw, b"Hi\0ALICE #1 @1\r\nTue Nov 14 22:13:20 2023\r\nbody text".to_vec());
        let parsed = NetMessage::parse(&raw, MainType::Email.code());
        assert_eq!(parsed.message, msg);
        assert!(parsed.truncated.is_empty());
    }

    #[test]
    fn name_addressed_email_carries_to_name() {
        let msg = NetMessage::new("Lunch", "BOB #2 @7", TS, b"\r\nblank line first").with_to_name("CAROL");
        let raw = msg.encode().unwrap();
        assert!(raw.starts_with(b"CAROL\0Lunch\0"));
        let parsed = NetMessage::parse(&raw, MainType::EmailName.code());
        assert_eq!(parsed.message, msg);
    }

    #[test]
    fn empty_title_with_to_name_is_refused() {
        let msg = NetMessage::new("", "BOB", TS, b"x").with_to_name("CAROL");
        assert_eq!(msg.encode(), Err(FieldError::Empty { field: "title" }));
    }

    #[test]
    fn overlong_title_is_reported_and_realigned() {
        let mut raw = vec![b'T'; 100];
        raw.push(0);
        raw.extend_from_slice(b"SENDER\r\nDATE\r\nBODY");
        let parsed = NetMessage::parse(&raw, MainType::Post.code());
        assert_eq!(parsed.truncated, vec!["title"]);
        assert_eq!(parsed.message.title.len(), LINE_FIELD_MAX);
        assert_eq!(parsed.message.sender, "SENDER");
        assert_eq!(parsed.message.body, b"BODY");
    }

    #[test]
    fn short_text_yields_empty_fields() {
        let parsed = NetMessage::parse(b"only title", MainType::Post.code());
        assert_eq!(parsed.message.title, "only title");
        assert!(parsed.message.sender.is_empty());
        assert!(parsed.message.body.is_empty());
    }
}
