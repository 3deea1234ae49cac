//! Logging helpers for message text that came from users or from other nodes.
//! Titles and sender names are escaped so a log record stays on one line.

/// Longest preview written to the log before an ellipsis.
const MAX_PREVIEW: usize = 120;

/// Escape a string for single-line logging:
/// - `\n` => `\\n`, `\r` => `\\r`, `\t` => `\\t`, NUL => `\\0`
/// - backslash => `\\\\`
/// - other control characters => `\\xNN`
///
/// Strings longer than `MAX_PREVIEW` characters are cut with an ellipsis.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        push_escaped(&mut out, ch);
    }
    out
}

/// [`escape_log`] for raw 8-bit packet text; bytes that are not UTF-8 are
/// shown as `\\xNN`.
pub fn escape_log_bytes(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len().min(MAX_PREVIEW) + 8);
    for (count, b) in raw.iter().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        if b.is_ascii() {
            push_escaped(&mut out, char::from(*b));
        } else {
            out.push_str(&format!("\\x{:02X}", b));
        }
    }
    out
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\0' => out.push_str("\\0"),
        c if c.is_control() => {
            use std::fmt::Write;
            let _ = write!(out, "\\x{:02X}", c as u32);
        }
        c => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_delimiters() {
        assert_eq!(escape_log("Title\0ALICE\r\nDate"), "Title\\0ALICE\\r\\nDate");
    }

    #[test]
    fn escapes_high_bytes_and_truncates() {
        assert_eq!(escape_log_bytes(b"caf\xe9"), "caf\\xE9");
        let long = "a".repeat(MAX_PREVIEW + 10);
        assert!(escape_log(&long).ends_with('…'));
    }
}
