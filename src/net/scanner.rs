//! Delimited-field scanner for flat message text.
//!
//! Message text on the wire is 8-bit and not necessarily UTF-8, so the
//! scanner works over bytes.

/// One extracted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub bytes: &'a [u8],
    /// The length bound stopped the field before a stop byte or end of input.
    pub truncated: bool,
}

impl<'a> Field<'a> {
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.bytes).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Forward-only cursor over a byte buffer. Borrows the buffer; holds no
/// other state than the position.
#[derive(Debug, Clone)]
pub struct FieldScanner<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldScanner<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        FieldScanner { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Everything from the cursor to the end of input.
    pub fn rest(&self) -> &'a [u8] {
        self.buf.get(self.pos..).unwrap_or(&[])
    }

    /// Step over one `byte` if it is next. Used where exactly one delimiter
    /// must be consumed instead of a whole run.
    pub fn skip_if(&mut self, byte: u8) -> bool {
        if self.buf.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Take the longest run of non-stop bytes, at most `max` long, then skip
    /// any stop bytes that immediately follow it. An empty `stop` set means
    /// only `max` ends the field.
    pub fn next_field(&mut self, stop: &[u8], max: usize) -> Field<'a> {
        if self.is_at_end() {
            return Field { bytes: &[], truncated: false };
        }
        let start = self.pos;
        let mut end = start;
        while end < self.buf.len() && end - start < max && !stop.contains(&self.buf[end]) {
            end += 1;
        }
        let truncated = end - start == max && end < self.buf.len() && !stop.contains(&self.buf[end]);
        let field = &self.buf[start..end];

        self.pos = end;
        while self.pos < self.buf.len() && stop.contains(&self.buf[self.pos]) {
            self.pos += 1;
        }
        Field { bytes: field, truncated }
    }
}
