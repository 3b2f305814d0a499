//! Tolerant reader for the nested-array payload of `translate_a/single`.
//!
//! The body looks like JSON but is really a JavaScript array literal: slots
//! may be elided (`[1,,2]`), trailing commas are allowed and strings may use
//! single quotes or `\xHH` escapes. This module reads exactly that grammar
//! into a [`serde_json::Value`]:
//!
//! ```text
//! value   := array | string | number | ident
//! array   := '[' (elem? ',')* elem? ']'     // a missing elem is null
//! string  := '"' chars '"' | '\'' chars '\''
//! ident   := [A-Za-z_$][A-Za-z0-9_$]*       // true/false, anything else is null
//! ```
//!
//! Nothing is ever evaluated.

use serde_json::{Number, Value};
use thiserror::Error;

/// Nesting limit; real payloads stay below 10.
const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {position}")]
pub struct PayloadError {
    pub position: usize,
    pub message: String,
}

/// Parse a complete payload. Trailing non-whitespace is an error.
pub fn parse(input: &str) -> Result<Value, PayloadError> {
    let mut reader = Reader { input, pos: 0 };
    reader.skip_whitespace();
    if reader.peek().is_none() {
        return Err(reader.error("empty payload"));
    }

    let value = reader.value(0)?;
    reader.skip_whitespace();
    if reader.peek().is_some() {
        return Err(reader.error("unexpected trailing characters"));
    }

    Ok(value)
}

struct Reader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn error(&self, message: impl Into<String>) -> PayloadError {
        PayloadError {
            position: self.pos,
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value, PayloadError> {
        if depth > MAX_DEPTH {
            return Err(self.error("payload nested too deeply"));
        }

        self.skip_whitespace();
        match self.peek() {
            Some(b'[') => self.array(depth),
            Some(quote @ (b'"' | b'\'')) => self.string(quote).map(Value::String),
            Some(b'-' | b'+' | b'.' | b'0'..=b'9') => self.number(),
            Some(c) if c.is_ascii_alphabetic() || c == b'_' || c == b'$' => Ok(self.ident()),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c as char))),
            None => Err(self.error("unexpected end of payload")),
        }
    }

    fn array(&mut self, depth: usize) -> Result<Value, PayloadError> {
        // consume '['
        self.pos += 1;
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                Some(b',') => {
                    // elided slot
                    self.pos += 1;
                    items.push(Value::Null);
                    continue;
                }
                None => return Err(self.error("unterminated array")),
                _ => {}
            }

            items.push(self.value(depth + 1)?);

            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                Some(c) => {
                    return Err(self.error(format!("expected ',' or ']', found '{}'", c as char)))
                }
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn string(&mut self, quote: u8) -> Result<String, PayloadError> {
        // consume opening quote
        self.pos += 1;
        let mut out = String::new();
        let mut run_start = self.pos;

        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => {
                    out.push_str(&self.input[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.input[run_start..self.pos]);
                    self.pos += 1;
                    self.escape(&mut out)?;
                    run_start = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), PayloadError> {
        let Some(c) = self.peek() else {
            return Err(self.error("unterminated escape"));
        };
        self.pos += 1;

        match c {
            b'n' => out.push('\n'),
            b't' => out.push('\t'),
            b'r' => out.push('\r'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'v' => out.push('\u{b}'),
            b'0' => out.push('\0'),
            b'x' => {
                let code = self.hex(2)?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            b'u' => {
                let high = self.hex(4)?;
                out.push(self.surrogate_pair(high)?);
            }
            _ => {
                // any other escaped character stands for itself, possibly multi-byte
                self.pos -= 1;
                let ch = self.input[self.pos..]
                    .chars()
                    .next()
                    .ok_or_else(|| self.error("unterminated escape"))?;
                out.push(ch);
                self.pos += ch.len_utf8();
            }
        }

        Ok(())
    }

    fn surrogate_pair(&mut self, high: u32) -> Result<char, PayloadError> {
        if !(0xD800..0xDC00).contains(&high) {
            return Ok(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER));
        }

        let rest = &self.input.as_bytes()[self.pos..];
        if rest.len() >= 6 && rest[0] == b'\\' && rest[1] == b'u' {
            let start = self.pos;
            self.pos += 2;
            let low = self.hex(4)?;
            if (0xDC00..0xE000).contains(&low) {
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            // Not a low surrogate; leave the escape for the caller
            self.pos = start;
        }

        Ok(char::REPLACEMENT_CHARACTER)
    }

    fn hex(&mut self, digits: usize) -> Result<u32, PayloadError> {
        let end = self.pos + digits;
        let text = self
            .input
            .get(self.pos..end)
            .ok_or_else(|| self.error("truncated hex escape"))?;
        if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(self.error("invalid hex escape"));
        }
        let code = u32::from_str_radix(text, 16).map_err(|_| self.error("invalid hex escape"))?;
        self.pos = end;
        Ok(code)
    }

    fn number(&mut self) -> Result<Value, PayloadError> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9')
        ) {
            self.pos += 1;
        }

        let text = &self.input[start..self.pos];
        if let Ok(int) = text.parse::<i64>() {
            return Ok(Value::Number(Number::from(int)));
        }

        let float: f64 = text.parse().map_err(|_| PayloadError {
            position: start,
            message: format!("invalid number '{}'", text),
        })?;
        Ok(Number::from_f64(float).map(Value::Number).unwrap_or(Value::Null))
    }

    fn ident(&mut self) -> Value {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_' || c == b'$')
        {
            self.pos += 1;
        }

        match &self.input[start..self.pos] {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Null,
        }
    }
}
