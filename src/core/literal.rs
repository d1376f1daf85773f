//! Tolerant object-literal parsing and canonical serialization.
//!
//! Tag arguments are written as JavaScript object literals, not strict JSON:
//! keys may be unquoted, strings may use single quotes, and trailing commas
//! are common. This module is a small dedicated parser for that shape rather
//! than a strict JSON parser with pre-processing hacks. The inverse
//! direction, [`write_object`], produces the canonical single-line form the
//! regenerator writes back into source files.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Parse failure inside a tag argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

/// Parse a relaxed object literal into a JSON object.
///
/// Tolerates unquoted keys, single-quoted strings, and trailing commas.
/// The whole input must be one object literal; trailing whitespace is fine.
pub fn parse_object(text: &str) -> Result<Map<String, Value>, LiteralError> {
    let mut cursor = Cursor::new(text);
    cursor.skip_whitespace();
    let object = cursor.parse_object()?;
    cursor.skip_whitespace();
    if cursor.peek().is_some() {
        return Err(cursor.error("unexpected characters after object literal"));
    }
    Ok(object)
}

/// Serialize an object in the canonical single-line form.
///
/// Identifier-safe keys are written unquoted, everything else double-quoted:
/// `{namespace: "common", path: "auth.login"}`. This is the form the tag
/// regenerator compares against and writes back into source files, so it
/// must be deterministic.
pub fn write_object(object: &Map<String, Value>) -> String {
    let mut out = String::from("{");
    for (i, (key, value)) in object.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if is_identifier(key) {
            out.push_str(key);
        } else {
            out.push_str(&Value::String(key.clone()).to_string());
        }
        out.push_str(": ");
        write_value(value, &mut out);
    }
    out.push('}');
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => out.push_str(&write_object(map)),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(item, out);
            }
            out.push(']');
        }
        // String, number, bool, null all have the JSON form we want.
        other => out.push_str(&other.to_string()),
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

struct Cursor<'a> {
    src: &'a str,
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, offset: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.offset..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: &str) -> LiteralError {
        LiteralError {
            offset: self.offset,
            message: message.to_string(),
        }
    }

    fn parse_object(&mut self) -> Result<Map<String, Value>, LiteralError> {
        if !self.eat('{') {
            return Err(self.error("expected '{'"));
        }
        let mut object = Map::new();
        loop {
            self.skip_whitespace();
            if self.eat('}') {
                return Ok(object);
            }
            let key = self.parse_key()?;
            self.skip_whitespace();
            if !self.eat(':') {
                return Err(self.error("expected ':' after object key"));
            }
            let value = self.parse_value()?;
            object.insert(key, value);
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                return Ok(object);
            }
            return Err(self.error("expected ',' or '}' in object literal"));
        }
    }

    fn parse_key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some('"') | Some('\'') => self.parse_string(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => Ok(self.parse_word()),
            _ => Err(self.error("expected object key")),
        }
    }

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => Ok(Value::Object(self.parse_object()?)),
            Some('[') => self.parse_array(),
            Some('"') | Some('\'') => Ok(Value::String(self.parse_string()?)),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let word = self.parse_word();
                match word.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    _ => Err(self.error("unexpected bare word value")),
                }
            }
            _ => Err(self.error("expected a value")),
        }
    }

    fn parse_array(&mut self) -> Result<Value, LiteralError> {
        self.bump(); // '['
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(']') {
                return Ok(Value::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                return Ok(Value::Array(items));
            }
            return Err(self.error("expected ',' or ']' in array literal"));
        }
    }

    fn parse_string(&mut self) -> Result<String, LiteralError> {
        let quote = match self.bump() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected a string")),
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('\\') => match self.bump() {
                    None => return Err(self.error("unterminated escape sequence")),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('u') => out.push(self.parse_unicode_escape()?),
                    // Quotes, backslashes, and unknown escapes keep the
                    // escaped character itself.
                    Some(other) => out.push(other),
                },
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char, LiteralError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid \\u escape"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.error("invalid \\u escape"))
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.offset;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                self.bump();
            } else {
                break;
            }
        }
        let text = &self.src[start..self.offset];
        if let Ok(int) = text.parse::<i64>() {
            return Ok(Value::Number(Number::from(int)));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error("invalid number literal"))
    }

    fn parse_word(&mut self) -> String {
        let start = self.offset;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                self.bump();
            } else {
                break;
            }
        }
        self.src[start..self.offset].to_string()
    }
}
