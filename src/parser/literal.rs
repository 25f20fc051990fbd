//! Decoder for the Cypher literal syntax printed inside property blocks.
//!
//! Handles maps (`{k: v}`), lists, single- and double-quoted strings with
//! backslash escapes, integers, floats, booleans and `null`. Keys may be bare
//! identifiers or backtick-quoted. Anything else that reads as a bare token
//! (temporal values, `point({...})`, durations) is kept verbatim as a string.

use crate::graph::{Properties, PropertyValue};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("empty value at offset {0}")]
    EmptyValue(usize),

    #[error("trailing input at offset {0}")]
    TrailingInput(usize),
}

/// Decode a complete `{...}` property block.
pub fn parse_map(input: &str) -> Result<Properties, LiteralError> {
    let mut cursor = Cursor::new(input);
    cursor.skip_ws();
    let map = cursor.map()?;
    cursor.finish()?;
    Ok(map)
}

/// Decode a single literal value.
pub fn parse_value(input: &str) -> Result<PropertyValue, LiteralError> {
    let mut cursor = Cursor::new(input);
    let value = cursor.value()?;
    cursor.finish()?;
    Ok(value)
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), LiteralError> {
        match self.bump() {
            Some(ch) if ch == wanted => Ok(()),
            Some(found) => Err(LiteralError::Unexpected {
                found,
                offset: self.pos - found.len_utf8(),
            }),
            None => Err(LiteralError::UnexpectedEnd),
        }
    }

    fn finish(&mut self) -> Result<(), LiteralError> {
        self.skip_ws();
        if self.pos < self.src.len() {
            return Err(LiteralError::TrailingInput(self.pos));
        }
        Ok(())
    }

    fn value(&mut self) -> Result<PropertyValue, LiteralError> {
        self.skip_ws();
        match self.peek() {
            None => Err(LiteralError::UnexpectedEnd),
            Some('{') => self.map().map(PropertyValue::Map),
            Some('[') => self.list(),
            Some(q @ ('"' | '\'')) => self.string(q).map(PropertyValue::String),
            Some(_) => self.bare(),
        }
    }

    fn map(&mut self) -> Result<Properties, LiteralError> {
        self.expect('{')?;
        let mut map = Properties::new();
        self.skip_ws();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(map);
        }
        loop {
            self.skip_ws();
            let key = self.key()?;
            self.skip_ws();
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(map),
                Some(found) => {
                    return Err(LiteralError::Unexpected {
                        found,
                        offset: self.pos - found.len_utf8(),
                    })
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some('`') => self.string('`'),
            Some(q @ ('"' | '\'')) => self.string(q),
            Some(_) => {
                let start = self.pos;
                while let Some(ch) = self.peek() {
                    if ch == ':' || ch == ',' || ch == '}' || ch.is_whitespace() {
                        break;
                    }
                    self.bump();
                }
                if self.pos == start {
                    return Err(LiteralError::EmptyValue(start));
                }
                Ok(self.src[start..self.pos].to_string())
            }
            None => Err(LiteralError::UnexpectedEnd),
        }
    }

    fn list(&mut self) -> Result<PropertyValue, LiteralError> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(PropertyValue::List(items));
        }
        loop {
            items.push(self.value()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(PropertyValue::List(items)),
                Some(found) => {
                    return Err(LiteralError::Unexpected {
                        found,
                        offset: self.pos - found.len_utf8(),
                    })
                }
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        let start = self.pos;
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            let ch = self
                .bump()
                .ok_or(LiteralError::UnterminatedString(start))?;
            if ch == quote {
                // Doubled backticks escape a backtick inside an identifier
                if quote == '`' && self.peek() == Some('`') {
                    self.bump();
                    out.push('`');
                    continue;
                }
                return Ok(out);
            }
            if ch != '\\' || quote == '`' {
                out.push(ch);
                continue;
            }
            let escaped = self
                .bump()
                .ok_or(LiteralError::UnterminatedString(start))?;
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'b' => out.push('\u{8}'),
                'f' => out.push('\u{c}'),
                'u' => {
                    let mut hex = String::new();
                    while hex.len() < 4 {
                        match self.peek() {
                            Some(c) if c.is_ascii_hexdigit() => {
                                hex.push(c);
                                self.bump();
                            }
                            _ => break,
                        }
                    }
                    let decoded = if hex.len() == 4 {
                        u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
                    } else {
                        None
                    };
                    match decoded {
                        Some(decoded) => out.push(decoded),
                        None => {
                            out.push_str("\\u");
                            out.push_str(&hex);
                        }
                    }
                }
                '\\' | '\'' | '"' => out.push(escaped),
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
        }
    }

    /// Bare token: runs to the next depth-0 `,`, `}` or `]`.
    fn bare(&mut self) -> Result<PropertyValue, LiteralError> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(ch) = self.peek() {
            match ch {
                '(' | '{' | '[' => depth += 1,
                ')' | '}' | ']' if depth > 0 => depth -= 1,
                ',' | '}' | ']' if depth == 0 => break,
                '"' | '\'' => {
                    self.string(ch)?;
                    continue;
                }
                _ => {}
            }
            self.bump();
        }
        let token = self.src[start..self.pos].trim();
        if token.is_empty() {
            return Err(LiteralError::EmptyValue(start));
        }
        Ok(classify_bare(token))
    }
}

fn classify_bare(token: &str) -> PropertyValue {
    if token.eq_ignore_ascii_case("null") {
        return PropertyValue::Null;
    }
    if token.eq_ignore_ascii_case("true") {
        return PropertyValue::Bool(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return PropertyValue::Bool(false);
    }
    if let Ok(i) = token.parse::<i64>() {
        return PropertyValue::Integer(i);
    }
    if looks_numeric(token) {
        if let Ok(x) = token.parse::<f64>() {
            return PropertyValue::Float(x);
        }
    }
    match token {
        "NaN" => PropertyValue::Float(f64::NAN),
        "Infinity" => PropertyValue::Float(f64::INFINITY),
        "-Infinity" => PropertyValue::Float(f64::NEG_INFINITY),
        _ => PropertyValue::String(token.to_string()),
    }
}

/// Rejects words like `inf` that `f64::from_str` would accept.
fn looks_numeric(token: &str) -> bool {
    let digits = token.trim_start_matches(['-', '+']);
    digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
}
