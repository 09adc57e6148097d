//! Recursive-descent parser for JSON documents.
//!
//! Produces an owned [`Value`] tree. Numbers keep their source lexeme so the
//! renderers can reproduce the input text without float round-trip drift.
//! Exactly one document is accepted; trailing non-whitespace is an error.

use indexmap::IndexMap;

use super::value::{Number, Value};

/// Error that occurs while parsing JSON input.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "invalid JSON at position {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Parser state.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if matches!(c, ' ' | '\t' | '\n' | '\r') {
                self.next();
            } else {
                break;
            }
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.next();
                Ok(())
            }
            Some(c) => Err(ParseError::new(
                format!("expected '{}', found '{}'", expected, c),
                self.pos,
            )),
            None => Err(ParseError::new(
                format!("expected '{}', found end of input", expected),
                self.pos,
            )),
        }
    }

    /// Match a literal keyword (`null`, `true`, `false`).
    fn consume_keyword(&mut self, keyword: &str) -> bool {
        if self.input[self.pos..].starts_with(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        self.skip_ws();
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') => Ok(Value::String(self.parse_string()?)),
            Some(c) if c == '-' || c.is_ascii_digit() => Ok(Value::Number(self.parse_number()?)),
            Some('n') if self.consume_keyword("null") => Ok(Value::Null),
            Some('t') if self.consume_keyword("true") => Ok(Value::Bool(true)),
            Some('f') if self.consume_keyword("false") => Ok(Value::Bool(false)),
            Some(c) => Err(ParseError::new(
                format!("unexpected character '{}'", c),
                self.pos,
            )),
            None => Err(ParseError::new("unexpected end of input", self.pos)),
        }
    }

    fn parse_object(&mut self) -> Result<Value, ParseError> {
        self.expect('{')?;
        self.skip_ws();

        let mut map = IndexMap::new();
        if self.peek() == Some('}') {
            self.next();
            return Ok(Value::Object(map));
        }

        loop {
            self.skip_ws();
            let key = self.parse_string()?;
            self.skip_ws();
            self.expect(':')?;
            let value = self.parse_value()?;
            // Duplicate keys: last occurrence wins, position is kept.
            map.insert(key, value);

            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.next();
                }
                Some('}') => {
                    self.next();
                    return Ok(Value::Object(map));
                }
                Some(c) => {
                    return Err(ParseError::new(
                        format!("expected ',' or '}}', found '{}'", c),
                        self.pos,
                    ));
                }
                None => {
                    return Err(ParseError::new(
                        "expected ',' or '}', found end of input",
                        self.pos,
                    ));
                }
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        self.expect('[')?;
        self.skip_ws();

        let mut items = Vec::new();
        if self.peek() == Some(']') {
            self.next();
            return Ok(Value::Array(items));
        }

        loop {
            items.push(self.parse_value()?);

            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.next();
                }
                Some(']') => {
                    self.next();
                    return Ok(Value::Array(items));
                }
                Some(c) => {
                    return Err(ParseError::new(
                        format!("expected ',' or ']', found '{}'", c),
                        self.pos,
                    ));
                }
                None => {
                    return Err(ParseError::new(
                        "expected ',' or ']', found end of input",
                        self.pos,
                    ));
                }
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.expect('"')?;
        let mut result = String::new();

        loop {
            match self.next() {
                None => {
                    return Err(ParseError::new("unterminated string", self.pos));
                }
                Some('"') => return Ok(result),
                Some('\\') => match self.next() {
                    Some('"') => result.push('"'),
                    Some('\\') => result.push('\\'),
                    Some('/') => result.push('/'),
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some('b') => result.push('\x08'),
                    Some('f') => result.push('\x0C'),
                    Some('u') => result.push(self.parse_unicode_escape()?),
                    Some(c) => {
                        return Err(ParseError::new(
                            format!("invalid escape sequence '\\{}'", c),
                            self.pos,
                        ));
                    }
                    None => {
                        return Err(ParseError::new("unterminated string", self.pos));
                    }
                },
                Some(c) if c.is_control() => {
                    return Err(ParseError::new("control character in string", self.pos));
                }
                Some(c) => result.push(c),
            }
        }
    }

    /// Parse the hex digits of a `\uXXXX` escape (the `\u` is consumed),
    /// combining UTF-16 surrogate pairs.
    fn parse_unicode_escape(&mut self) -> Result<char, ParseError> {
        let first = self.parse_hex4()?;
        let code = match first {
            0xD800..=0xDBFF => {
                // High surrogate: a low surrogate escape must follow.
                if !(self.consume_keyword("\\u")) {
                    return Err(ParseError::new("unpaired surrogate escape", self.pos));
                }
                let low = self.parse_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(ParseError::new("unpaired surrogate escape", self.pos));
                }
                0x10000 + ((first - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return Err(ParseError::new("unpaired surrogate escape", self.pos));
            }
            code => code,
        };
        char::from_u32(code).ok_or_else(|| ParseError::new("invalid unicode escape", self.pos))
    }

    fn parse_hex4(&mut self) -> Result<u32, ParseError> {
        let mut code = 0u32;
        for _ in 0..4 {
            match self.next() {
                Some(c) if c.is_ascii_hexdigit() => {
                    code = code * 16 + c.to_digit(16).unwrap_or(0);
                }
                _ => {
                    return Err(ParseError::new("invalid unicode escape", self.pos));
                }
            }
        }
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<Number, ParseError> {
        let start = self.pos;

        if self.peek() == Some('-') {
            self.next();
        }

        // Integer part: a single zero, or a nonzero digit followed by digits.
        match self.peek() {
            Some('0') => {
                self.next();
            }
            Some(c) if c.is_ascii_digit() => {
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.next();
                }
            }
            _ => {
                return Err(ParseError::new("expected digit", self.pos));
            }
        }

        if self.peek() == Some('.') {
            self.next();
            if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                return Err(ParseError::new("expected digit after '.'", self.pos));
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.next();
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            self.next();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.next();
            }
            if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                return Err(ParseError::new("expected digit in exponent", self.pos));
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.next();
            }
        }

        let lexeme = &self.input[start..self.pos];
        lexeme
            .parse::<f64>()
            .map(|value| Number::with_lexeme(value, lexeme))
            .map_err(|_| ParseError::new("invalid number", start))
    }
}

/// Parse a string into a single JSON [`Value`].
///
/// # Examples
///
/// ```
/// use jqview::json::parse;
///
/// let value = parse(r#"{"fruit": "mango"}"#).unwrap();
/// assert_eq!(value.to_json(), r#"{"fruit":"mango"}"#);
/// ```
pub fn parse(input: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(input);
    let value = parser.parse_value()?;

    parser.skip_ws();
    if !parser.is_eof() {
        return Err(ParseError::new(
            "unexpected trailing characters",
            parser.pos,
        ));
    }
    Ok(value)
}
