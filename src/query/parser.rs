//! Parser for jq-style filter expressions.
//!
//! Supported syntax:
//!
//! | Expression | Meaning |
//! |------------|---------|
//! | `.` | Identity |
//! | `.foo`, `.foo?` | Field access, optional field access |
//! | `.[0]`, `.[-1]` | Array index |
//! | `.[]` | Iterate elements/values |
//! | `.[2:5]`, `.[2:]`, `.[:5]` | Array slice |
//! | `.foo.bar[0]` | Chained access |
//! | `f \| g` | Pipe |
//! | `f, g` | Outputs of both |
//! | `[f]`, `{a: f}` | Array/object construction |
//! | `(f)` | Grouping |
//! | `..` | Recursive descent |
//! | `null`, `true`, `false`, `123`, `"s"` | Literals |
//! | `+ - * / %` | Arithmetic |
//! | `== != < <= > >=` | Comparison |
//! | `and`, `or`, `not` | Boolean logic |
//! | `f // g` | Alternative |
//! | `if c then a elif c2 then b else d end` | Conditional |
//! | `try f catch g`, `error("msg")` | Error handling |
//! | `type`, `length`, `keys`, `keys_unsorted`, `has(f)`, `select(f)`, `empty`, `map(f)`, `map_values(f)`, `add`, `any`, `all`, `min`, `max` | Builtins |

use crate::json::Number;

use super::expr::{ArithOp, Builtin, CompareOp, Expr, Literal, ObjectEntry, ObjectKey};

/// Error that occurs while compiling a filter.
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
            "invalid filter at position {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for ParseError {}

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

    fn peek_str(&self, n: usize) -> &str {
        let end = (self.pos + n).min(self.input.len());
        &self.input[self.pos..end]
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.next();
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_ws();
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

    /// Whether a keyword starts here, not glued to further identifier chars.
    fn at_keyword(&self, keyword: &str) -> bool {
        if !self.input[self.pos..].starts_with(keyword) {
            return false;
        }
        let after = self.pos + keyword.len();
        !matches!(
            self.input[after..].chars().next(),
            Some(c) if c.is_alphanumeric() || c == '_'
        )
    }

    /// Consume a keyword checked with [`at_keyword`].
    fn eat_keyword(&mut self, keyword: &str) {
        self.pos += keyword.len();
    }

    fn parse_ident(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => {
                self.next();
            }
            Some(c) => {
                return Err(ParseError::new(
                    format!("expected identifier, found '{}'", c),
                    self.pos,
                ));
            }
            None => {
                return Err(ParseError::new(
                    "expected identifier, found end of input",
                    self.pos,
                ));
            }
        }
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.next();
        }
        Ok(self.input[start..self.pos].to_string())
    }

    /// Parse a number literal, keeping its lexeme.
    fn parse_number_literal(&mut self) -> Result<Literal, ParseError> {
        let start = self.pos;

        if self.peek() == Some('-') {
            self.next();
        }
        if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            return Err(ParseError::new("expected digit", self.pos));
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.next();
        }

        // A '.' continues the number only if it is not `..`.
        if self.peek() == Some('.') && self.peek_str(2) != ".." {
            self.next();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.next();
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            self.next();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.next();
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.next();
            }
        }

        let lexeme = &self.input[start..self.pos];
        lexeme
            .parse::<f64>()
            .map(|value| Literal::Number(Number::with_lexeme(value, lexeme)))
            .map_err(|_| ParseError::new("invalid number", start))
    }

    /// Parse an integer, for indices and slice bounds.
    fn parse_integer(&mut self) -> Result<i64, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.next();
        }
        if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            return Err(ParseError::new("expected digit", self.pos));
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.next();
        }
        self.input[start..self.pos]
            .parse()
            .map_err(|_| ParseError::new("invalid number", start))
    }

    fn parse_string_literal(&mut self) -> Result<String, ParseError> {
        self.expect('"')?;
        let mut result = String::new();
        loop {
            match self.next() {
                None => return Err(ParseError::new("unterminated string", self.pos)),
                Some('"') => return Ok(result),
                Some('\\') => match self.next() {
                    Some('"') => result.push('"'),
                    Some('\\') => result.push('\\'),
                    Some('/') => result.push('/'),
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some('u') => {
                        let mut code = 0u32;
                        for _ in 0..4 {
                            match self.next() {
                                Some(c) if c.is_ascii_hexdigit() => {
                                    code = code * 16 + c.to_digit(16).unwrap_or(0);
                                }
                                _ => {
                                    return Err(ParseError::new(
                                        "invalid unicode escape",
                                        self.pos,
                                    ));
                                }
                            }
                        }
                        match char::from_u32(code) {
                            Some(c) => result.push(c),
                            None => {
                                return Err(ParseError::new("invalid unicode escape", self.pos));
                            }
                        }
                    }
                    Some(c) => {
                        return Err(ParseError::new(
                            format!("invalid escape sequence '\\{}'", c),
                            self.pos,
                        ));
                    }
                    None => return Err(ParseError::new("unterminated string", self.pos)),
                },
                Some(c) => result.push(c),
            }
        }
    }

    /// Parse a bracket suffix: `[0]`, `[]`, `[1:3]`, `[:3]`, `[1:]`.
    fn parse_index_bracket(&mut self) -> Result<Expr, ParseError> {
        self.expect('[')?;
        self.skip_ws();

        if self.peek() == Some(']') {
            self.next();
            return Ok(Expr::Iterate);
        }

        if self.peek() == Some(':') {
            self.next();
            self.skip_ws();
            if self.peek() == Some(']') {
                self.next();
                return Ok(Expr::Iterate);
            }
            let end = self.parse_integer()?;
            self.expect(']')?;
            return Ok(Expr::Slice {
                start: None,
                end: Some(end),
            });
        }

        let first = self.parse_integer()?;
        self.skip_ws();
        match self.peek() {
            Some(']') => {
                self.next();
                Ok(Expr::Index(first))
            }
            Some(':') => {
                self.next();
                self.skip_ws();
                if self.peek() == Some(']') {
                    self.next();
                    Ok(Expr::Slice {
                        start: Some(first),
                        end: None,
                    })
                } else {
                    let second = self.parse_integer()?;
                    self.expect(']')?;
                    Ok(Expr::Slice {
                        start: Some(first),
                        end: Some(second),
                    })
                }
            }
            Some(c) => Err(ParseError::new(
                format!("expected ']' or ':', found '{}'", c),
                self.pos,
            )),
            None => Err(ParseError::new(
                "expected ']' or ':', found end of input",
                self.pos,
            )),
        }
    }

    /// Parse a bracket suffix and an optional trailing `?`.
    fn parse_index_bracket_opt(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_index_bracket()?;
        if self.peek() == Some('?') {
            self.next();
            Ok(Expr::Optional(Box::new(expr)))
        } else {
            Ok(expr)
        }
    }

    fn parse_array_construction(&mut self) -> Result<Expr, ParseError> {
        self.expect('[')?;
        self.skip_ws();

        if self.peek() == Some(']') {
            self.next();
            // `[]` collects the outputs of an empty comma expression.
            return Ok(Expr::Array(Box::new(Expr::Comma(vec![]))));
        }

        let inner = self.parse_comma_expr()?;
        self.expect(']')?;
        Ok(Expr::Array(Box::new(inner)))
    }

    fn parse_object_construction(&mut self) -> Result<Expr, ParseError> {
        self.expect('{')?;
        self.skip_ws();

        let mut entries = Vec::new();
        if self.peek() == Some('}') {
            self.next();
            return Ok(Expr::Object(entries));
        }

        loop {
            self.skip_ws();
            let key = match self.peek() {
                Some('(') => {
                    self.next();
                    let key_expr = self.parse_comma_expr()?;
                    self.expect(')')?;
                    ObjectKey::Expr(Box::new(key_expr))
                }
                Some('"') => ObjectKey::Literal(self.parse_string_literal()?),
                _ => ObjectKey::Literal(self.parse_ident()?),
            };

            self.skip_ws();
            let value = if self.peek() == Some(':') {
                self.next();
                self.parse_pipe_expr()?
            } else {
                // Shorthand `{foo}` for `{foo: .foo}`.
                match &key {
                    ObjectKey::Literal(name) => Expr::Field(name.clone()),
                    ObjectKey::Expr(_) => {
                        return Err(ParseError::new(
                            "computed key requires an explicit value",
                            self.pos,
                        ));
                    }
                }
            };
            entries.push(ObjectEntry { key, value });

            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.next();
                }
                Some('}') => {
                    self.next();
                    return Ok(Expr::Object(entries));
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

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        self.skip_ws();

        match self.peek() {
            Some('(') => {
                self.next();
                let expr = self.parse_comma_expr()?;
                self.expect(')')?;
                self.parse_postfix(Expr::Paren(Box::new(expr)))
            }
            Some('[') => self.parse_array_construction(),
            Some('{') => self.parse_object_construction(),
            Some('"') => {
                let s = self.parse_string_literal()?;
                Ok(Expr::Literal(Literal::String(s)))
            }
            Some(c) if c.is_ascii_digit() => Ok(Expr::Literal(self.parse_number_literal()?)),
            Some('-')
                if self
                    .peek_str(2)
                    .chars()
                    .nth(1)
                    .is_some_and(|c| c.is_ascii_digit()) =>
            {
                Ok(Expr::Literal(self.parse_number_literal()?))
            }
            Some('.') => self.parse_path(),
            Some(c) if c.is_alphabetic() => self.parse_keyword_or_builtin(),
            Some(c) => Err(ParseError::new(
                format!("unexpected character '{}', expected expression", c),
                self.pos,
            )),
            None => Err(ParseError::new("unexpected end of input", self.pos)),
        }
    }

    /// Parse a dot-rooted path: `.`, `..`, `.foo`, `.[0]`, with suffixes.
    fn parse_path(&mut self) -> Result<Expr, ParseError> {
        self.next(); // consume '.'

        if self.peek() == Some('.') {
            self.next();
            return Ok(Expr::RecursiveDescent);
        }

        if self.peek() == Some('[') {
            let first = self.parse_index_bracket_opt()?;
            return self.parse_postfix(first);
        }

        if self.is_eof() || self.at_path_end() {
            return Ok(Expr::Identity);
        }

        let mut expr = Expr::Field(self.parse_ident()?);
        if self.peek() == Some('?') {
            self.next();
            expr = Expr::Optional(Box::new(expr));
        }
        self.parse_postfix(expr)
    }

    /// Whether the character after a lone `.` terminates the identity
    /// expression rather than starting a field name.
    fn at_path_end(&self) -> bool {
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => false,
            _ => true,
        }
    }

    /// Parse chained suffixes after a primary: `.foo`, `[0]`, `[]`, `?`.
    fn parse_postfix(&mut self, first: Expr) -> Result<Expr, ParseError> {
        let mut chain = vec![first];

        loop {
            match self.peek() {
                Some('.') if self.peek_str(2) != ".." => {
                    // `.foo` or `.[...]`; a digit after the dot would be a
                    // number, which cannot follow a path.
                    match self.peek_str(2).chars().nth(1) {
                        Some('[') => {
                            self.next();
                            chain.push(self.parse_index_bracket_opt()?);
                        }
                        Some(c) if c.is_alphabetic() || c == '_' => {
                            self.next();
                            let mut field = Expr::Field(self.parse_ident()?);
                            if self.peek() == Some('?') {
                                self.next();
                                field = Expr::Optional(Box::new(field));
                            }
                            chain.push(field);
                        }
                        _ => break,
                    }
                }
                Some('[') => {
                    chain.push(self.parse_index_bracket_opt()?);
                }
                _ => break,
            }
        }

        Ok(Expr::pipe(chain))
    }

    fn parse_keyword_or_builtin(&mut self) -> Result<Expr, ParseError> {
        if self.at_keyword("null") {
            self.eat_keyword("null");
            return Ok(Expr::Literal(Literal::Null));
        }
        if self.at_keyword("true") {
            self.eat_keyword("true");
            return Ok(Expr::Literal(Literal::Bool(true)));
        }
        if self.at_keyword("false") {
            self.eat_keyword("false");
            return Ok(Expr::Literal(Literal::Bool(false)));
        }
        if self.at_keyword("not") {
            self.eat_keyword("not");
            return Ok(Expr::Not);
        }
        if self.at_keyword("if") {
            return self.parse_if_expr();
        }
        if self.at_keyword("try") {
            return self.parse_try_expr();
        }
        if self.at_keyword("error") {
            return self.parse_error_expr();
        }
        if let Some(builtin) = self.try_parse_builtin()? {
            return Ok(Expr::Builtin(builtin));
        }
        Err(ParseError::new(
            "unexpected identifier, expected expression",
            self.pos,
        ))
    }

    /// Syntax: `if COND then A (elif COND then B)* (else C)? end`
    fn parse_if_expr(&mut self) -> Result<Expr, ParseError> {
        self.eat_keyword("if");
        let cond = self.parse_pipe_expr()?;

        self.skip_ws();
        if !self.at_keyword("then") {
            return Err(ParseError::new("expected 'then'", self.pos));
        }
        self.eat_keyword("then");
        let then_branch = self.parse_pipe_expr()?;

        let else_branch = self.parse_else_branch()?;
        Ok(Expr::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    fn parse_else_branch(&mut self) -> Result<Expr, ParseError> {
        self.skip_ws();
        if self.at_keyword("elif") {
            self.eat_keyword("elif");
            let cond = self.parse_pipe_expr()?;
            self.skip_ws();
            if !self.at_keyword("then") {
                return Err(ParseError::new("expected 'then'", self.pos));
            }
            self.eat_keyword("then");
            let then_branch = self.parse_pipe_expr()?;
            let else_branch = self.parse_else_branch()?;
            Ok(Expr::If {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            })
        } else if self.at_keyword("else") {
            self.eat_keyword("else");
            let else_branch = self.parse_pipe_expr()?;
            self.skip_ws();
            if !self.at_keyword("end") {
                return Err(ParseError::new("expected 'end'", self.pos));
            }
            self.eat_keyword("end");
            Ok(else_branch)
        } else if self.at_keyword("end") {
            // A missing else branch passes the input through unchanged.
            self.eat_keyword("end");
            Ok(Expr::Identity)
        } else {
            Err(ParseError::new(
                "expected 'elif', 'else', or 'end'",
                self.pos,
            ))
        }
    }

    /// Syntax: `try EXPR (catch HANDLER)?`
    fn parse_try_expr(&mut self) -> Result<Expr, ParseError> {
        self.eat_keyword("try");
        let expr = self.parse_primary()?;

        self.skip_ws();
        let catch = if self.at_keyword("catch") {
            self.eat_keyword("catch");
            Some(Box::new(self.parse_primary()?))
        } else {
            None
        };

        Ok(Expr::Try {
            expr: Box::new(expr),
            catch,
        })
    }

    /// Syntax: `error` or `error(MESSAGE)`
    fn parse_error_expr(&mut self) -> Result<Expr, ParseError> {
        self.eat_keyword("error");
        self.skip_ws();
        let msg = if self.peek() == Some('(') {
            self.next();
            let msg_expr = self.parse_pipe_expr()?;
            self.expect(')')?;
            Some(Box::new(msg_expr))
        } else {
            None
        };
        Ok(Expr::Error(msg))
    }

    /// Parse the parenthesized argument of a builtin like `select(...)`.
    fn parse_builtin_arg(&mut self) -> Result<Box<Expr>, ParseError> {
        self.expect('(')?;
        let arg = self.parse_pipe_expr()?;
        self.expect(')')?;
        Ok(Box::new(arg))
    }

    fn try_parse_builtin(&mut self) -> Result<Option<Builtin>, ParseError> {
        // Longer names first where one is a prefix of another.
        let no_arg: [(&str, Builtin); 9] = [
            ("type", Builtin::Type),
            ("length", Builtin::Length),
            ("keys_unsorted", Builtin::KeysUnsorted),
            ("keys", Builtin::Keys),
            ("empty", Builtin::Empty),
            ("add", Builtin::Add),
            ("any", Builtin::Any),
            ("all", Builtin::All),
            ("min", Builtin::Min),
        ];
        for (name, builtin) in no_arg {
            if self.at_keyword(name) {
                self.eat_keyword(name);
                return Ok(Some(builtin));
            }
        }
        if self.at_keyword("max") {
            self.eat_keyword("max");
            return Ok(Some(Builtin::Max));
        }

        if self.at_keyword("has") {
            self.eat_keyword("has");
            return Ok(Some(Builtin::Has(self.parse_builtin_arg()?)));
        }
        if self.at_keyword("select") {
            self.eat_keyword("select");
            return Ok(Some(Builtin::Select(self.parse_builtin_arg()?)));
        }
        if self.at_keyword("map_values") {
            self.eat_keyword("map_values");
            return Ok(Some(Builtin::MapValues(self.parse_builtin_arg()?)));
        }
        if self.at_keyword("map") {
            self.eat_keyword("map");
            return Ok(Some(Builtin::Map(self.parse_builtin_arg()?)));
        }

        Ok(None)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_primary()?;
        loop {
            self.skip_ws();
            let op = match self.peek() {
                Some('*') => ArithOp::Mul,
                Some('/') if self.peek_str(2) != "//" => ArithOp::Div,
                Some('%') => ArithOp::Mod,
                _ => break,
            };
            self.next();
            let right = self.parse_primary()?;
            left = Expr::Arithmetic {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            self.skip_ws();
            let op = match self.peek() {
                Some('+') => ArithOp::Add,
                Some('-') => ArithOp::Sub,
                _ => break,
            };
            self.next();
            let right = self.parse_multiplicative()?;
            left = Expr::Arithmetic {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;
        self.skip_ws();

        let (op, len) = match self.peek_str(2) {
            "==" => (CompareOp::Eq, 2),
            "!=" => (CompareOp::Ne, 2),
            "<=" => (CompareOp::Le, 2),
            ">=" => (CompareOp::Ge, 2),
            s if s.starts_with('<') => (CompareOp::Lt, 1),
            s if s.starts_with('>') => (CompareOp::Gt, 1),
            _ => return Ok(left),
        };
        self.pos += len;

        let right = self.parse_additive()?;
        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            self.skip_ws();
            if !self.at_keyword("and") {
                break;
            }
            self.eat_keyword("and");
            let right = self.parse_comparison()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_ws();
            if !self.at_keyword("or") {
                break;
            }
            self.eat_keyword("or");
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_alternative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_or()?;
        loop {
            self.skip_ws();
            if self.peek_str(2) != "//" {
                break;
            }
            self.pos += 2;
            let right = self.parse_or()?;
            left = Expr::Alternative(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_pipe_expr(&mut self) -> Result<Expr, ParseError> {
        let mut exprs = vec![self.parse_alternative()?];
        loop {
            self.skip_ws();
            if self.peek() != Some('|') || self.peek_str(2) == "||" {
                break;
            }
            self.next();
            exprs.push(self.parse_alternative()?);
        }
        Ok(Expr::pipe(exprs))
    }

    /// Comma has the lowest precedence.
    fn parse_comma_expr(&mut self) -> Result<Expr, ParseError> {
        let mut exprs = vec![self.parse_pipe_expr()?];
        loop {
            self.skip_ws();
            if self.peek() != Some(',') {
                break;
            }
            self.next();
            exprs.push(self.parse_pipe_expr()?);
        }
        Ok(Expr::comma(exprs))
    }
}

/// Compile a filter string into an [`Expr`].
///
/// # Examples
///
/// ```
/// use jqview::query::parse;
///
/// parse(".").unwrap();
/// parse(".[].fruit").unwrap();
/// parse("{name: .user.name} | keys").unwrap();
/// assert!(parse(".foo[").is_err());
/// ```
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(input);
    let expr = parser.parse_comma_expr()?;

    parser.skip_ws();
    if !parser.is_eof() {
        return Err(ParseError::new(
            format!(
                "unexpected character '{}'",
                parser.peek().unwrap_or_default()
            ),
            parser.pos,
        ));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(parse(".").unwrap(), Expr::Identity);
        assert_eq!(parse("  .  ").unwrap(), Expr::Identity);
    }

    #[test]
    fn test_field_chain() {
        assert_eq!(parse(".foo").unwrap(), Expr::Field("foo".into()));
        assert_eq!(
            parse(".foo.bar").unwrap(),
            Expr::Pipe(vec![Expr::Field("foo".into()), Expr::Field("bar".into())])
        );
    }

    #[test]
    fn test_index_and_slice() {
        assert_eq!(parse(".[0]").unwrap(), Expr::Index(0));
        assert_eq!(parse(".[-1]").unwrap(), Expr::Index(-1));
        assert_eq!(parse(".[]").unwrap(), Expr::Iterate);
        assert_eq!(
            parse(".[1:3]").unwrap(),
            Expr::Slice {
                start: Some(1),
                end: Some(3)
            }
        );
        assert_eq!(
            parse(".[:3]").unwrap(),
            Expr::Slice {
                start: None,
                end: Some(3)
            }
        );
    }

    #[test]
    fn test_iterate_then_field() {
        assert_eq!(
            parse(".[].fruit").unwrap(),
            Expr::Pipe(vec![Expr::Iterate, Expr::Field("fruit".into())])
        );
    }

    #[test]
    fn test_optional() {
        assert_eq!(
            parse(".foo?").unwrap(),
            Expr::Optional(Box::new(Expr::Field("foo".into())))
        );
    }

    #[test]
    fn test_pipe_and_comma() {
        assert!(matches!(parse(".a | .b").unwrap(), Expr::Pipe(_)));
        assert!(matches!(parse(".a, .b").unwrap(), Expr::Comma(_)));
    }

    #[test]
    fn test_construction() {
        assert!(matches!(parse("[.[]]").unwrap(), Expr::Array(_)));
        assert!(matches!(parse("{a: .b}").unwrap(), Expr::Object(_)));
        assert!(matches!(parse("{a}").unwrap(), Expr::Object(_)));
        assert!(matches!(parse("{(.k): .v}").unwrap(), Expr::Object(_)));
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("null").unwrap(), Expr::Literal(Literal::Null));
        assert_eq!(parse("true").unwrap(), Expr::Literal(Literal::Bool(true)));
        assert!(matches!(
            parse("3.14").unwrap(),
            Expr::Literal(Literal::Number(_))
        ));
        assert_eq!(
            parse(r#""hi""#).unwrap(),
            Expr::Literal(Literal::String("hi".into()))
        );
    }

    #[test]
    fn test_operators() {
        assert!(matches!(
            parse(".a + .b * 2").unwrap(),
            Expr::Arithmetic {
                op: ArithOp::Add,
                ..
            }
        ));
        assert!(matches!(
            parse("1/0").unwrap(),
            Expr::Arithmetic {
                op: ArithOp::Div,
                ..
            }
        ));
        assert!(matches!(
            parse(".a == .b").unwrap(),
            Expr::Compare {
                op: CompareOp::Eq,
                ..
            }
        ));
        assert!(matches!(parse(".a and .b").unwrap(), Expr::And(_, _)));
        assert!(matches!(parse(".a // .b").unwrap(), Expr::Alternative(_, _)));
    }

    #[test]
    fn test_conditionals() {
        assert!(matches!(
            parse("if .a then .b else .c end").unwrap(),
            Expr::If { .. }
        ));
        assert!(matches!(
            parse("if .a then .b elif .c then .d else .e end").unwrap(),
            Expr::If { .. }
        ));
        assert!(matches!(
            parse("try .a catch .b").unwrap(),
            Expr::Try { .. }
        ));
        assert!(matches!(parse("error(\"x\")").unwrap(), Expr::Error(_)));
    }

    #[test]
    fn test_builtins() {
        assert_eq!(parse("type").unwrap(), Expr::Builtin(Builtin::Type));
        assert_eq!(parse("length").unwrap(), Expr::Builtin(Builtin::Length));
        assert!(matches!(
            parse("map(.a)").unwrap(),
            Expr::Builtin(Builtin::Map(_))
        ));
        assert!(matches!(
            parse("select(. > 1)").unwrap(),
            Expr::Builtin(Builtin::Select(_))
        ));
    }

    #[test]
    fn test_recursive_descent() {
        assert_eq!(parse("..").unwrap(), Expr::RecursiveDescent);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse("").is_err());
        assert!(parse(".foo[").is_err());
        assert!(parse(".[1:").is_err());
        assert!(parse("{a: }").is_err());
        assert!(parse("if .a then .b").is_err());
        assert!(parse("§").is_err());
        assert!(parse(". !").is_err());
    }
}
