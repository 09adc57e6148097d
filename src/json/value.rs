//! Owned JSON values.
//!
//! A `Value` tree is immutable once parsed: the query engine only reads it
//! and constructs fresh values for computed results.

use core::fmt;

use indexmap::IndexMap;

/// A JSON number.
///
/// Parsed numbers keep their source lexeme alongside the `f64` so rendering
/// can reproduce the input text exactly instead of going through a float
/// round-trip. Numbers constructed during evaluation (arithmetic results,
/// filter literals without source text) have no lexeme and render from the
/// `f64`.
#[derive(Debug, Clone)]
pub struct Number {
    value: f64,
    lexeme: Option<Box<str>>,
}

impl Number {
    /// Create a number without a source lexeme.
    pub fn from_f64(value: f64) -> Self {
        Number {
            value,
            lexeme: None,
        }
    }

    /// Create a number that remembers its source text.
    pub fn with_lexeme(value: f64, lexeme: impl Into<Box<str>>) -> Self {
        Number {
            value,
            lexeme: Some(lexeme.into()),
        }
    }

    /// The numeric value.
    pub fn as_f64(&self) -> f64 {
        self.value
    }

    /// The source text this number was parsed from, if any.
    pub fn lexeme(&self) -> Option<&str> {
        self.lexeme.as_deref()
    }
}

/// Equality compares the numeric value only; the lexeme is presentation.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// Renders the JSON text of the number: the original lexeme when present,
/// otherwise the shortest `f64` form. NaN and infinities have no JSON
/// representation and render as `null`.
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lexeme {
            Some(s) => f.write_str(s),
            None if self.value.is_nan() || self.value.is_infinite() => f.write_str("null"),
            None => write!(f, "{}", self.value),
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::from_f64(value)
    }
}

/// An owned JSON value.
///
/// Objects use `IndexMap` so entries keep their insertion order, like jq.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number
    Number(Number),
    /// JSON string
    String(String),
    /// JSON array
    Array(Vec<Value>),
    /// JSON object
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Create a number value.
    pub fn number(n: f64) -> Self {
        Value::Number(Number::from_f64(n))
    }

    /// Create a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create an array from a vector of values.
    pub fn array_from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }

    /// Create an object from key-value pairs.
    pub fn object_from(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Value::Object(pairs.into_iter().collect())
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is "truthy" (not null and not false).
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    /// Get the type name of this value, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Convert to an f64, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// Convert to a string reference, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to an array reference, if this is an array.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Convert to an object reference, if this is an object.
    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The jq `length` of this value.
    /// - null: 0
    /// - string: codepoint count
    /// - array: element count
    /// - object: key count
    /// - number/boolean: no length (returns None)
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::Null => Some(0),
            Value::String(s) => Some(s.chars().count()),
            Value::Array(arr) => Some(arr.len()),
            Value::Object(obj) => Some(obj.len()),
            _ => None,
        }
    }

    /// Format this value as compact JSON text.
    pub fn to_json(&self) -> String {
        match self {
            Value::Null => "null".into(),
            Value::Bool(true) => "true".into(),
            Value::Bool(false) => "false".into(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => format!("\"{}\"", escape_json_string(s)),
            Value::Array(arr) => {
                let elements: Vec<String> = arr.iter().map(Value::to_json).collect();
                format!("[{}]", elements.join(","))
            }
            Value::Object(obj) => {
                let entries: Vec<String> = obj
                    .iter()
                    .map(|(k, v)| format!("\"{}\":{}", escape_json_string(k), v.to_json()))
                    .collect();
                format!("{{{}}}", entries.join(","))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Escape a string for JSON output.
pub(crate) fn escape_json_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_lexeme_wins() {
        let n = Number::with_lexeme(1.0, "1.000");
        assert_eq!(n.to_string(), "1.000");
        assert_eq!(Number::from_f64(1.0).to_string(), "1");
    }

    #[test]
    fn test_number_equality_ignores_lexeme() {
        assert_eq!(Number::with_lexeme(1.0, "1.0"), Number::from_f64(1.0));
        assert_ne!(Number::from_f64(1.0), Number::from_f64(2.0));
    }

    #[test]
    fn test_non_finite_renders_null() {
        assert_eq!(Number::from_f64(f64::NAN).to_string(), "null");
        assert_eq!(Number::from_f64(f64::INFINITY).to_string(), "null");
    }

    #[test]
    fn test_truthy() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::number(0.0).is_truthy()); // 0 is truthy in jq
        assert!(Value::string("").is_truthy()); // "" is truthy in jq
        assert!(Value::Array(vec![]).is_truthy()); // [] is truthy in jq
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Bool(true).type_name(), "boolean");
        assert_eq!(Value::number(42.0).type_name(), "number");
        assert_eq!(Value::string("").type_name(), "string");
        assert_eq!(Value::Array(vec![]).type_name(), "array");
        assert_eq!(Value::Object(IndexMap::new()).type_name(), "object");
    }

    #[test]
    fn test_length() {
        assert_eq!(Value::Null.length(), Some(0));
        assert_eq!(Value::string("héllo").length(), Some(5));
        assert_eq!(
            Value::Array(vec![Value::number(1.0), Value::number(2.0)]).length(),
            Some(2)
        );
        assert_eq!(Value::Bool(true).length(), None);
        assert_eq!(Value::number(42.0).length(), None);
    }

    #[test]
    fn test_to_json() {
        assert_eq!(Value::Null.to_json(), "null");
        assert_eq!(Value::Bool(false).to_json(), "false");
        assert_eq!(Value::string("a\nb").to_json(), "\"a\\nb\"");
        assert_eq!(
            Value::Array(vec![Value::number(1.0), Value::number(2.0)]).to_json(),
            "[1,2]"
        );
        assert_eq!(
            Value::object_from([("a".to_string(), Value::number(1.0))]).to_json(),
            "{\"a\":1}"
        );
    }
}
