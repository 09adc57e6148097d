//! Plain-text rendering: indented JSON.

use crate::json::{escape_json_string, Value};

const INDENT: &str = "  ";

/// Render each value as two-space-indented JSON, joined with single
/// newlines. No trailing newline; an empty sequence renders as an empty
/// string.
pub fn render_plain(values: &[Value]) -> String {
    let mut output = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        write_value(&mut output, value, 0);
    }
    output
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => {
            out.push('"');
            out.push_str(&escape_json_string(s));
            out.push('"');
        }
        Value::Array(arr) => {
            if arr.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                write_indent(out, depth + 1);
                write_value(out, item, depth + 1);
            }
            out.push('\n');
            write_indent(out, depth);
            out.push(']');
        }
        Value::Object(obj) => {
            if obj.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            for (i, (key, item)) in obj.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                write_indent(out, depth + 1);
                out.push('"');
                out.push_str(&escape_json_string(key));
                out.push_str("\": ");
                write_value(out, item, depth + 1);
            }
            out.push('\n');
            write_indent(out, depth);
            out.push('}');
        }
    }
}

fn write_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::parse;

    fn plain(input: &str) -> String {
        render_plain(&[parse(input).unwrap()])
    }

    #[test]
    fn test_scalars() {
        assert_eq!(plain("null"), "null");
        assert_eq!(plain("true"), "true");
        assert_eq!(plain("42"), "42");
        assert_eq!(plain("\"hi\""), "\"hi\"");
    }

    #[test]
    fn test_number_lexeme_reproduced() {
        assert_eq!(plain("1.230"), "1.230");
        assert_eq!(plain("1e3"), "1e3");
    }

    #[test]
    fn test_nested_indentation() {
        assert_eq!(
            plain(r#"{"a":[1,2],"b":"x"}"#),
            "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": \"x\"\n}"
        );
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(plain("[]"), "[]");
        assert_eq!(plain("{}"), "{}");
        assert_eq!(plain(r#"{"a":{}}"#), "{\n  \"a\": {}\n}");
    }

    #[test]
    fn test_join_and_no_trailing_newline() {
        let values = vec![Value::string("mango"), Value::string("banana")];
        assert_eq!(render_plain(&values), "\"mango\"\n\"banana\"");
        assert_eq!(render_plain(&[]), "");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(plain(r#""a\"b\nc""#), r#""a\"b\nc""#);
    }
}
