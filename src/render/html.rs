//! Colorized rendering: an HTML fragment with one styled row per JSON token
//! line.
//!
//! Each row is a block-level `<div>` whose leading `<span>` carries
//! `&nbsp;` indentation proportional to nesting depth. Token kinds map to
//! fixed inline styles; scalar literals carry a two-`&nbsp;` spacer for
//! visual alignment with bracket glyphs.

use crate::json::Value;

// One style per value kind and structural token.
const STYLE_ARRAY_BRACKETS: &str = "color: indigo; font-weight: 600;";
const STYLE_MAP_BRACKETS: &str = "color: salmon; font-weight: 600;";
const STYLE_NUMBER: &str = "color: fireBrick; font-weight: 400;";
const STYLE_BOOL_TRUE: &str = "color: green;";
const STYLE_BOOL_FALSE: &str = "color: red;";
const STYLE_MAP_KEY: &str = "color: teal; font-weight: 600;";
const STYLE_PUNCT: &str = "color: black";
const STYLE_NULL: &str = "color: indianRed;";
const STYLE_STRING: &str = "color: black; font-weight: 600;";

const ROW_STYLE: &str = "margin-bottom: 0px; margin-top: 0px;";
const SPACER: &str = "&nbsp;&nbsp;";

/// Render each value as an HTML fragment, one block of rows per value, in
/// sequence order. An empty sequence renders as an empty string.
pub fn render_html(values: &[Value]) -> String {
    let mut output = String::new();
    for value in values {
        write_value(&mut output, value, 0, "", "");
    }
    output
}

/// Emit the rows for one value. `prefix` (a map key and colon) is prepended
/// to the value's first row and `suffix` (a separating comma) appended to
/// its last row.
fn write_value(out: &mut String, value: &Value, depth: usize, prefix: &str, suffix: &str) {
    match value {
        Value::Null => {
            let content = format!("{}{}", scalar_span(STYLE_NULL, "null"), suffix);
            write_row(out, depth, &format!("{}{}", prefix, content));
        }
        Value::Bool(b) => {
            let style = if *b { STYLE_BOOL_TRUE } else { STYLE_BOOL_FALSE };
            let text = if *b { "true" } else { "false" };
            let content = format!("{}{}", scalar_span(style, text), suffix);
            write_row(out, depth, &format!("{}{}", prefix, content));
        }
        Value::Number(n) => {
            let content = format!("{}{}", scalar_span(STYLE_NUMBER, &n.to_string()), suffix);
            write_row(out, depth, &format!("{}{}", prefix, content));
        }
        Value::String(s) => {
            let quoted = format!("\"{}\"", escape_html(s));
            let content = format!("{}{}", scalar_span(STYLE_STRING, &quoted), suffix);
            write_row(out, depth, &format!("{}{}", prefix, content));
        }
        Value::Array(arr) => {
            write_row(
                out,
                depth,
                &format!("{}{}", prefix, span(STYLE_ARRAY_BRACKETS, "[")),
            );
            for (i, item) in arr.iter().enumerate() {
                let comma = if i + 1 < arr.len() { comma_span() } else { String::new() };
                write_value(out, item, depth + 1, "", &comma);
            }
            write_row(
                out,
                depth,
                &format!("{}{}", span(STYLE_ARRAY_BRACKETS, "]"), suffix),
            );
        }
        Value::Object(obj) => {
            write_row(
                out,
                depth,
                &format!("{}{}", prefix, span(STYLE_MAP_BRACKETS, "{")),
            );
            for (i, (key, item)) in obj.iter().enumerate() {
                let quoted = format!("\"{}\"", escape_html(key));
                let entry_prefix =
                    format!("{}{}", span(STYLE_MAP_KEY, &quoted), span(STYLE_PUNCT, ":"));
                let comma = if i + 1 < obj.len() { comma_span() } else { String::new() };
                write_value(out, item, depth + 1, &entry_prefix, &comma);
            }
            write_row(
                out,
                depth,
                &format!("{}{}", span(STYLE_MAP_BRACKETS, "}"), suffix),
            );
        }
    }
}

fn write_row(out: &mut String, depth: usize, content: &str) {
    out.push_str(&format!(
        "<div style=\"{}\"><span>{}</span>{}</div>",
        ROW_STYLE,
        SPACER.repeat(depth),
        content
    ));
}

fn span(style: &str, text: &str) -> String {
    format!("<span style=\"{}\">{}</span>", style, text)
}

/// Scalar literals carry the leading spacer inside their own span.
fn scalar_span(style: &str, text: &str) -> String {
    format!("<span style=\"{}\">{}{}</span>", style, SPACER, text)
}

fn comma_span() -> String {
    span(STYLE_PUNCT, ",")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}
