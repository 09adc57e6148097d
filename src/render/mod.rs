//! Result rendering.
//!
//! Turns a sequence of result values into one display string, in one of two
//! modes: plain indented JSON, or a colorized HTML fragment. Both modes
//! render every value in sequence order and render an empty sequence as an
//! empty string.

mod html;
mod plain;

pub use html::render_html;
pub use plain::render_plain;

use crate::json::Value;

/// Output format for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Two-space-indented JSON, values joined by newlines.
    #[default]
    Plain,
    /// HTML fragment with per-token styling and depth indentation.
    Colorized,
}

/// Render result values for display.
pub fn render(values: &[Value], mode: RenderMode) -> String {
    match mode {
        RenderMode::Plain => render_plain(values),
        RenderMode::Colorized => render_html(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::parse;

    #[test]
    fn test_mode_dispatch() {
        let values = vec![parse("[1]").unwrap()];
        assert_eq!(render(&values, RenderMode::Plain), "[\n  1\n]");
        assert!(render(&values, RenderMode::Colorized).starts_with("<div"));
    }
}
