//! Viewer state controller.
//!
//! Owns the current input text, filter text and render mode, and turns any
//! change into a fresh display string. The evaluation and rendering
//! functions themselves are pure; all mutable state lives here, so a
//! presentation layer only has to forward edits and show the returned
//! string.

use crate::engine::{evaluate_with, DEFAULT_TIMEOUT};
use crate::query::{CancelFlag, Deadline};
use crate::render::{render, RenderMode};

/// Built-in sample document shown when no input is supplied.
pub const SAMPLE_INPUT: &str = "[{\n  \"fruit\": \"mango\"\n}, {\n  \"fruit\": \"banana\"\n}]";

/// Default filter: identity.
pub const DEFAULT_FILTER: &str = ".";

/// Current state of one viewer session.
#[derive(Debug, Clone)]
pub struct Viewer {
    input: String,
    filter: String,
    mode: RenderMode,
}

impl Viewer {
    pub fn new(mode: RenderMode) -> Self {
        Viewer {
            input: SAMPLE_INPUT.to_string(),
            filter: DEFAULT_FILTER.to_string(),
            mode,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// Re-evaluate the current input and filter and render the result.
    ///
    /// Every failure is folded into the display string, so the caller
    /// always has something to show.
    pub fn refresh(&self) -> String {
        self.refresh_with(&Deadline::after(DEFAULT_TIMEOUT))
    }

    /// Like [`refresh`](Viewer::refresh), with an explicit deadline. A
    /// caller that re-triggers refreshes on edit attaches a [`CancelFlag`]
    /// so a superseded evaluation stops early.
    pub fn refresh_with(&self, deadline: &Deadline) -> String {
        match evaluate_with(&self.input, &self.filter, deadline) {
            Ok(values) => render(&values, self.mode),
            Err(failure) => failure.to_string(),
        }
    }

    /// A cancel flag wired into a deadline for one refresh.
    pub fn cancellable_deadline(flag: CancelFlag) -> Deadline {
        Deadline::after(DEFAULT_TIMEOUT).with_cancel(flag)
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Viewer::new(RenderMode::Plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_input_refresh() {
        let mut viewer = Viewer::new(RenderMode::Plain);
        viewer.set_filter(".[].fruit");
        assert_eq!(viewer.refresh(), "\"mango\"\n\"banana\"");
    }

    #[test]
    fn test_error_folded_into_output() {
        let mut viewer = Viewer::default();
        viewer.set_input("not json");
        assert!(viewer.refresh().starts_with("invalid JSON"));

        viewer.set_input("{}");
        viewer.set_filter("]broken");
        assert!(viewer.refresh().starts_with("invalid filter"));
    }

    #[test]
    fn test_colorized_mode() {
        let mut viewer = Viewer::new(RenderMode::Colorized);
        viewer.set_input("[1]");
        assert!(viewer.refresh().starts_with("<div"));
    }

    #[test]
    fn test_cancelled_refresh() {
        let flag = CancelFlag::new();
        flag.cancel();
        let deadline = Viewer::cancellable_deadline(flag);
        let viewer = Viewer::default();
        assert_eq!(viewer.refresh_with(&deadline), "evaluation deadline exceeded");
    }
}
