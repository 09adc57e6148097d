//! jqview: live jq-style filtering of JSON with plain or colorized output.
//!
//! The pipeline is three pure stages plus a small state controller:
//!
//! | Module     | Role                                              |
//! |------------|---------------------------------------------------|
//! | [`json`]   | JSON data model and parser                        |
//! | [`query`]  | jq-style filter language: parsing and evaluation  |
//! | [`engine`] | `evaluate(input, filter)` with timeout and cancel |
//! | [`render`] | plain indented JSON or colorized HTML output      |
//! | [`viewer`] | mutable session state over the pure pipeline      |
//!
//! # Examples
//!
//! ```
//! use jqview::{evaluate, render, RenderMode};
//!
//! let input = r#"[{"fruit": "mango"}, {"fruit": "banana"}]"#;
//! let values = evaluate(input, ".[].fruit").unwrap();
//! assert_eq!(render(&values, RenderMode::Plain), "\"mango\"\n\"banana\"");
//! ```

pub mod engine;
pub mod json;
pub mod query;
pub mod render;
pub mod viewer;

pub use engine::{evaluate, evaluate_with, EvalFailure, DEFAULT_TIMEOUT};
pub use json::Value;
pub use query::{CancelFlag, Deadline};
pub use render::{render, RenderMode};
pub use viewer::{Viewer, SAMPLE_INPUT};
