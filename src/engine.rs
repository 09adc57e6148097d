//! Query engine adapter.
//!
//! Ties the JSON parser and the filter engine together behind a single
//! entry point: [`evaluate`] takes raw input text and raw filter text and
//! produces either the full sequence of result values or the first failure.
//! The three stages short-circuit in order: input parse, filter parse,
//! evaluation.

use std::time::Duration;

use crate::json::{self, Value};
use crate::query::{self, Deadline};

/// Wall-clock budget applied by [`evaluate`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// A failed evaluation, in stage order.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalFailure {
    /// The input text is not valid JSON.
    Parse(json::ParseError),
    /// The filter text is not a valid filter.
    FilterSyntax(query::ParseError),
    /// The filter failed while running.
    Runtime(String),
    /// The evaluation exceeded its deadline or was cancelled.
    Timeout,
}

impl core::fmt::Display for EvalFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EvalFailure::Parse(err) => err.fmt(f),
            EvalFailure::FilterSyntax(err) => err.fmt(f),
            EvalFailure::Runtime(message) => f.write_str(message),
            EvalFailure::Timeout => f.write_str("evaluation deadline exceeded"),
        }
    }
}

impl std::error::Error for EvalFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvalFailure::Parse(err) => Some(err),
            EvalFailure::FilterSyntax(err) => Some(err),
            _ => None,
        }
    }
}

impl From<json::ParseError> for EvalFailure {
    fn from(err: json::ParseError) -> Self {
        EvalFailure::Parse(err)
    }
}

impl From<query::ParseError> for EvalFailure {
    fn from(err: query::ParseError) -> Self {
        EvalFailure::FilterSyntax(err)
    }
}

impl From<query::EvalError> for EvalFailure {
    fn from(err: query::EvalError) -> Self {
        match err {
            query::EvalError::Runtime(message) => EvalFailure::Runtime(message),
            query::EvalError::Cancelled => EvalFailure::Timeout,
        }
    }
}

/// Run a filter over JSON input text with the default 20 second budget.
///
/// Returns every value the filter outputs, in order. An empty vector is a
/// successful evaluation that produced no output.
///
/// # Examples
///
/// ```
/// use jqview::evaluate;
///
/// let results = evaluate(r#"[{"fruit": "mango"}]"#, ".[].fruit").unwrap();
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].to_json(), r#""mango""#);
/// ```
pub fn evaluate(input: &str, filter: &str) -> Result<Vec<Value>, EvalFailure> {
    evaluate_with(input, filter, &Deadline::after(DEFAULT_TIMEOUT))
}

/// Like [`evaluate`], with an explicit deadline. A caller that wants to
/// abandon the evaluation early attaches a [`CancelFlag`] to the deadline.
///
/// [`CancelFlag`]: crate::query::CancelFlag
pub fn evaluate_with(
    input: &str,
    filter: &str,
    deadline: &Deadline,
) -> Result<Vec<Value>, EvalFailure> {
    let value = json::parse(input)?;
    let expr = query::parse(filter)?;
    let results = query::eval(&expr, &value, deadline)?;
    Ok(results)
}
