//! JSON data model and parser.
//!
//! The input side of the pipeline: [`parse`] turns raw text into an owned
//! [`Value`] tree that the query engine evaluates against and the renderers
//! consume. Object entries keep insertion order and numbers keep their
//! source lexeme, both of which the renderers rely on.

mod parser;
mod value;

pub use parser::{parse, ParseError};
pub use value::{Number, Value};

pub(crate) use value::escape_json_string;
