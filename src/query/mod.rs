//! jq-style filter language: parsing and evaluation.
//!
//! A filter is compiled once with [`parse`] and then evaluated against any
//! number of input values with [`eval`]. Evaluation streams zero or more
//! output values and stops at the first runtime error or when the
//! [`Deadline`] expires.
//!
//! Supported syntax:
//!
//! | Syntax                          | Meaning                                 |
//! |---------------------------------|-----------------------------------------|
//! | `.`                             | identity                                |
//! | `.foo`, `.foo.bar`, `.foo?`     | field access                            |
//! | `.[0]`, `.[-1]`, `.[2:5]`       | array index and slice                   |
//! | `.[]`, `.foo[]`                 | iterate elements/values                 |
//! | `..`                            | recursive descent                       |
//! | `\|`, `,`                       | pipe, output combination                |
//! | `[...]`, `{...}`                | array/object construction               |
//! | `+ - * / %`                     | arithmetic                              |
//! | `== != < <= > >=`               | comparison                              |
//! | `and`, `or`, `not`              | boolean logic                           |
//! | `//`                            | alternative                             |
//! | `if ... then ... else ... end`  | conditional                             |
//! | `try ... catch ...`, `error`    | error handling                          |
//! | `length`, `keys`, `select`, ... | builtins                                |

mod eval;
mod expr;
mod parser;

pub use eval::{eval, CancelFlag, Deadline, EvalError};
pub use expr::{ArithOp, Builtin, CompareOp, Expr, Literal, ObjectEntry, ObjectKey};
pub use parser::{parse, ParseError};
