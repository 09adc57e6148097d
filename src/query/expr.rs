//! Expression AST for jq-style filters.

use crate::json::Number;

/// A compiled filter expression.
///
/// An `Expr` is immutable, independent of any particular input value, and
/// reusable across evaluations.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identity: `.`
    Identity,

    /// Field access: `.foo`
    Field(String),

    /// Array index access: `.[0]` or `.[-1]`
    Index(i64),

    /// Array slice: `.[2:5]`, `.[2:]` or `.[:5]`
    Slice {
        start: Option<i64>,
        end: Option<i64>,
    },

    /// Iterate all elements of an array or all values of an object: `.[]`
    Iterate,

    /// Optional access: `.foo?` — suppresses runtime errors
    Optional(Box<Expr>),

    /// Chained expressions: `.foo | .bar`, `.foo.bar[0]`
    Pipe(Vec<Expr>),

    /// Comma operator: `.foo, .bar` — outputs from each expression in turn
    Comma(Vec<Expr>),

    /// Array construction: `[.foo, .bar]` — collects all outputs of the
    /// inner expression
    Array(Box<Expr>),

    /// Object construction: `{foo: .bar}`
    Object(Vec<ObjectEntry>),

    /// Literal value
    Literal(Literal),

    /// Recursive descent: `..`
    RecursiveDescent,

    /// Parenthesized expression, kept for grouping
    Paren(Box<Expr>),

    /// Arithmetic: `.a + .b`, `.a * 2`, ...
    Arithmetic {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Comparison: `.a == .b`, `.a < .b`, ...
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Boolean AND: `.a and .b`
    And(Box<Expr>, Box<Expr>),

    /// Boolean OR: `.a or .b`
    Or(Box<Expr>, Box<Expr>),

    /// Boolean NOT: `not` (applied via pipe)
    Not,

    /// Alternative operator: `.foo // "default"` — right side when the left
    /// produces no truthy output or errors
    Alternative(Box<Expr>, Box<Expr>),

    /// Conditional: `if .a then .b elif .c then .d else .e end`
    /// (`elif` is desugared into nested `If` while parsing)
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// Error handling: `try .a catch .b`; without `catch`, errors are
    /// suppressed and nothing is output
    Try {
        expr: Box<Expr>,
        catch: Option<Box<Expr>>,
    },

    /// Raise an error: `error` or `error("message")`
    Error(Option<Box<Expr>>),

    /// Builtin function call
    Builtin(Builtin),
}

/// Builtin functions.
#[derive(Debug, Clone, PartialEq)]
pub enum Builtin {
    /// `type` — the type name as a string
    Type,
    /// `length` — string/array/object length
    Length,
    /// `keys` — sorted object keys or array indices
    Keys,
    /// `keys_unsorted` — object keys in insertion order
    KeysUnsorted,
    /// `has(key)` — whether the object/array has the key/index
    Has(Box<Expr>),
    /// `select(cond)` — pass the input through only if cond is truthy
    Select(Box<Expr>),
    /// `empty` — output nothing
    Empty,
    /// `map(f)` — `[.[] | f]`
    Map(Box<Expr>),
    /// `map_values(f)` — apply f to each element/value, keeping the shape
    MapValues(Box<Expr>),
    /// `add` — sum/concatenate array elements
    Add,
    /// `any` — true if any element is truthy
    Any,
    /// `all` — true if all elements are truthy
    All,
    /// `min` — smallest element
    Min,
    /// `max` — largest element
    Max,
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// An entry in an object construction expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    pub key: ObjectKey,
    pub value: Expr,
}

/// Object key in construction — literal or computed.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKey {
    /// Literal string key: `{foo: .bar}` or `{"foo": .bar}`
    Literal(String),
    /// Computed key: `{(.name): .value}`
    Expr(Box<Expr>),
}

/// Literal values in filter expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    /// Number literal; keeps its lexeme from the filter text.
    Number(Number),
    String(String),
}

impl Expr {
    /// Chain expressions, collapsing a single-element chain.
    pub fn pipe(exprs: Vec<Expr>) -> Self {
        if exprs.len() == 1 {
            exprs.into_iter().next().unwrap_or(Expr::Identity)
        } else {
            Expr::Pipe(exprs)
        }
    }

    /// Combine outputs, collapsing a single-element combination.
    pub fn comma(exprs: Vec<Expr>) -> Self {
        if exprs.len() == 1 {
            exprs.into_iter().next().unwrap_or(Expr::Identity)
        } else {
            Expr::Comma(exprs)
        }
    }

    /// Returns true if this is the identity expression.
    pub fn is_identity(&self) -> bool {
        matches!(self, Expr::Identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_simplification() {
        let single = Expr::pipe(vec![Expr::Field("foo".into())]);
        assert_eq!(single, Expr::Field("foo".into()));

        let multi = Expr::pipe(vec![Expr::Field("foo".into()), Expr::Iterate]);
        assert!(matches!(multi, Expr::Pipe(_)));
    }

    #[test]
    fn test_comma_simplification() {
        let single = Expr::comma(vec![Expr::Identity]);
        assert_eq!(single, Expr::Identity);

        let multi = Expr::comma(vec![Expr::Identity, Expr::Iterate]);
        assert!(matches!(multi, Expr::Comma(_)));
    }
}
