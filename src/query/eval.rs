//! Filter evaluator.
//!
//! Evaluates a compiled [`Expr`] against a [`Value`], producing zero or more
//! output values. Outputs stream through a sink that polls the [`Deadline`]
//! on every emission, and iteration steps poll it as well, so a runaway
//! evaluation is abandoned at the next element boundary rather than running
//! to completion.
//!
//! Semantics follow jq: `.missing` on an object is `null`, indexing out of
//! range is `null`, `0` and `""` are truthy, the first runtime error ends
//! the evaluation unless `?`/`try` suppresses it.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::json::Value;

use super::expr::{ArithOp, Builtin, CompareOp, Expr, Literal, ObjectEntry, ObjectKey};

/// Shared flag for aborting an in-flight evaluation from another context,
/// e.g. when a newer refresh supersedes the current one.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag::default()
    }

    /// Request cancellation; takes effect at the next deadline poll.
    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Relaxed)
    }
}

/// Wall-clock budget for one evaluation, with an optional external cancel
/// flag. Polled at every output emission and iteration step.
#[derive(Debug, Clone)]
pub struct Deadline {
    expires_at: Option<Instant>,
    cancel: Option<CancelFlag>,
}

impl Deadline {
    /// A deadline this far in the future.
    pub fn after(timeout: Duration) -> Self {
        Deadline {
            expires_at: Instant::now().checked_add(timeout),
            cancel: None,
        }
    }

    /// A deadline that never expires on its own.
    pub fn never() -> Self {
        Deadline {
            expires_at: None,
            cancel: None,
        }
    }

    /// Attach an external cancellation flag.
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Fails with [`EvalError::Cancelled`] once expired or cancelled.
    pub fn check(&self) -> Result<(), EvalError> {
        if let Some(flag) = &self.cancel {
            if flag.is_cancelled() {
                return Err(EvalError::Cancelled);
            }
        }
        if let Some(at) = self.expires_at {
            if Instant::now() >= at {
                return Err(EvalError::Cancelled);
            }
        }
        Ok(())
    }
}

/// Error that ends an evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The filter surfaced a runtime error: type mismatch, division by
    /// zero, an explicit `error(...)`.
    Runtime(String),
    /// The deadline expired or the evaluation was cancelled.
    Cancelled,
}

impl EvalError {
    fn runtime(message: impl Into<String>) -> Self {
        EvalError::Runtime(message.into())
    }

    fn cannot_index(value: &Value, key: &str) -> Self {
        EvalError::runtime(format!(
            "cannot index {} with \"{}\"",
            value.type_name(),
            key
        ))
    }

    fn cannot_iterate(value: &Value) -> Self {
        EvalError::runtime(format!(
            "cannot iterate over {} ({})",
            value.type_name(),
            value.to_json()
        ))
    }
}

impl core::fmt::Display for EvalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EvalError::Runtime(message) => f.write_str(message),
            EvalError::Cancelled => f.write_str("evaluation deadline exceeded"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Receives evaluation outputs one at a time.
type Sink<'s> = &'s mut dyn FnMut(Value) -> Result<(), EvalError>;

/// Evaluate a filter against an input value, collecting all outputs.
///
/// The deadline is polled at each output and at each iteration step; on
/// expiry the partial output is discarded and [`EvalError::Cancelled`] is
/// returned. The first runtime error ends the evaluation the same way.
pub fn eval(expr: &Expr, input: &Value, deadline: &Deadline) -> Result<Vec<Value>, EvalError> {
    // Filters with no output at all (`empty`) still observe cancellation.
    deadline.check()?;

    let evaluator = Evaluator { deadline };
    let mut results = Vec::new();
    evaluator.eval(expr, input, &mut |value| {
        deadline.check()?;
        results.push(value);
        Ok(())
    })?;
    Ok(results)
}

struct Evaluator<'d> {
    deadline: &'d Deadline,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr, input: &Value, out: Sink) -> Result<(), EvalError> {
        match expr {
            Expr::Identity => out(input.clone()),
            Expr::Paren(inner) => self.eval(inner, input, out),

            Expr::Field(name) => match input {
                Value::Object(obj) => out(obj.get(name).cloned().unwrap_or(Value::Null)),
                Value::Null => out(Value::Null),
                other => Err(EvalError::cannot_index(other, name)),
            },

            Expr::Index(i) => match input {
                Value::Array(arr) => out(index_array(arr, *i)),
                Value::Null => out(Value::Null),
                other => Err(EvalError::runtime(format!(
                    "cannot index {} with number",
                    other.type_name()
                ))),
            },

            Expr::Slice { start, end } => match input {
                Value::Array(arr) => {
                    let (lo, hi) = slice_bounds(arr.len(), *start, *end);
                    out(Value::Array(arr[lo..hi].to_vec()))
                }
                Value::Null => out(Value::Null),
                other => Err(EvalError::runtime(format!(
                    "cannot slice {}",
                    other.type_name()
                ))),
            },

            Expr::Iterate => match input {
                Value::Array(arr) => {
                    for item in arr {
                        self.deadline.check()?;
                        out(item.clone())?;
                    }
                    Ok(())
                }
                Value::Object(obj) => {
                    for value in obj.values() {
                        self.deadline.check()?;
                        out(value.clone())?;
                    }
                    Ok(())
                }
                other => Err(EvalError::cannot_iterate(other)),
            },

            Expr::Optional(inner) => match self.eval(inner, input, out) {
                Err(EvalError::Runtime(_)) => Ok(()),
                result => result,
            },

            Expr::Pipe(exprs) => self.eval_pipe(exprs, input, out),

            Expr::Comma(exprs) => {
                for e in exprs {
                    self.eval(e, input, out)?;
                }
                Ok(())
            }

            Expr::Array(inner) => {
                let items = self.collect(inner, input)?;
                out(Value::Array(items))
            }

            Expr::Object(entries) => self.eval_object(entries, input, &IndexMap::new(), out),

            Expr::Literal(lit) => out(literal_value(lit)),

            Expr::RecursiveDescent => self.descend(input, out),

            Expr::Arithmetic { op, left, right } => {
                self.for_each_pair(left, right, input, out, &mut |l, r| arithmetic(*op, l, r))
            }

            Expr::Compare { op, left, right } => {
                self.for_each_pair(left, right, input, out, &mut |l, r| {
                    Ok(Value::Bool(compare(*op, l, r)))
                })
            }

            Expr::And(left, right) => {
                self.eval(left, input, &mut |l| {
                    if !l.is_truthy() {
                        out(Value::Bool(false))
                    } else {
                        self.eval(right, input, &mut |r| out(Value::Bool(r.is_truthy())))
                    }
                })
            }

            Expr::Or(left, right) => {
                self.eval(left, input, &mut |l| {
                    if l.is_truthy() {
                        out(Value::Bool(true))
                    } else {
                        self.eval(right, input, &mut |r| out(Value::Bool(r.is_truthy())))
                    }
                })
            }

            Expr::Not => out(Value::Bool(!input.is_truthy())),

            Expr::Alternative(left, right) => {
                // Truthy outputs of the left side win; a left side that only
                // errors or yields falsy values falls back to the right.
                let mut any_truthy = false;
                let kept = match self.collect(left, input) {
                    Ok(values) => values
                        .into_iter()
                        .filter(|v| v.is_truthy())
                        .collect::<Vec<_>>(),
                    Err(EvalError::Runtime(_)) => Vec::new(),
                    Err(cancelled) => return Err(cancelled),
                };
                for value in kept {
                    any_truthy = true;
                    out(value)?;
                }
                if any_truthy {
                    Ok(())
                } else {
                    self.eval(right, input, out)
                }
            }

            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => self.eval(cond, input, &mut |c| {
                if c.is_truthy() {
                    self.eval(then_branch, input, out)
                } else {
                    self.eval(else_branch, input, out)
                }
            }),

            Expr::Try { expr, catch } => match self.eval(expr, input, out) {
                Err(EvalError::Runtime(message)) => match catch {
                    Some(handler) => self.eval(handler, &Value::String(message), out),
                    None => Ok(()),
                },
                result => result,
            },

            Expr::Error(message) => {
                let value = match message {
                    Some(expr) => self.first(expr, input)?.unwrap_or(Value::Null),
                    None => input.clone(),
                };
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_json(),
                };
                Err(EvalError::runtime(text))
            }

            Expr::Builtin(builtin) => self.eval_builtin(builtin, input, out),
        }
    }

    /// Feed each output of the head expression into the rest of the chain.
    fn eval_pipe(&self, exprs: &[Expr], input: &Value, out: Sink) -> Result<(), EvalError> {
        match exprs.split_first() {
            None => out(input.clone()),
            Some((first, rest)) => {
                self.eval(first, input, &mut |value| self.eval_pipe(rest, &value, out))
            }
        }
    }

    /// Object construction is a cartesian product: every combination of key
    /// and value outputs yields one object.
    fn eval_object(
        &self,
        entries: &[ObjectEntry],
        input: &Value,
        acc: &IndexMap<String, Value>,
        out: Sink,
    ) -> Result<(), EvalError> {
        let Some((entry, rest)) = entries.split_first() else {
            return out(Value::Object(acc.clone()));
        };

        let keys = match &entry.key {
            ObjectKey::Literal(name) => vec![name.clone()],
            ObjectKey::Expr(expr) => {
                let mut keys = Vec::new();
                for value in self.collect(expr, input)? {
                    match value {
                        Value::String(s) => keys.push(s),
                        other => {
                            return Err(EvalError::runtime(format!(
                                "object key must be a string, got {}",
                                other.type_name()
                            )));
                        }
                    }
                }
                keys
            }
        };

        for key in keys {
            for value in self.collect(&entry.value, input)? {
                self.deadline.check()?;
                let mut next = acc.clone();
                next.insert(key.clone(), value);
                self.eval_object(rest, input, &next, out)?;
            }
        }
        Ok(())
    }

    /// Emit the value itself, then every value nested inside it.
    fn descend(&self, value: &Value, out: Sink) -> Result<(), EvalError> {
        self.deadline.check()?;
        out(value.clone())?;
        match value {
            Value::Array(arr) => {
                for item in arr {
                    self.descend(item, out)?;
                }
            }
            Value::Object(obj) => {
                for item in obj.values() {
                    self.descend(item, out)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Apply a binary operation across all output pairs of two operands.
    fn for_each_pair(
        &self,
        left: &Expr,
        right: &Expr,
        input: &Value,
        out: Sink,
        apply: &mut dyn FnMut(&Value, &Value) -> Result<Value, EvalError>,
    ) -> Result<(), EvalError> {
        let lefts = self.collect(left, input)?;
        let rights = self.collect(right, input)?;
        for l in &lefts {
            for r in &rights {
                self.deadline.check()?;
                out(apply(l, r)?)?;
            }
        }
        Ok(())
    }

    fn eval_builtin(&self, builtin: &Builtin, input: &Value, out: Sink) -> Result<(), EvalError> {
        match builtin {
            Builtin::Type => out(Value::string(input.type_name())),

            Builtin::Length => match input.length() {
                Some(len) => out(Value::number(len as f64)),
                None => Err(EvalError::runtime(format!(
                    "{} ({}) has no length",
                    input.type_name(),
                    input.to_json()
                ))),
            },

            Builtin::Keys | Builtin::KeysUnsorted => match input {
                Value::Object(obj) => {
                    let mut keys: Vec<&String> = obj.keys().collect();
                    if matches!(builtin, Builtin::Keys) {
                        keys.sort();
                    }
                    out(Value::Array(
                        keys.into_iter().map(Value::string).collect(),
                    ))
                }
                Value::Array(arr) => out(Value::Array(
                    (0..arr.len()).map(|i| Value::number(i as f64)).collect(),
                )),
                other => Err(EvalError::runtime(format!(
                    "{} has no keys",
                    other.type_name()
                ))),
            },

            Builtin::Has(key_expr) => {
                let key = self.first(key_expr, input)?.unwrap_or(Value::Null);
                match (input, &key) {
                    (Value::Object(obj), Value::String(k)) => out(Value::Bool(obj.contains_key(k))),
                    (Value::Array(arr), Value::Number(n)) => {
                        let i = n.as_f64();
                        out(Value::Bool(i >= 0.0 && (i as usize) < arr.len()))
                    }
                    _ => Err(EvalError::runtime(format!(
                        "cannot check whether {} has key {}",
                        input.type_name(),
                        key.to_json()
                    ))),
                }
            }

            Builtin::Select(cond) => self.eval(cond, input, &mut |c| {
                if c.is_truthy() {
                    out(input.clone())
                } else {
                    Ok(())
                }
            }),

            Builtin::Empty => Ok(()),

            Builtin::Map(f) => match input {
                Value::Array(arr) => {
                    let mut mapped = Vec::new();
                    for item in arr {
                        self.deadline.check()?;
                        mapped.extend(self.collect(f, item)?);
                    }
                    out(Value::Array(mapped))
                }
                Value::Object(obj) => {
                    let mut mapped = Vec::new();
                    for item in obj.values() {
                        self.deadline.check()?;
                        mapped.extend(self.collect(f, item)?);
                    }
                    out(Value::Array(mapped))
                }
                other => Err(EvalError::cannot_iterate(other)),
            },

            Builtin::MapValues(f) => match input {
                Value::Array(arr) => {
                    let mut mapped = Vec::new();
                    for item in arr {
                        self.deadline.check()?;
                        if let Some(value) = self.first(f, item)? {
                            mapped.push(value);
                        }
                    }
                    out(Value::Array(mapped))
                }
                Value::Object(obj) => {
                    let mut mapped = IndexMap::new();
                    for (key, item) in obj {
                        self.deadline.check()?;
                        if let Some(value) = self.first(f, item)? {
                            mapped.insert(key.clone(), value);
                        }
                    }
                    out(Value::Object(mapped))
                }
                other => Err(EvalError::cannot_iterate(other)),
            },

            Builtin::Add => match input {
                Value::Array(arr) => {
                    let mut total = Value::Null;
                    for item in arr {
                        self.deadline.check()?;
                        total = arithmetic(ArithOp::Add, &total, item)?;
                    }
                    out(total)
                }
                other => Err(EvalError::cannot_iterate(other)),
            },

            Builtin::Any => match input {
                Value::Array(arr) => out(Value::Bool(arr.iter().any(Value::is_truthy))),
                other => Err(EvalError::cannot_iterate(other)),
            },

            Builtin::All => match input {
                Value::Array(arr) => out(Value::Bool(arr.iter().all(Value::is_truthy))),
                other => Err(EvalError::cannot_iterate(other)),
            },

            Builtin::Min | Builtin::Max => match input {
                Value::Array(arr) => {
                    let mut best: Option<&Value> = None;
                    for item in arr {
                        best = Some(match best {
                            None => item,
                            Some(current) => {
                                let keep = match cmp_values(item, current) {
                                    Ordering::Less => matches!(builtin, Builtin::Min),
                                    Ordering::Greater => matches!(builtin, Builtin::Max),
                                    Ordering::Equal => false,
                                };
                                if keep {
                                    item
                                } else {
                                    current
                                }
                            }
                        });
                    }
                    out(best.cloned().unwrap_or(Value::Null))
                }
                other => Err(EvalError::cannot_iterate(other)),
            },
        }
    }

    /// Collect all outputs of an expression into a vector.
    fn collect(&self, expr: &Expr, input: &Value) -> Result<Vec<Value>, EvalError> {
        let mut values = Vec::new();
        self.eval(expr, input, &mut |value| {
            values.push(value);
            Ok(())
        })?;
        Ok(values)
    }

    /// The first output of an expression, if any.
    fn first(&self, expr: &Expr, input: &Value) -> Result<Option<Value>, EvalError> {
        Ok(self.collect(expr, input)?.into_iter().next())
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(n.clone()),
        Literal::String(s) => Value::String(s.clone()),
    }
}

fn index_array(arr: &[Value], i: i64) -> Value {
    let len = arr.len() as i64;
    let idx = if i < 0 { i + len } else { i };
    if (0..len).contains(&idx) {
        arr[idx as usize].clone()
    } else {
        Value::Null
    }
}

fn slice_bounds(len: usize, start: Option<i64>, end: Option<i64>) -> (usize, usize) {
    let clamp = |i: i64| -> usize {
        let i = if i < 0 { i + len as i64 } else { i };
        i.clamp(0, len as i64) as usize
    };
    let lo = start.map_or(0, clamp);
    let hi = end.map_or(len, clamp);
    (lo, hi.max(lo))
}

fn arithmetic(op: ArithOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (op, left, right) {
        // null is the identity for addition, like jq.
        (ArithOp::Add, Value::Null, r) => Ok(r.clone()),
        (ArithOp::Add, l, Value::Null) => Ok(l.clone()),
        (ArithOp::Add, Value::String(a), Value::String(b)) => {
            Ok(Value::String(format!("{}{}", a, b)))
        }
        (ArithOp::Add, Value::Array(a), Value::Array(b)) => {
            let mut merged = a.clone();
            merged.extend(b.iter().cloned());
            Ok(Value::Array(merged))
        }
        (ArithOp::Add, Value::Object(a), Value::Object(b)) => {
            let mut merged = a.clone();
            for (k, v) in b {
                merged.insert(k.clone(), v.clone());
            }
            Ok(Value::Object(merged))
        }
        (op, Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64(), b.as_f64());
            let result = match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::Div if b == 0.0 => {
                    return Err(divisor_zero(left, right));
                }
                ArithOp::Div => a / b,
                // `%` truncates both operands, so any divisor in (-1, 1)
                // is a remainder by zero.
                ArithOp::Mod if (b as i64) == 0 => {
                    return Err(divisor_zero(left, right));
                }
                ArithOp::Mod => ((a as i64) % (b as i64)) as f64,
            };
            Ok(Value::number(result))
        }
        (op, l, r) => Err(EvalError::runtime(format!(
            "{} ({}) and {} ({}) cannot be {}",
            l.type_name(),
            l.to_json(),
            r.type_name(),
            r.to_json(),
            match op {
                ArithOp::Add => "added",
                ArithOp::Sub => "subtracted",
                ArithOp::Mul => "multiplied",
                ArithOp::Div => "divided",
                ArithOp::Mod => "divided",
            }
        ))),
    }
}

fn divisor_zero(left: &Value, right: &Value) -> EvalError {
    EvalError::runtime(format!(
        "{} and {} cannot be divided because the divisor is zero",
        left.to_json(),
        right.to_json()
    ))
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> bool {
    match op {
        CompareOp::Eq => left == right,
        CompareOp::Ne => left != right,
        CompareOp::Lt => cmp_values(left, right) == Ordering::Less,
        CompareOp::Le => cmp_values(left, right) != Ordering::Greater,
        CompareOp::Gt => cmp_values(left, right) == Ordering::Greater,
        CompareOp::Ge => cmp_values(left, right) != Ordering::Less,
    }
}

/// Total order over values: null < false < true < numbers < strings <
/// arrays < objects, containers compared element-wise.
fn cmp_values(left: &Value, right: &Value) -> Ordering {
    fn type_order(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(false) => 1,
            Value::Bool(true) => 2,
            Value::Number(_) => 3,
            Value::String(_) => 4,
            Value::Array(_) => 5,
            Value::Object(_) => 6,
        }
    }

    let (lt, rt) = (type_order(left), type_order(right));
    if lt != rt {
        return lt.cmp(&rt);
    }

    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            a.as_f64().partial_cmp(&b.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                match cmp_values(x, y) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            a.len().cmp(&b.len())
        }
        (Value::Object(a), Value::Object(b)) => {
            let mut a_keys: Vec<&String> = a.keys().collect();
            let mut b_keys: Vec<&String> = b.keys().collect();
            a_keys.sort();
            b_keys.sort();
            match a_keys.cmp(&b_keys) {
                Ordering::Equal => {}
                other => return other,
            }
            for key in a_keys {
                match cmp_values(&a[key], &b[key]) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            Ordering::Equal
        }
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json;
    use crate::query::parse;

    fn run(input: &str, filter: &str) -> Result<Vec<Value>, EvalError> {
        let value = json::parse(input).expect("input must be valid JSON");
        let expr = parse(filter).expect("filter must be valid");
        eval(&expr, &value, &Deadline::never())
    }

    fn run_json(input: &str, filter: &str) -> Vec<String> {
        run(input, filter)
            .expect("evaluation failed")
            .iter()
            .map(Value::to_json)
            .collect()
    }

    // =========================================================================
    // Paths
    // =========================================================================

    #[test]
    fn test_identity() {
        assert_eq!(run_json("{\"a\":1}", "."), ["{\"a\":1}"]);
    }

    #[test]
    fn test_field_access() {
        assert_eq!(run_json("{\"a\":{\"b\":2}}", ".a.b"), ["2"]);
    }

    #[test]
    fn test_missing_field_is_null() {
        assert_eq!(run_json("{\"a\":1}", ".b"), ["null"]);
        assert_eq!(run_json("null", ".b"), ["null"]);
    }

    #[test]
    fn test_field_on_scalar_errors() {
        assert!(matches!(
            run("[1,2]", ".foo"),
            Err(EvalError::Runtime(m)) if m.contains("cannot index array")
        ));
    }

    #[test]
    fn test_index() {
        assert_eq!(run_json("[10,20,30]", ".[1]"), ["20"]);
        assert_eq!(run_json("[10,20,30]", ".[-1]"), ["30"]);
        assert_eq!(run_json("[10,20,30]", ".[9]"), ["null"]);
    }

    #[test]
    fn test_slice() {
        assert_eq!(run_json("[1,2,3,4,5]", ".[1:3]"), ["[2,3]"]);
        assert_eq!(run_json("[1,2,3,4,5]", ".[3:]"), ["[4,5]"]);
        assert_eq!(run_json("[1,2,3,4,5]", ".[:2]"), ["[1,2]"]);
        assert_eq!(run_json("[1,2,3]", ".[-2:]"), ["[2,3]"]);
        assert_eq!(run_json("[1,2,3]", ".[5:9]"), ["[]"]);
    }

    #[test]
    fn test_iterate() {
        assert_eq!(run_json("[1,2,3]", ".[]"), ["1", "2", "3"]);
        assert_eq!(run_json("{\"a\":1,\"b\":2}", ".[]"), ["1", "2"]);
        assert!(matches!(run("42", ".[]"), Err(EvalError::Runtime(_))));
    }

    #[test]
    fn test_iterate_then_field() {
        assert_eq!(
            run_json(
                "[{\"fruit\":\"mango\"},{\"fruit\":\"banana\"}]",
                ".[].fruit"
            ),
            ["\"mango\"", "\"banana\""]
        );
    }

    #[test]
    fn test_optional_suppresses() {
        assert_eq!(run_json("[1,2]", ".foo?"), Vec::<String>::new());
    }

    // =========================================================================
    // Construction and combination
    // =========================================================================

    #[test]
    fn test_comma() {
        assert_eq!(run_json("{\"a\":1,\"b\":2}", ".a, .b"), ["1", "2"]);
    }

    #[test]
    fn test_array_construction() {
        assert_eq!(run_json("{\"a\":1,\"b\":2}", "[.a, .b]"), ["[1,2]"]);
        assert_eq!(run_json("[1,2,3]", "[.[]]"), ["[1,2,3]"]);
        assert_eq!(run_json("null", "[]"), ["[]"]);
    }

    #[test]
    fn test_object_construction() {
        assert_eq!(
            run_json("{\"name\":\"joe\"}", "{who: .name}"),
            ["{\"who\":\"joe\"}"]
        );
        assert_eq!(run_json("{\"a\":1}", "{a}"), ["{\"a\":1}"]);
        assert_eq!(
            run_json("{\"k\":\"x\",\"v\":2}", "{(.k): .v}"),
            ["{\"x\":2}"]
        );
    }

    #[test]
    fn test_object_construction_cartesian() {
        assert_eq!(
            run_json("null", "{a: (1, 2)}"),
            ["{\"a\":1}", "{\"a\":2}"]
        );
    }

    #[test]
    fn test_recursive_descent() {
        assert_eq!(
            run_json("{\"a\":[1]}", ".."),
            ["{\"a\":[1]}", "[1]", "1"]
        );
    }

    // =========================================================================
    // Operators
    // =========================================================================

    #[test]
    fn test_arithmetic() {
        assert_eq!(run_json("{\"a\":1,\"b\":2}", ".a + .b"), ["3"]);
        assert_eq!(run_json("null", "3 - 1"), ["2"]);
        assert_eq!(run_json("null", "\"a\" + \"b\""), ["\"ab\""]);
        assert_eq!(run_json("null", "[1] + [2]"), ["[1,2]"]);
        assert_eq!(run_json("{\"a\":1}", ".a + 1"), ["2"]);
        assert_eq!(run_json("null", "null + 5"), ["5"]);
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            run("null", "1/0"),
            Err(EvalError::Runtime(m)) if m.contains("divisor is zero")
        ));
    }

    #[test]
    fn test_modulo() {
        assert_eq!(run_json("null", "7 % 3"), ["1"]);
        assert_eq!(run_json("null", "-7 % 3"), ["-1"]);
        assert_eq!(run_json("{\"a\":10,\"b\":4}", ".a % .b"), ["2"]);
    }

    #[test]
    fn test_modulo_by_zero() {
        assert!(matches!(
            run("null", "1 % 0"),
            Err(EvalError::Runtime(m)) if m.contains("divisor is zero")
        ));
        // The divisor truncates to zero before the remainder is taken.
        assert!(matches!(
            run("null", "1 % 0.5"),
            Err(EvalError::Runtime(m)) if m.contains("divisor is zero")
        ));
    }

    #[test]
    fn test_type_mismatch_arithmetic() {
        assert!(matches!(
            run("null", "\"a\" - 1"),
            Err(EvalError::Runtime(_))
        ));
    }

    #[test]
    fn test_comparison() {
        assert_eq!(run_json("{\"a\":1,\"b\":2}", ".a < .b"), ["true"]);
        assert_eq!(run_json("null", "1 == 1.0"), ["true"]);
        assert_eq!(run_json("null", "\"a\" != \"b\""), ["true"]);
        assert_eq!(run_json("null", "null < false"), ["true"]);
    }

    #[test]
    fn test_boolean_logic() {
        assert_eq!(run_json("null", "true and false"), ["false"]);
        assert_eq!(run_json("null", "false or true"), ["true"]);
        assert_eq!(run_json("false", "not"), ["true"]);
        assert_eq!(run_json("0", "not"), ["false"]); // 0 is truthy
    }

    #[test]
    fn test_alternative() {
        assert_eq!(run_json("{\"a\":1}", ".b // \"fallback\""), ["\"fallback\""]);
        assert_eq!(run_json("{\"a\":1}", ".a // \"fallback\""), ["1"]);
        // Errors on the left side fall back too.
        assert_eq!(run_json("[1]", ".foo // \"fallback\""), ["\"fallback\""]);
    }

    #[test]
    fn test_if_then_else() {
        assert_eq!(
            run_json("5", "if . > 3 then \"big\" else \"small\" end"),
            ["\"big\""]
        );
        assert_eq!(
            run_json("1", "if . > 3 then \"big\" elif . > 0 then \"mid\" else \"small\" end"),
            ["\"mid\""]
        );
        assert_eq!(run_json("2", "if . > 3 then \"big\" end"), ["2"]);
    }

    #[test]
    fn test_try_catch() {
        assert_eq!(run_json("[1]", "try .foo"), Vec::<String>::new());
        assert_eq!(
            run_json("null", "try error(\"boom\") catch ."),
            ["\"boom\""]
        );
    }

    #[test]
    fn test_error_builtin() {
        assert!(matches!(
            run("null", "error(\"kaput\")"),
            Err(EvalError::Runtime(m)) if m == "kaput"
        ));
    }

    // =========================================================================
    // Builtins
    // =========================================================================

    #[test]
    fn test_type_and_length() {
        assert_eq!(run_json("[1,2]", "type"), ["\"array\""]);
        assert_eq!(run_json("[1,2]", "length"), ["2"]);
        assert_eq!(run_json("\"héllo\"", "length"), ["5"]);
        assert!(matches!(run("true", "length"), Err(EvalError::Runtime(_))));
    }

    #[test]
    fn test_keys() {
        assert_eq!(
            run_json("{\"b\":1,\"a\":2}", "keys"),
            ["[\"a\",\"b\"]"]
        );
        assert_eq!(
            run_json("{\"b\":1,\"a\":2}", "keys_unsorted"),
            ["[\"b\",\"a\"]"]
        );
        assert_eq!(run_json("[5,6]", "keys"), ["[0,1]"]);
    }

    #[test]
    fn test_has() {
        assert_eq!(run_json("{\"a\":1}", "has(\"a\")"), ["true"]);
        assert_eq!(run_json("{\"a\":1}", "has(\"z\")"), ["false"]);
        assert_eq!(run_json("[1,2]", "has(1)"), ["true"]);
        assert_eq!(run_json("[1,2]", "has(5)"), ["false"]);
    }

    #[test]
    fn test_select() {
        assert_eq!(run_json("[1,5,2,8]", ".[] | select(. > 3)"), ["5", "8"]);
    }

    #[test]
    fn test_empty() {
        assert_eq!(run_json("[1,2]", "empty"), Vec::<String>::new());
    }

    #[test]
    fn test_map() {
        assert_eq!(run_json("[1,2,3]", "map(. + 1)"), ["[2,3,4]"]);
        assert_eq!(
            run_json("{\"a\":1,\"b\":2}", "map_values(. * 2)"),
            ["{\"a\":2,\"b\":4}"]
        );
    }

    #[test]
    fn test_add_any_all_min_max() {
        assert_eq!(run_json("[1,2,3]", "add"), ["6"]);
        assert_eq!(run_json("[\"a\",\"b\"]", "add"), ["\"ab\""]);
        assert_eq!(run_json("[]", "add"), ["null"]);
        assert_eq!(run_json("[false,true]", "any"), ["true"]);
        assert_eq!(run_json("[false,true]", "all"), ["false"]);
        assert_eq!(run_json("[3,1,2]", "min"), ["1"]);
        assert_eq!(run_json("[3,1,2]", "max"), ["3"]);
        assert_eq!(run_json("[]", "min"), ["null"]);
    }

    // =========================================================================
    // Deadline and cancellation
    // =========================================================================

    #[test]
    fn test_expired_deadline() {
        let value = json::parse("[1,2,3]").unwrap();
        let expr = parse(".[]").unwrap();
        let result = eval(&expr, &value, &Deadline::after(Duration::ZERO));
        assert_eq!(result, Err(EvalError::Cancelled));
    }

    #[test]
    fn test_cancel_flag() {
        let flag = CancelFlag::new();
        flag.cancel();
        let deadline = Deadline::never().with_cancel(flag);
        let value = json::parse("[1,2,3]").unwrap();
        let expr = parse(".").unwrap();
        assert_eq!(eval(&expr, &value, &deadline), Err(EvalError::Cancelled));
    }

    #[test]
    fn test_error_discards_partial_output() {
        // The first element iterates fine, the second errors; the whole
        // evaluation must fail.
        let result = run("[[1], 2]", ".[] | .[]");
        assert!(matches!(result, Err(EvalError::Runtime(_))));
    }
}
