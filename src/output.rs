//! Text and JSON output for queries, runtime values and records.
//!
//! - [`to_query()`] - canonical text of a query, in a fixed style
//! - [`to_literal()`] - literal text of an evaluation result
//! - [`record_to_json()`] - a record as a JSON object
//!
//! # Examples
//!
//! ```
//! use lrep::output::to_query;
//! use lrep::parse;
//!
//! let expr = parse(".name ~ /eric.*/ or .load<35ms").unwrap();
//! assert_eq!(to_query(&expr), ".name ~ /eric.*/   OR   .load < 35ms");
//! ```

use std::fmt;

use crate::{ast::Expr, evaluator::EvalError, record::Record, value::Value};

/// Canonical text of a query.
///
/// Boolean operators are surrounded by three spaces, comparisons by one, and
/// function calls are written `name( X )`. The result parses back to the
/// same tree.
pub fn to_query(expr: &Expr) -> String {
    expr.to_string()
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => f.write_str(&lit.value),
            Expr::Binary { x, op, y, .. } => write!(f, "{x}   {op}   {y}"),
            Expr::Comp { x, op, y, .. } => write!(f, "{x} {op} {}", y.value),
            Expr::Unary { op, x, .. } => write!(f, "{op}  {x}"),
            Expr::PostComp { x, op, .. } => write!(f, "{} {op}", x.value),
            Expr::Paren { x, .. } => {
                // keep the ')' out of a trailing key name
                let pad = if x.ends_with_ident() { " " } else { "" };
                write!(f, "({x}{pad})")
            }
            Expr::Func { name, x, .. } => write!(f, "{name}( {x} )"),
        }
    }
}

/// Literal text of an evaluation result: the value's literal text,
/// `<err:...>` for an error.
///
/// # Examples
///
/// ```
/// use lrep::output::to_literal;
/// use lrep::{EvalError, Value};
///
/// assert_eq!(to_literal(&Ok(Value::Attr(Some("john".into())))), r#""john""#);
/// assert_eq!(to_literal(&Ok(Value::Nil)), "<nil>");
/// assert_eq!(
///     to_literal(&Err(EvalError::UnsupportedFunction("since".into()))),
///     r#"<err:unsupported function "since">"#
/// );
/// ```
pub fn to_literal(result: &Result<Value, EvalError>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(e) => format!("<err:{e}>"),
    }
}

/// A record as a JSON object; keys without value map to `null`.
pub fn record_to_json(record: &Record) -> serde_json::Value {
    let map = record
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Some(v) => serde_json::Value::String(v.to_string()),
                None => serde_json::Value::Null,
            };
            (key.to_string(), value)
        })
        .collect();
    serde_json::Value::Object(map)
}
