use std::fmt;

use regex::Regex;
use thiserror::Error;

use crate::{
    ast::{BinOp, CompOp, Expr, Literal, LiteralKind, PostOp, UnaryOp},
    duration::Duration,
    parser::ParseError,
    record::Record,
    value::Value,
};

/// Side of a binary comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "left",
            Side::Right => "right",
        })
    }
}

/// Errors that can occur while evaluating a query against one record.
///
/// They only concern that record: the same query can be evaluated against
/// the next one.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    /// Function calls parse, but none can be evaluated
    #[error("unsupported function {0:?}")]
    UnsupportedFunction(String),

    /// `?` on something other than an identifier
    #[error("cannot test existence on {0}, only <IDENT> is supported")]
    ExistsOperand(LiteralKind),

    /// A value of the wrong runtime type
    #[error("got {found} expecting {expected}")]
    TypeMismatch {
        found: &'static str,
        expected: &'static str,
    },

    /// Record value that does not spell a boolean
    #[error("cannot parse {0:?} as a boolean")]
    InvalidBool(String),

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("invalid decimal {0:?}")]
    InvalidDecimal(String),

    #[error("invalid duration {0:?}")]
    InvalidDuration(String),

    #[error("invalid regexp {pattern:?}: {source}")]
    InvalidRegexp {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Record value that is not a `ql` literal, where a number was needed
    #[error("cannot evaluate record value {value:?} as decimal: {source}")]
    RecordValue {
        value: String,
        #[source]
        source: Box<ParseError>,
    },

    /// One operand of `~` has the wrong type
    #[error("invalid {side} hand side of '~' comparison: {source}")]
    MatchOperand {
        side: Side,
        #[source]
        source: Box<EvalError>,
    },
}

/// Tree-walking evaluator.
///
/// It holds no state: the same query can be evaluated against any number of
/// records, from any number of threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Evaluator
    }

    /// Evaluates `expr` against `record`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lrep::{parse, Evaluator, Record, Value};
    ///
    /// let query = parse(".in < .out").unwrap();
    /// let record = Record::new().with("in", "120").with("out", "125");
    ///
    /// let result = Evaluator::new().eval(&query, &record).unwrap();
    /// assert_eq!(result, Value::Boolean(true));
    /// ```
    pub fn eval(&self, expr: &Expr, record: &Record) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(lit) => self.eval_literal(lit, record),
            Expr::Binary { x, op, y, .. } => {
                let left = self.eval(x, record)?.to_bool()?;
                // the right side is only evaluated when the left does not decide
                match (op, left) {
                    (BinOp::And, false) => Ok(Value::Boolean(false)),
                    (BinOp::Or, true) => Ok(Value::Boolean(true)),
                    _ => Ok(Value::Boolean(self.eval(y, record)?.to_bool()?)),
                }
            }
            Expr::Unary { op: UnaryOp::Not, x, .. } => {
                Ok(Value::Boolean(!self.eval(x, record)?.to_bool()?))
            }
            Expr::Paren { x, .. } => self.eval(x, record),
            Expr::Func { name, .. } => Err(EvalError::UnsupportedFunction(name.clone())),
            Expr::PostComp {
                x,
                op: PostOp::Exists,
                ..
            } => match x.kind {
                LiteralKind::Ident => Ok(Value::Boolean(record.contains_key(x.key()))),
                kind => Err(EvalError::ExistsOperand(kind)),
            },
            Expr::Comp { x, op, y, .. } => match op {
                CompOp::Match => self.eval_match(x, y, record),
                CompOp::Lt | CompOp::Gt | CompOp::Eq => {
                    let lhs = self.eval(x, record)?.to_decimal()?;
                    let rhs = self.eval_literal(y, record)?.to_decimal()?;
                    Ok(Value::Boolean(match op {
                        CompOp::Lt => lhs < rhs,
                        CompOp::Gt => lhs > rhs,
                        _ => lhs == rhs,
                    }))
                }
            },
        }
    }

    fn eval_match(&self, x: &Expr, y: &Literal, record: &Record) -> Result<Value, EvalError> {
        let lhs = self
            .eval(x, record)
            .map(Value::to_attr)
            .map_err(|e| EvalError::MatchOperand {
                side: Side::Left,
                source: Box::new(e),
            })?;
        let rhs = self
            .eval_literal(y, record)
            .and_then(Value::to_regexp)
            .map_err(|e| EvalError::MatchOperand {
                side: Side::Right,
                source: Box::new(e),
            })?;
        // an absent value is matched as the empty string
        Ok(Value::Boolean(rhs.is_match(lhs.as_deref().unwrap_or(""))))
    }

    /// Evaluates a single literal; identifiers are looked up in `record`.
    pub fn eval_literal(&self, lit: &Literal, record: &Record) -> Result<Value, EvalError> {
        match lit.kind {
            LiteralKind::Ident => Ok(match record.get(lit.key()) {
                Some(value) => Value::Attr(value.map(str::to_string)),
                None => Value::Nil,
            }),
            LiteralKind::Number => lit
                .value
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| EvalError::InvalidNumber(lit.value.clone())),
            LiteralKind::Decimal => lit
                .value
                .parse::<f64>()
                .map(Value::Decimal)
                .map_err(|_| EvalError::InvalidDecimal(lit.value.clone())),
            LiteralKind::Duration => Duration::parse(&lit.value)
                .map(Value::Duration)
                .map_err(|_| EvalError::InvalidDuration(lit.value.clone())),
            LiteralKind::Regexp => {
                let pattern = regexp_pattern(&lit.value);
                Regex::new(&pattern)
                    .map(Value::Regexp)
                    .map_err(|source| EvalError::InvalidRegexp { pattern, source })
            }
        }
    }
}

/// Pattern of a `/.../` literal, with `\/` turned back into `/`.
fn regexp_pattern(raw: &str) -> String {
    let inner = raw.strip_prefix('/').unwrap_or(raw);
    let inner = inner.strip_suffix('/').unwrap_or(inner);
    inner.replace("\\/", "/")
}

/// Evaluates `expr` against `record` with a fresh [`Evaluator`].
pub fn eval(expr: &Expr, record: &Record) -> Result<Value, EvalError> {
    Evaluator::new().eval(expr, record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regexp_pattern() {
        assert_eq!(regexp_pattern("/eric.*/"), "eric.*");
        assert_eq!(regexp_pattern(r"/path\/sub.*/"), "path/sub.*");
        assert_eq!(regexp_pattern("//"), "");
    }

    #[test]
    fn test_number_literals() {
        let rec = Record::new();
        let ev = Evaluator::new();
        let num = |kind, text: &str| ev.eval_literal(&Literal::new(kind, text, 0), &rec);

        assert_eq!(num(LiteralKind::Number, "+12354").unwrap(), Value::Integer(12354));
        assert_eq!(num(LiteralKind::Number, "-7").unwrap(), Value::Integer(-7));
        assert!(matches!(num(LiteralKind::Number, "-"), Err(EvalError::InvalidNumber(_))));
        assert_eq!(num(LiteralKind::Decimal, "52.5").unwrap(), Value::Decimal(52.5));
        assert!(matches!(num(LiteralKind::Decimal, "1.2.3"), Err(EvalError::InvalidDecimal(_))));
        assert!(matches!(num(LiteralKind::Duration, "1.2.3s"), Err(EvalError::InvalidDuration(_))));
    }

    #[test]
    fn test_regexp_literal_errors() {
        let err = Evaluator::new()
            .eval_literal(&Literal::new(LiteralKind::Regexp, "/a(/", 0), &Record::new())
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidRegexp { ref pattern, .. } if pattern == "a("));
    }
}
