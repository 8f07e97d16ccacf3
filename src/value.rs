use std::fmt;

use regex::Regex;

use crate::{
    duration::Duration,
    evaluator::{EvalError, Evaluator},
    lexer::Lexer,
    parser::Parser,
    record::{Record, quote},
};

/// A runtime value produced by evaluating a query.
///
/// The set of variants is closed: every node of a query evaluates to one of
/// them, or fails with an [`EvalError`].
///
/// # Examples
///
/// ```
/// use lrep::Value;
///
/// let flag = Value::Attr(Some("true".to_string()));
/// assert_eq!(flag.to_bool().unwrap(), true);
///
/// let load = Value::Attr(Some("35ms".to_string()));
/// assert_eq!(load.to_decimal().unwrap(), 0.035);
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// No value at all: the attribute is missing from the record
    Nil,

    /// A record value; `None` for a key written without `=value`
    Attr(Option<String>),

    Boolean(bool),

    /// 64-bit integer, from a NUMBER literal
    Integer(i64),

    /// 64-bit float, from a DECIMAL literal
    Decimal(f64),

    Duration(Duration),

    /// Compiled regular expression, from a REGEXP literal
    Regexp(Regex),
}

/// Parse boolean text: `1 t T TRUE true True` and `0 f F FALSE false False`.
fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Shortest decimal text for `x`, switching to an exponent when it is below
/// -4 or from 6 up (`0.0001`, `123456`, `1e-05`, `1.5e+06`).
pub fn format_decimal(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    let scientific = format!("{x:e}");
    if let Some((mantissa, exp)) = scientific.split_once('e')
        && let Ok(exp) = exp.parse::<i32>()
        && x != 0.0
        && (exp < -4 || exp >= 6)
    {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exp.unsigned_abs());
    }
    format!("{x}")
}

impl Value {
    /// Short name of the runtime type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil | Value::Attr(None) => "'nil'",
            Value::Attr(Some(_)) => "'val'",
            Value::Boolean(_) => "'bool'",
            Value::Integer(_) => "'number'",
            Value::Decimal(_) => "'decimal'",
            Value::Duration(_) => "'duration'",
            Value::Regexp(_) => "'regexp'",
        }
    }

    fn mismatch(&self, expected: &'static str) -> EvalError {
        EvalError::TypeMismatch {
            found: self.type_name(),
            expected,
        }
    }

    /// Boolean view of the value. An absent value is `false`; numbers are
    /// `true` when nonzero; record values must spell a boolean.
    pub fn to_bool(&self) -> Result<bool, EvalError> {
        match self {
            Value::Nil | Value::Attr(None) => Ok(false),
            Value::Attr(Some(text)) => {
                parse_bool(text).ok_or_else(|| EvalError::InvalidBool(text.clone()))
            }
            Value::Boolean(b) => Ok(*b),
            Value::Integer(n) => Ok(*n != 0),
            Value::Decimal(x) => Ok(*x != 0.0),
            Value::Duration(_) | Value::Regexp(_) => Err(self.mismatch("'bool'")),
        }
    }

    /// Only a regexp converts to a regexp.
    pub fn to_regexp(self) -> Result<Regex, EvalError> {
        match self {
            Value::Regexp(re) => Ok(re),
            other => Err(other.mismatch("'regexp'")),
        }
    }

    /// Numeric view of the value, used by `<`, `>` and `=`.
    ///
    /// An absent value is NaN. A record value is read as a `ql` literal and
    /// converted in turn, so `"35ms"` is 0.035 (seconds) and `"12"` is 12.
    /// Durations count in seconds.
    pub fn to_decimal(&self) -> Result<f64, EvalError> {
        match self {
            Value::Nil | Value::Attr(None) => Ok(f64::NAN),
            Value::Attr(Some(text)) => decimal_of_text(text),
            Value::Integer(n) => Ok(*n as f64),
            Value::Decimal(x) => Ok(*x),
            Value::Duration(d) => Ok(d.as_secs_f64()),
            Value::Boolean(_) | Value::Regexp(_) => Err(self.mismatch("'decimal'")),
        }
    }

    /// Text view of the value, used on the left of `~`.
    ///
    /// Record values are kept as they are, other values use their literal
    /// text, and a regexp its bare pattern.
    pub fn to_attr(self) -> Option<String> {
        match self {
            Value::Nil => None,
            Value::Attr(text) => text,
            Value::Boolean(b) => Some(b.to_string()),
            Value::Integer(n) => Some(n.to_string()),
            Value::Decimal(x) => Some(format_decimal(x)),
            Value::Duration(d) => Some(d.to_string()),
            Value::Regexp(re) => Some(re.as_str().to_string()),
        }
    }
}

/// Read a record value as a single literal and take its decimal view.
/// Anything after the first literal is ignored.
fn decimal_of_text(text: &str) -> Result<f64, EvalError> {
    let literal = Parser::new(Lexer::new(text))
        .and_then(|mut parser| parser.parse_literal())
        .map_err(|source| EvalError::RecordValue {
            value: text.to_string(),
            source: Box::new(source),
        })?;
    Evaluator::new()
        .eval_literal(&literal, &Record::new())?
        .to_decimal()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Attr(a), Value::Attr(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Regexp(a), Value::Regexp(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Literal text of the value: record values quoted, regexps between `/`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil | Value::Attr(None) => f.write_str("<nil>"),
            Value::Attr(Some(text)) => f.write_str(&quote(text)),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Decimal(x) => f.write_str(&format_decimal(*x)),
            Value::Duration(d) => write!(f, "{d}"),
            Value::Regexp(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}
