use std::fmt;

/// Boolean binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// Logical AND (`and`, short-circuits on false)
    And,
    /// Logical OR (`or`, short-circuits on true)
    Or,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation (`not`)
    Not,
}

/// Comparison operators between an operand and a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompOp {
    /// Regexp containment match (`~`)
    Match,
    /// Lower than (`<`)
    Lt,
    /// Greater than (`>`)
    Gt,
    /// Numeric equality (`=`)
    Eq,
}

/// Postfix operators on a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOp {
    /// Key existence (`?`)
    Exists,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOp::And => "AND",
            BinOp::Or => "OR",
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Not => "NOT",
        })
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompOp::Match => "~",
            CompOp::Lt => "<",
            CompOp::Gt => ">",
            CompOp::Eq => "=",
        })
    }
}

impl fmt::Display for PostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PostOp::Exists => "?",
        })
    }
}
