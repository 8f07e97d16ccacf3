use std::fmt;

use crate::ast::{BinOp, CompOp, PostOp, TokenKind, UnaryOp};

/// Kind of a literal; it decides how the literal evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// `.name`, evaluates to the record's value for `name`
    Ident,
    /// `/pattern/`, evaluates to a compiled regular expression
    Regexp,
    /// `42`, evaluates to an integer
    Number,
    /// `4.2`, evaluates to a decimal
    Decimal,
    /// `35ms`, evaluates to a duration
    Duration,
}

impl LiteralKind {
    /// Literal kind for a token kind, if that token can be a literal.
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Ident => Some(LiteralKind::Ident),
            TokenKind::Regexp => Some(LiteralKind::Regexp),
            TokenKind::Number => Some(LiteralKind::Number),
            TokenKind::Decimal => Some(LiteralKind::Decimal),
            TokenKind::Duration => Some(LiteralKind::Duration),
            _ => None,
        }
    }

    pub fn token_kind(self) -> TokenKind {
        match self {
            LiteralKind::Ident => TokenKind::Ident,
            LiteralKind::Regexp => TokenKind::Regexp,
            LiteralKind::Number => TokenKind::Number,
            LiteralKind::Decimal => TokenKind::Decimal,
            LiteralKind::Duration => TokenKind::Duration,
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token_kind().fmt(f)
    }
}

/// A leaf of the tree: a classified token, with its raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub value: String,
    pub pos: usize,
}

impl Literal {
    pub fn new(kind: LiteralKind, value: impl Into<String>, pos: usize) -> Self {
        Literal {
            kind,
            value: value.into(),
            pos,
        }
    }

    /// Attribute name of an identifier literal (the text without its leading `.`).
    pub fn key(&self) -> &str {
        self.value.strip_prefix('.').unwrap_or(&self.value)
    }

    pub fn end(&self) -> usize {
        self.pos + self.value.chars().count()
    }
}

/// Abstract Syntax Tree node of a `ql` query.
///
/// Children are always complete nodes: a failed parse never yields a tree.
/// Trees are immutable once built and can be evaluated any number of times,
/// from any thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal operand
    ///
    /// # Examples
    /// ```text
    /// .user
    /// /john.*/
    /// 35ms
    /// ```
    Literal(Literal),

    /// Boolean combination
    ///
    /// # Example
    /// ```text
    /// .a AND .b
    /// ```
    Binary {
        x: Box<Expr>,
        op: BinOp,
        op_pos: usize,
        y: Box<Expr>,
    },

    /// Negation
    ///
    /// # Example
    /// ```text
    /// NOT .debug ?
    /// ```
    Unary {
        op: UnaryOp,
        op_pos: usize,
        x: Box<Expr>,
    },

    /// Grouping, transparent to evaluation
    Paren {
        lparen: usize,
        x: Box<Expr>,
        rparen: usize,
    },

    /// Single-argument function call. Parsed, but no function is available
    /// at evaluation time.
    ///
    /// # Example
    /// ```text
    /// since( .at ) > 1s
    /// ```
    Func {
        name: String,
        name_pos: usize,
        x: Box<Expr>,
        rparen: usize,
    },

    /// Comparison or regexp match against a literal
    ///
    /// # Examples
    /// ```text
    /// .load < 35ms
    /// .user ~ /eric.*/
    /// ```
    Comp {
        x: Box<Expr>,
        op: CompOp,
        op_pos: usize,
        y: Literal,
    },

    /// Postfix test on a literal
    ///
    /// # Example
    /// ```text
    /// .debug ?
    /// ```
    PostComp {
        x: Literal,
        op: PostOp,
        op_pos: usize,
    },
}

impl Expr {
    /// Offset of the first character of this expression.
    pub fn pos(&self) -> usize {
        match self {
            Expr::Literal(lit) => lit.pos,
            Expr::Binary { x, .. } => x.pos(),
            Expr::Unary { op_pos, .. } => *op_pos,
            Expr::Paren { lparen, .. } => *lparen,
            Expr::Func { name_pos, .. } => *name_pos,
            Expr::Comp { x, .. } => x.pos(),
            Expr::PostComp { x, .. } => x.pos,
        }
    }

    /// Offset just past the last character of this expression.
    pub fn end(&self) -> usize {
        match self {
            Expr::Literal(lit) => lit.end(),
            Expr::Binary { y, .. } => y.end(),
            Expr::Unary { x, .. } => x.end(),
            Expr::Paren { rparen, .. } => rparen + 1,
            Expr::Func { rparen, .. } => rparen + 1,
            Expr::Comp { y, .. } => y.end(),
            Expr::PostComp { op_pos, .. } => op_pos + 1,
        }
    }

    /// Whether the rightmost token of this expression is an identifier.
    ///
    /// Identifiers run until whitespace, so a `)` written right after one
    /// would be read as part of it.
    pub(crate) fn ends_with_ident(&self) -> bool {
        match self {
            Expr::Literal(lit) => lit.kind == LiteralKind::Ident,
            Expr::Binary { y, .. } => y.ends_with_ident(),
            Expr::Unary { x, .. } => x.ends_with_ident(),
            Expr::Comp { y, .. } => y.kind == LiteralKind::Ident,
            Expr::Paren { .. } | Expr::Func { .. } | Expr::PostComp { .. } => false,
        }
    }
}
