use std::fmt;

/// Kind of a lexical token.
///
/// Tokens with a fixed spelling (operators, keywords) display as that
/// spelling; the others display between `<` and `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Attribute reference: `.` followed by any run of characters above `' '`
    /// that are not `"` or `=`
    ///
    /// # Examples
    /// ```text
    /// .user
    /// .http.status
    /// ```
    Ident,

    /// Function name (letters, digits and `_`, starting with a letter or `_`)
    ///
    /// # Examples
    /// ```text
    /// since( .at )
    /// ```
    Function,

    /// Regular expression between a pair of `/`. A `/` inside is written `\/`.
    ///
    /// # Examples
    /// ```text
    /// /eric.*/
    /// /path\/sub.*/
    /// ```
    Regexp,

    /// Integer, optionally signed
    Number,

    /// Number containing a `.`
    Decimal,

    /// Number with a time unit (`ns`, `us`, `µs`, `ms`, `s`, `m`, `h`)
    ///
    /// # Examples
    /// ```text
    /// 35ms
    /// 1h30m
    /// ```
    Duration,

    /// `or`, case-insensitive
    Or,
    /// `and`, case-insensitive
    And,
    /// `not`, case-insensitive
    Not,

    /// Regexp match `~` (as in awk)
    Match,
    /// Lower than `<`
    Lt,
    /// Greater than `>`
    Gt,
    /// Equal `=`
    Eq,
    /// Postfix existence test `?`
    Exists,

    LParen,
    RParen,

    /// End of input
    Eof,

    /// Never produced by a successful scan
    Illegal,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Ident => "<IDENT>",
            TokenKind::Function => "<FUNCTION>",
            TokenKind::Regexp => "<REGEXP>",
            TokenKind::Number => "<NUMBER>",
            TokenKind::Decimal => "<DECIMAL>",
            TokenKind::Duration => "<DURATION>",
            TokenKind::Or => "OR",
            TokenKind::And => "AND",
            TokenKind::Not => "NOT",
            TokenKind::Match => "~",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Eq => "=",
            TokenKind::Exists => "?",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Eof => "<EOF>",
            TokenKind::Illegal => "<ILLEGAL>",
        };
        f.write_str(s)
    }
}

/// A scanned token: its kind, raw lexeme and start offset (in characters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            start,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
