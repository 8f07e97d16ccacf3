use std::mem;

use thiserror::Error;

use crate::{
    ast::{BinOp, CompOp, Expr, Literal, LiteralKind, PostOp, Token, TokenKind, UnaryOp},
    lexer::{LexError, Lexer},
};

/// Errors that stop the parse. There is no recovery: the first one wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The lexer could not scan a token
    #[error(transparent)]
    Lex(#[from] LexError),

    /// A specific token was required here
    #[error("{pos}: {context}: expected {expected}, found {found} instead")]
    Expected {
        pos: usize,
        context: &'static str,
        expected: TokenKind,
        found: TokenKind,
    },

    /// An operand position holds something that is not a literal
    #[error(
        "{pos}: syntax error: expecting one literal: identifier, regexp, number, decimal or duration; got {found} instead"
    )]
    ExpectedLiteral { pos: usize, found: TokenKind },

    /// `?` applied to a function call
    #[error("{pos}: the existence operator '?' only applies to a literal, not to a function call")]
    ExistsOperand { pos: usize },

    /// Tokens left over once the query is complete
    #[error("{pos}: unexpected {found} after the end of the query")]
    Trailing { pos: usize, found: TokenKind },

    /// More nested operators than [`MAX_DEPTH`]
    #[error("{pos}: query nests more than {limit} operators deep")]
    TooDeep { pos: usize, limit: usize },
}

/// Deepest tree the parser builds. Every `(`, `NOT`, function call and each
/// further `AND`/`OR` operand adds one level.
///
/// Evaluating, formatting and dropping a tree recurse once per level; under
/// this bound they fit on a default thread stack.
pub const MAX_DEPTH: usize = 256;

/// Recursive descent parser, one token of lookahead.
///
/// ```text
/// Query         = OrExpr
/// OrExpr        = AndExpr ( "OR" OrExpr )?
/// AndExpr       = UnaryExpr ( "AND" AndExpr )?
/// UnaryExpr     = "(" OrExpr ")" | "NOT" UnaryExpr | LiteralOpExpr
/// LiteralOpExpr = ( FunctionCall | Literal ) ( "?" | ( "<" | ">" | "=" | "~" ) Literal )?
/// FunctionCall  = FUNCTION "(" OrExpr ")"
/// Literal       = IDENT | REGEXP | NUMBER | DECIMAL | DURATION
/// ```
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_token.is(kind)
    }

    /// Consume a token of the `expected` kind and return its offset.
    fn expect(&mut self, expected: TokenKind, context: &'static str) -> Result<usize, ParseError> {
        if !self.check(expected) {
            return Err(ParseError::Expected {
                pos: self.current_token.start,
                context,
                expected,
                found: self.current_token.kind,
            });
        }
        let pos = self.current_token.start;
        self.advance()?;
        Ok(pos)
    }

    /// Run `parse` one nesting level down.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                pos: self.current_token.start,
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse a complete query; the input must end right after it.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        if !self.check(TokenKind::Eof) {
            return Err(ParseError::Trailing {
                pos: self.current_token.start,
                found: self.current_token.kind,
            });
        }
        Ok(expr)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let x = self.parse_and()?;

        if !self.check(TokenKind::Or) {
            return Ok(x);
        }
        let op_pos = self.current_token.start;
        self.advance()?;
        let y = self.nested(Self::parse_or)?;

        Ok(Expr::Binary {
            x: Box::new(x),
            op: BinOp::Or,
            op_pos,
            y: Box::new(y),
        })
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let x = self.parse_unary()?;

        if !self.check(TokenKind::And) {
            return Ok(x);
        }
        let op_pos = self.current_token.start;
        self.advance()?;
        let y = self.nested(Self::parse_and)?;

        Ok(Expr::Binary {
            x: Box::new(x),
            op: BinOp::And,
            op_pos,
            y: Box::new(y),
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.current_token.kind {
            TokenKind::LParen => {
                let lparen = self.current_token.start;
                self.advance()?;
                let x = self.nested(Self::parse_or)?;
                let rparen = self.expect(TokenKind::RParen, "parenthesis mismatch")?;
                Ok(Expr::Paren {
                    lparen,
                    x: Box::new(x),
                    rparen,
                })
            }
            TokenKind::Not => {
                let op_pos = self.current_token.start;
                self.advance()?;
                let x = self.nested(Self::parse_unary)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    op_pos,
                    x: Box::new(x),
                })
            }
            _ => self.parse_literal_op(),
        }
    }

    fn parse_function_call(&mut self) -> Result<Expr, ParseError> {
        let name_pos = self.current_token.start;
        let name = mem::take(&mut self.current_token.text);
        self.advance()?;

        self.expect(TokenKind::LParen, "invalid function call")?;
        let x = self.nested(Self::parse_or)?;
        let rparen = self.expect(TokenKind::RParen, "invalid function call")?;

        Ok(Expr::Func {
            name,
            name_pos,
            x: Box::new(x),
            rparen,
        })
    }

    fn parse_literal_op(&mut self) -> Result<Expr, ParseError> {
        let lhs = if self.check(TokenKind::Function) {
            self.parse_function_call()?
        } else {
            Expr::Literal(self.parse_literal()?)
        };

        let op = match self.current_token.kind {
            TokenKind::Exists => {
                let op_pos = self.current_token.start;
                self.advance()?;
                return match lhs {
                    Expr::Literal(x) => Ok(Expr::PostComp {
                        x,
                        op: PostOp::Exists,
                        op_pos,
                    }),
                    _ => Err(ParseError::ExistsOperand { pos: op_pos }),
                };
            }
            TokenKind::Lt => CompOp::Lt,
            TokenKind::Gt => CompOp::Gt,
            TokenKind::Eq => CompOp::Eq,
            TokenKind::Match => CompOp::Match,
            _ => return Ok(lhs),
        };

        let op_pos = self.current_token.start;
        self.advance()?;
        let y = self.parse_literal()?;

        Ok(Expr::Comp {
            x: Box::new(lhs),
            op,
            op_pos,
            y,
        })
    }

    /// Parse a single literal. Tokens after it are left unread.
    pub fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        let Some(kind) = LiteralKind::from_token(self.current_token.kind) else {
            return Err(ParseError::ExpectedLiteral {
                pos: self.current_token.start,
                found: self.current_token.kind,
            });
        };
        let pos = self.current_token.start;
        let value = mem::take(&mut self.current_token.text);
        self.advance()?;
        Ok(Literal { kind, value, pos })
    }
}

/// Parse a query string into its tree.
///
/// # Examples
///
/// ```
/// use lrep::parse;
///
/// let expr = parse(".user ~ /john.*/ and .age < 40").unwrap();
/// assert_eq!(expr.to_string(), ".user ~ /john.*/   AND   .age < 40");
/// ```
pub fn parse(src: &str) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(src))?.parse()
}
