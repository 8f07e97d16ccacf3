use thiserror::Error;

use crate::ast::{Token, TokenKind};

/// Micro sign, as written in `100µs`.
const MICRO: char = '\u{00B5}';

/// Errors raised while scanning a single token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A regexp literal whose closing `/` is missing
    #[error("{pos}: invalid regexp token: must end with '/', got {found}")]
    UnterminatedRegexp { pos: usize, found: String },

    /// A character that cannot start any token
    #[error("{pos}: unknown symbol {symbol:?}")]
    UnknownSymbol { pos: usize, symbol: char },
}

fn is_ident_char(ch: char) -> bool {
    ch > ' ' && ch != '"' && ch != '='
}

fn is_regexp_char(ch: char) -> bool {
    ch > ' ' && ch != '/'
}

fn is_function_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_function_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Letters that can spell `or`, `and`, `not` in any case.
fn is_keyword_char(ch: char) -> bool {
    matches!(ch, 'a' | 'n' | 'd' | 'o' | 'r' | 't' | 'A' | 'N' | 'D' | 'O' | 'R' | 'T')
}

fn is_number_start(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '+' || ch == '-'
}

fn is_number_char(ch: char) -> bool {
    ch.is_ascii_digit() || is_unit_char(ch) || ch == '.'
}

fn is_unit_char(ch: char) -> bool {
    matches!(ch, 's' | 'm' | 'h' | 'n' | 'u' | MICRO)
}

fn describe(ch: Option<char>) -> String {
    match ch {
        Some(ch) => format!("{ch:?}"),
        None => "EOF".to_string(),
    }
}

/// Single pass scanner over a query.
///
/// Offsets are counted in characters from the start of the query.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch <= ' ' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Append the run of characters accepted by `accept` to `text`.
    fn read_while(&mut self, text: &mut String, accept: impl Fn(char) -> bool) {
        while let Some(ch) = self.current_char() {
            if !accept(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
    }

    /// Read the body of a regexp and its closing `/`; `\` escapes are kept raw.
    fn read_regexp(&mut self, text: &mut String) -> Result<(), LexError> {
        while let Some(ch) = self.current_char() {
            if !is_regexp_char(ch) {
                break;
            }
            text.push(ch);
            self.advance();
            if ch == '\\' {
                match self.current_char() {
                    Some(escaped) => {
                        text.push(escaped);
                        self.advance();
                    }
                    None => break,
                }
            }
        }

        match self.current_char() {
            Some('/') => {
                text.push('/');
                self.advance();
                Ok(())
            }
            found => Err(LexError::UnterminatedRegexp {
                pos: self.position,
                found: describe(found),
            }),
        }
    }

    /// Scan the next token. Once the input is exhausted, every call returns `Eof`.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let start = self.position;
        let Some(first) = self.current_char() else {
            return Ok(Token::new(TokenKind::Eof, "", start));
        };
        self.advance();

        let mut text = String::from(first);
        let kind = match first {
            '.' => {
                self.read_while(&mut text, is_ident_char);
                TokenKind::Ident
            }
            '/' => {
                self.read_regexp(&mut text)?;
                TokenKind::Regexp
            }
            ch if is_function_start(ch) => {
                self.read_while(&mut text, is_keyword_char);
                match text.to_uppercase().as_str() {
                    "OR" => TokenKind::Or,
                    "AND" => TokenKind::And,
                    "NOT" => TokenKind::Not,
                    _ => {
                        self.read_while(&mut text, is_function_char);
                        TokenKind::Function
                    }
                }
            }
            ch if is_number_start(ch) => {
                self.read_while(&mut text, is_number_char);
                // a unit makes it a duration, even when it also has a '.'
                if text.chars().any(is_unit_char) {
                    TokenKind::Duration
                } else if text.contains('.') {
                    TokenKind::Decimal
                } else {
                    TokenKind::Number
                }
            }
            '~' => TokenKind::Match,
            '=' => TokenKind::Eq,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '?' => TokenKind::Exists,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            symbol => return Err(LexError::UnknownSymbol { pos: start, symbol }),
        };

        Ok(Token::new(kind, text, start))
    }
}
