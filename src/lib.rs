pub mod ast;
pub mod cli;
pub mod duration;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod reader;
pub mod record;
pub mod value;

pub use ast::{Expr, Literal, LiteralKind, Token, TokenKind};
pub use duration::Duration;
pub use evaluator::{EvalError, Evaluator, eval};
pub use lexer::{LexError, Lexer};
pub use output::{record_to_json, to_literal, to_query};
pub use parser::{MAX_DEPTH, ParseError, Parser, parse};
pub use reader::RecordReader;
pub use record::{Record, RecordError};
pub use value::Value;
