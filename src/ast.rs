//! # ql - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for `ql`, the query
//! language used to select logfmt records.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes and literals
//! - **[operators]** - Boolean, comparison and postfix operators
//!
//! ## Quick Start
//!
//! ```text
//! .user ~ /john.*/ and .age < 40
//! ```
//!
//! Keeps the records whose `user` matches `john.*` and whose `age` is below 40.
//!
//! ## Core Concepts
//!
//! ### Keys
//!
//! A record attribute is referenced by its name prefixed with `.`. Key names
//! run until the next whitespace, so `(.a AND .b)` reads the key `b)`:
//! write `(.a AND .b )` instead.
//!
//! ### Precedence
//!
//! From loosest to tightest: `OR`, `AND`, `NOT`, then comparisons
//! (`<`, `>`, `=`, `~`) and the postfix `?`.
//!
//! ```text
//! .a OR .b AND .c    // same as .a OR ( .b AND .c )
//! ```
//!
//! ### Canonical form
//!
//! Every tree renders back to text through [`crate::output::to_query`]
//! (also the `Display` impl of [`Expr`]):
//!
//! ```text
//! .name ~ /eric.*/   OR   .load < 35ms
//! ```
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Expr, Literal, LiteralKind};
pub use operators::{BinOp, CompOp, PostOp, UnaryOp};
pub use tokens::{Token, TokenKind};
