//! CLI support for lrep
//!
//! The pieces of the `lrep` binary that do not depend on argument parsing:
//! filtering a record stream, and the help text of the query language.

mod docs;
mod filter;

pub use docs::QUERY_HELP;
pub use filter::{FilterOptions, FilterStats, check_query, run_filter, write_query};

use std::io;

use thiserror::Error;

/// Errors that end an lrep run
#[derive(Debug, Error)]
pub enum CliError {
    /// The query does not parse
    #[error("invalid query {query:?}: {source}")]
    Parse {
        query: String,
        #[source]
        source: crate::ParseError,
    },

    /// Reading records or writing matches failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A match could not be written as JSON
    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Whether the error only means that the reader of our output went away.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, CliError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}
