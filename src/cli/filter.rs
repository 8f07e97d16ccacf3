//! Filter a record stream with a parsed query

use std::io::{self, BufRead, Write};

use tracing::{debug, trace, warn};

use super::CliError;
use crate::{Evaluator, Expr, Record, RecordError, RecordReader, output::record_to_json};

/// Options for a filter run
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterOptions {
    /// Write matches as JSON objects instead of logfmt
    pub json: bool,
}

/// Counters for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Records read and evaluated
    pub read: usize,
    /// Records written out
    pub matched: usize,
    /// Lines that are not valid logfmt
    pub unreadable: usize,
    /// Records whose evaluation failed
    pub failed: usize,
}

/// Parse a query, for a run or a syntax check.
pub fn check_query(query: &str) -> Result<Expr, CliError> {
    crate::parse(query).map_err(|source| CliError::Parse {
        query: query.to_string(),
        source,
    })
}

/// Write the canonical form of a checked query, one line.
pub fn write_query<W: Write>(query: &Expr, output: &mut W) -> Result<(), CliError> {
    writeln!(output, "{query}")?;
    output.flush()?;
    Ok(())
}

fn write_record<W: Write>(output: &mut W, record: &Record, options: &FilterOptions) -> Result<(), CliError> {
    if options.json {
        serde_json::to_writer(&mut *output, &record_to_json(record))?;
        writeln!(output)?;
    } else {
        writeln!(output, "{record}")?;
    }
    Ok(())
}

/// Evaluate `query` on every record of `input` and write the matching ones
/// to `output`.
///
/// Unreadable lines and records whose evaluation fails are skipped and
/// reported as `warn` events. Only I/O failures stop the run.
pub fn run_filter<R: BufRead, W: Write>(
    query: &Expr,
    input: R,
    output: &mut W,
    options: &FilterOptions,
) -> Result<FilterStats, CliError> {
    let evaluator = Evaluator::new();
    let mut reader = RecordReader::new(input);
    let mut stats = FilterStats::default();

    while let Some(next) = reader.next() {
        let line = reader.line_number();
        let record = match next {
            Ok(record) => record,
            Err(RecordError::Io(e)) if e.kind() != io::ErrorKind::InvalidData => {
                return Err(CliError::Io(e));
            }
            Err(e) => {
                stats.unreadable += 1;
                warn!(line, error = %e, "read-error");
                continue;
            }
        };
        stats.read += 1;

        match evaluator.eval(query, &record).and_then(|v| v.to_bool()) {
            Ok(true) => {
                stats.matched += 1;
                write_record(output, &record, options)?;
            }
            Ok(false) => trace!(line, "no match"),
            Err(e) => {
                stats.failed += 1;
                warn!(line, record = %record, error = %e, "runtime-error");
            }
        }
    }

    output.flush()?;
    debug!(
        read = stats.read,
        matched = stats.matched,
        unreadable = stats.unreadable,
        failed = stats.failed,
        "end of input"
    );
    Ok(stats)
}
