use std::io::{self, BufRead};

use crate::record::{Record, RecordError};

/// Reads successive records from a line oriented source.
///
/// Blank lines are skipped. A line that fails to parse yields an error and
/// reading can go on with the next line.
///
/// # Examples
///
/// ```
/// use lrep::RecordReader;
///
/// let input = "a=1\n\nb=2 debug\n";
/// let records: Vec<_> = RecordReader::new(input.as_bytes())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(records.len(), 2);
/// assert!(records[1].contains_key("debug"));
/// ```
pub struct RecordReader<R> {
    source: R,
    line: String,
    line_number: usize,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(source: R) -> Self {
        RecordReader {
            source,
            line: String::new(),
            line_number: 0,
        }
    }

    /// Number of the last line read, starting at 1.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Text of the last line read, without its line terminator.
    pub fn line(&self) -> &str {
        self.line.trim_end_matches(['\n', '\r'])
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.source.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    let line = self.line();
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(Record::parse(line));
                }
                Err(e) => {
                    // a line that is not UTF-8 is consumed all the same
                    if e.kind() == io::ErrorKind::InvalidData {
                        self.line_number += 1;
                    }
                    return Some(Err(RecordError::Io(e)));
                }
            }
        }
    }
}
