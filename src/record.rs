//! The logfmt record model.
//!
//! A record is one log line: a set of attributes, each with or without a
//! value.
//!
//! ```text
//! at=info method=GET path=/ fwd="124.133.52.161" connect=4ms debug
//! ```
//!
//! Values are either an identifier (anything above `' '` but `"` and `=`) or
//! a double quoted string. Inside quotes, `\n`, `\t`, `\xNN`, `\uNNNN` and the
//! other C-style escapes stand for control characters, and `\` before any other
//! character makes it literal. Control characters are always written escaped,
//! so a record stays on one line.

use std::{collections::HashMap, fmt, io};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    /// A quoted value reaches the end of the line
    #[error("{pos}: unterminated quoted string")]
    UnterminatedQuote { pos: usize },

    /// A character that can start neither a key nor a separator
    #[error("{pos}: unexpected character {found:?}")]
    UnexpectedChar { pos: usize, found: char },

    #[error("read error: {0}")]
    Io(#[from] io::Error),
}

fn is_ident_char(ch: char) -> bool {
    ch > ' ' && ch != '"' && ch != '='
}

/// One logfmt line: attribute names mapped to an optional value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    attrs: HashMap<String, Option<String>>,
}

impl Record {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single line.
    ///
    /// # Examples
    ///
    /// ```
    /// use lrep::Record;
    ///
    /// let rec = Record::parse(r#"user=john msg="hello world" debug"#).unwrap();
    /// assert_eq!(rec.get("user"), Some(Some("john")));
    /// assert_eq!(rec.get("msg"), Some(Some("hello world")));
    /// assert_eq!(rec.get("debug"), Some(None));
    /// assert_eq!(rec.get("missing"), None);
    /// ```
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        LineScanner::new(line).record()
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) -> &mut Self {
        self.attrs.insert(key.into(), value);
        self
    }

    /// Builder form of [`Record::insert`] with a value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, Some(value.into()));
        self
    }

    /// Builder form of [`Record::insert`] for a key without value.
    pub fn flag(mut self, key: impl Into<String>) -> Self {
        self.insert(key, None);
        self
    }

    /// `None` when the key is missing, `Some(None)` when it has no value.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.attrs.get(key).map(|v| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Attributes in significance order: short (general) keys first, then
    /// lexicographic.
    pub fn sorted(&self) -> Vec<(&str, Option<&str>)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        pairs
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty() || value.chars().any(|c| !is_ident_char(c))
}

/// Double quoted form of `text`. Control characters are written as
/// backslash escapes, so the result never spans more than one line.
pub(crate) fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(ch);
            }
            '\u{07}' => quoted.push_str("\\a"),
            '\u{08}' => quoted.push_str("\\b"),
            '\u{0C}' => quoted.push_str("\\f"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{0B}' => quoted.push_str("\\v"),
            c if c.is_control() && c.is_ascii() => quoted.push_str(&format!("\\x{:02x}", c as u32)),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Character for the escape letter that follows a `\` in a quoted value;
/// any other character stands for itself.
fn unescape(letter: char) -> Option<char> {
    match letter {
        'a' => Some('\u{07}'),
        'b' => Some('\u{08}'),
        'f' => Some('\u{0C}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\u{0B}'),
        _ => None,
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    if needs_quotes(value) {
        f.write_str(&quote(value))
    } else {
        f.write_str(value)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.sorted().into_iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(key)?;
            if let Some(value) = value {
                f.write_str("=")?;
                write_value(f, value)?;
            }
        }
        Ok(())
    }
}

struct LineScanner {
    input: Vec<char>,
    position: usize,
}

impl LineScanner {
    fn new(line: &str) -> Self {
        LineScanner {
            input: line.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn skip_garbage(&mut self) {
        while self.current_char().is_some_and(|c| c <= ' ') {
            self.position += 1;
        }
    }

    fn identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.current_char() {
            if !is_ident_char(ch) {
                break;
            }
            text.push(ch);
            self.position += 1;
        }
        text
    }

    fn quoted(&mut self) -> Result<String, RecordError> {
        let start = self.position;
        self.position += 1; // opening quote
        let mut text = String::new();
        loop {
            match self.current_char() {
                None => return Err(RecordError::UnterminatedQuote { pos: start }),
                Some('"') => {
                    self.position += 1;
                    return Ok(text);
                }
                Some('\\') => {
                    self.position += 1;
                    let Some(escaped) = self.current_char() else {
                        return Err(RecordError::UnterminatedQuote { pos: start });
                    };
                    self.position += 1;
                    match escaped {
                        'x' => text.push(self.hex_escape(2).unwrap_or('x')),
                        'u' => text.push(self.hex_escape(4).unwrap_or('u')),
                        letter => text.push(unescape(letter).unwrap_or(letter)),
                    }
                }
                Some(ch) => {
                    text.push(ch);
                    self.position += 1;
                }
            }
        }
    }

    /// Read exactly `digits` hex digits as a character code. Nothing is
    /// consumed when they are missing.
    fn hex_escape(&mut self, digits: usize) -> Option<char> {
        let end = self.position + digits;
        let hex: String = self.input.get(self.position..end)?.iter().collect();
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let ch = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)?;
        self.position = end;
        Some(ch)
    }

    fn value(&mut self) -> Result<String, RecordError> {
        if self.current_char() == Some('"') {
            self.quoted()
        } else {
            Ok(self.identifier())
        }
    }

    fn record(mut self) -> Result<Record, RecordError> {
        let mut record = Record::new();
        loop {
            self.skip_garbage();
            let Some(ch) = self.current_char() else {
                return Ok(record);
            };
            if !is_ident_char(ch) {
                return Err(RecordError::UnexpectedChar {
                    pos: self.position,
                    found: ch,
                });
            }

            let key = self.identifier();
            self.skip_garbage();

            let value = if self.current_char() == Some('=') {
                self.position += 1;
                self.skip_garbage();
                Some(self.value()?)
            } else {
                None
            };
            record.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let rec = Record::parse("at=info  status = 200 path=/ debug").unwrap();
        assert_eq!(rec.len(), 4);
        assert_eq!(rec.get("at"), Some(Some("info")));
        assert_eq!(rec.get("status"), Some(Some("200")));
        assert_eq!(rec.get("path"), Some(Some("/")));
        assert_eq!(rec.get("debug"), Some(None));
    }

    #[test]
    fn test_parse_quoted() {
        let rec = Record::parse(r#"a="path/subpath" b="say \"hi\"" c="""#).unwrap();
        assert_eq!(rec.get("a"), Some(Some("path/subpath")));
        assert_eq!(rec.get("b"), Some(Some(r#"say "hi""#)));
        assert_eq!(rec.get("c"), Some(Some("")));
    }

    #[test]
    fn test_parse_escapes() {
        let rec = Record::parse(r#"a="l1\nl2\tx" b="\x01\u0085" c="\q\xzz""#).unwrap();
        assert_eq!(rec.get("a"), Some(Some("l1\nl2\tx")));
        assert_eq!(rec.get("b"), Some(Some("\u{1}\u{85}")));
        assert_eq!(rec.get("c"), Some(Some("qxzz")));
    }

    #[test]
    fn test_parse_blank_line() {
        assert!(Record::parse("  \t ").unwrap().is_empty());
        assert!(!Record::parse("a").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Record::parse(r#"a="open"#),
            Err(RecordError::UnterminatedQuote { pos: 2 })
        ));
        assert!(matches!(
            Record::parse(r#"a=1 "b""#),
            Err(RecordError::UnexpectedChar { pos: 4, found: '"' })
        ));
    }

    #[test]
    fn test_display_significance_order() {
        let rec = Record::new()
            .with("key1.detail", "another value")
            .with("key1", "value1")
            .flag("debug")
            .with("load", "25ms");
        assert_eq!(
            rec.to_string(),
            r#"key1=value1 load=25ms debug key1.detail="another value""#
        );
    }

    #[test]
    fn test_display_stays_on_one_line() {
        let rec = Record::new().with("msg", "line1\nline2\r\u{0}\u{7f}");
        let text = rec.to_string();
        assert_eq!(text, r#"msg="line1\nline2\r\x00\x7f""#);
        assert_eq!(text.lines().count(), 1);
        assert_eq!(Record::parse(&text).unwrap(), rec);
    }

    #[test]
    fn test_display_reparses() {
        let rec = Record::new()
            .with("msg", r#"a "quoted" \ word"#)
            .with("empty", "")
            .flag("verbose");
        assert_eq!(Record::parse(&rec.to_string()).unwrap(), rec);
    }
}
