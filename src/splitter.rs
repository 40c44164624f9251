//! Statement splitter for SQL dumps.
//!
//! Splits dump text on top-level semicolons. Semicolons inside `'...'`,
//! `"..."` or `` `...` `` regions are data, not delimiters.
//!
//! # State machine
//!
//! ```text
//!            ' " `                       \
//!  Unquoted ───────▶ InQuote(q) ─────────────▶ Escaped(q)
//!     ▲  │               │  ▲                      │
//!     │  │ ;             │  └──────────────────────┘
//!     │  ▼               │      any character
//!   (emit)               │ q
//!     ▲──────────────────┘
//! ```
//!
//! Only ASCII bytes are significant, so the scanner walks bytes and every
//! statement is a slice of the input cut on a char boundary.

use std::iter::FusedIterator;

/// A character that opens (and closes) a quoted region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quote {
    /// `'` string literal.
    Single,
    /// `"` string literal (or ANSI identifier).
    Double,
    /// `` ` `` MySQL identifier.
    Backtick,
}

impl Quote {
    /// Map a character to the quote it opens, if any.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '\'' => Some(Quote::Single),
            '"' => Some(Quote::Double),
            '`' => Some(Quote::Backtick),
            _ => None,
        }
    }

    /// The quote character itself.
    pub fn as_char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
            Quote::Backtick => '`',
        }
    }

    fn from_byte(b: u8) -> Option<Self> {
        if b.is_ascii() {
            Self::from_char(b as char)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Scanner position relative to quoted regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteState {
    #[default]
    Unquoted,
    /// Inside a region opened by the given quote.
    InQuote(Quote),
    /// Inside a quoted region, right after a backslash.
    Escaped(Quote),
}

/// What the scanner does with the byte it just stepped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// The byte belongs to the current statement.
    Keep,
    /// The byte is a top-level `;` and ends the current statement.
    Delimit,
}

impl QuoteState {
    /// Advance the state machine by one input byte.
    pub fn step(self, b: u8) -> (QuoteState, Scan) {
        match self {
            QuoteState::Unquoted => {
                if b == b';' {
                    return (QuoteState::Unquoted, Scan::Delimit);
                }
                match Quote::from_byte(b) {
                    Some(q) => (QuoteState::InQuote(q), Scan::Keep),
                    None => (QuoteState::Unquoted, Scan::Keep),
                }
            }
            QuoteState::InQuote(q) => {
                if b == b'\\' {
                    (QuoteState::Escaped(q), Scan::Keep)
                } else if Quote::from_byte(b) == Some(q) {
                    (QuoteState::Unquoted, Scan::Keep)
                } else {
                    (QuoteState::InQuote(q), Scan::Keep)
                }
            }
            // `\q` and `\\` are literal pairs; after any other character the
            // backslash was plain text and that character is plain text too.
            QuoteState::Escaped(q) => (QuoteState::InQuote(q), Scan::Keep),
        }
    }

    /// The quote still open in this state, if any.
    pub fn open_quote(self) -> Option<Quote> {
        match self {
            QuoteState::Unquoted => None,
            QuoteState::InQuote(q) | QuoteState::Escaped(q) => Some(q),
        }
    }
}

/// Unicode whitespace plus the ASCII file, group, record and unit
/// separators (U+001C..=U+001F).
fn is_edge_space(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

fn trim_statement(s: &str) -> &str {
    s.trim_matches(is_edge_space)
}

/// Split dump text into trimmed, non-empty statements in input order.
///
/// The delimiting semicolons are dropped. Text after the last delimiter is
/// returned as a final statement, and an unterminated quote swallows the
/// rest of the input into that statement.
///
/// # Example
///
/// ```
/// use dumpsplit::split;
///
/// let stmts = split("INSERT INTO t VALUES ('a;b'); SELECT 1");
/// assert_eq!(stmts, vec!["INSERT INTO t VALUES ('a;b')", "SELECT 1"]);
/// ```
pub fn split(text: &str) -> Vec<&str> {
    statements(text).collect()
}

/// Lazily iterate over the statements of `text`.
pub fn statements(text: &str) -> Statements<'_> {
    Statements::new(text)
}

/// Iterator over the statements of an in-memory dump.
///
/// Yields slices of the input; nothing is copied.
#[derive(Debug, Clone)]
pub struct Statements<'a> {
    text: &'a str,
    pos: usize,
    start: usize,
    state: QuoteState,
}

impl<'a> Statements<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            start: 0,
            state: QuoteState::Unquoted,
        }
    }

    /// The quote left open by the scan so far.
    ///
    /// Once the iterator is exhausted, `Some` means the input ended inside
    /// a quoted region and the last statement absorbed everything after it.
    pub fn open_quote(&self) -> Option<Quote> {
        self.state.open_quote()
    }
}

impl<'a> Iterator for Statements<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.text.as_bytes();

        while self.pos < bytes.len() {
            let (state, scan) = self.state.step(bytes[self.pos]);
            self.state = state;
            self.pos += 1;

            if scan == Scan::Delimit {
                let stmt = trim_statement(&self.text[self.start..self.pos - 1]);
                self.start = self.pos;
                if !stmt.is_empty() {
                    return Some(stmt);
                }
            }
        }

        // Trailing statement without a delimiter
        if self.start < bytes.len() {
            let stmt = trim_statement(&self.text[self.start..]);
            self.start = bytes.len();
            if !stmt.is_empty() {
                return Some(stmt);
            }
        }

        None
    }
}

impl FusedIterator for Statements<'_> {}

/// Push-based splitter for dumps that arrive in chunks.
///
/// Quote and escape state carry over between chunks, so any chunking of a
/// text produces the same statements as [`split`] on the whole text.
///
/// ```
/// use dumpsplit::StreamSplitter;
///
/// let mut splitter = StreamSplitter::new();
/// assert!(splitter.feed("INSERT INTO t VALUES ('a;").is_empty());
/// assert_eq!(splitter.feed("b');\nSELECT 1"), vec!["INSERT INTO t VALUES ('a;b')"]);
/// assert_eq!(splitter.finish().as_deref(), Some("SELECT 1"));
/// ```
#[derive(Debug, Default)]
pub struct StreamSplitter {
    buffer: String,
    state: QuoteState,
}

impl StreamSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the next chunk, returning the statements it completes.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        let mut completed = Vec::new();
        let mut start = 0;

        for (i, b) in chunk.bytes().enumerate() {
            let (state, scan) = self.state.step(b);
            self.state = state;

            if scan == Scan::Delimit {
                self.buffer.push_str(&chunk[start..i]);
                start = i + 1;

                let stmt = trim_statement(&self.buffer);
                if !stmt.is_empty() {
                    completed.push(stmt.to_string());
                }
                self.buffer.clear();
            }
        }

        self.buffer.push_str(&chunk[start..]);
        completed
    }

    /// Flush the pending text as the final statement.
    ///
    /// The quote state is kept so [`open_quote`](Self::open_quote) can still
    /// be inspected afterwards.
    pub fn finish(&mut self) -> Option<String> {
        let pending = std::mem::take(&mut self.buffer);
        let stmt = trim_statement(&pending);
        if stmt.is_empty() {
            None
        } else {
            Some(stmt.to_string())
        }
    }

    /// The quote left open by the chunks seen so far.
    pub fn open_quote(&self) -> Option<Quote> {
        self.state.open_quote()
    }

    /// Text buffered since the last delimiter.
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}
