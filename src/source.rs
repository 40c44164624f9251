//! Reading dump text from files and streams.
//!
//! Dumps are decoded as UTF-8 when possible. Older exports are frequently
//! Latin-1, so `Encoding::Auto` retries with Latin-1, which accepts any byte
//! sequence.

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DumpError, DumpResult};
use crate::splitter::{statements, Quote, StreamSplitter};

/// How raw dump bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// UTF-8, falling back to Latin-1 when the bytes are not valid UTF-8.
    #[default]
    Auto,
    /// Strict UTF-8.
    #[serde(alias = "utf-8")]
    Utf8,
    /// ISO-8859-1.
    #[serde(alias = "latin-1", alias = "iso-8859-1")]
    Latin1,
}

impl FromStr for Encoding {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Encoding::Auto),
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Encoding::Latin1),
            _ => Err(DumpError::UnknownEncoding(s.to_string())),
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Encoding::Auto => "auto",
            Encoding::Utf8 => "utf8",
            Encoding::Latin1 => "latin1",
        };
        write!(f, "{}", name)
    }
}

/// Decode raw bytes read from `origin` (used only for error messages).
pub fn decode(bytes: Vec<u8>, encoding: Encoding, origin: &Path) -> DumpResult<String> {
    match encoding {
        Encoding::Latin1 => Ok(latin1(&bytes)),
        Encoding::Utf8 => String::from_utf8(bytes).map_err(|source| DumpError::Decode {
            path: origin.to_path_buf(),
            source,
        }),
        Encoding::Auto => match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                debug!(
                    path = %origin.display(),
                    valid_up_to = e.utf8_error().valid_up_to(),
                    "input is not UTF-8, decoding as Latin-1"
                );
                Ok(latin1(e.as_bytes()))
            }
        },
    }
}

/// Latin-1 maps every byte to the code point with the same value.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Read and decode a whole dump file.
pub fn read_path(path: impl AsRef<Path>, encoding: Encoding) -> DumpResult<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| DumpError::read(path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), %encoding, "read dump");
    decode(bytes, encoding, path)
}

/// Outcome of splitting a streamed dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// Statements handed to the callback.
    pub statements: usize,
    /// Quote left open at end of input, if any.
    pub open_quote: Option<Quote>,
}

/// Split a dump read line by line, handing each statement to `on_statement`
/// as soon as its delimiter is seen.
///
/// Lines are decoded one at a time, so with `Encoding::Auto` the Latin-1
/// fallback applies per line rather than to the whole input.
pub fn stream_reader<R, F>(
    mut reader: R,
    encoding: Encoding,
    origin: &Path,
    mut on_statement: F,
) -> DumpResult<StreamSummary>
where
    R: BufRead,
    F: FnMut(String),
{
    let mut splitter = StreamSplitter::new();
    let mut line = Vec::new();
    let mut count = 0;

    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| DumpError::read(origin, e))?;
        if n == 0 {
            break;
        }

        let text = decode(std::mem::take(&mut line), encoding, origin)?;
        for stmt in splitter.feed(&text) {
            on_statement(stmt);
            count += 1;
        }
    }

    if let Some(stmt) = splitter.finish() {
        on_statement(stmt);
        count += 1;
    }

    Ok(StreamSummary {
        statements: count,
        open_quote: splitter.open_quote(),
    })
}

/// Statements split out of one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDump {
    /// Display name of the input.
    pub name: String,
    pub statements: Vec<String>,
    /// Quote left open at end of input, if any.
    pub open_quote: Option<Quote>,
}

/// Read and split one input. `-` streams from stdin.
pub fn split_path(path: &Path, encoding: Encoding) -> DumpResult<SplitDump> {
    if path == Path::new("-") {
        let stdin = io::stdin();
        let mut statements = Vec::new();
        let summary = stream_reader(stdin.lock(), encoding, path, |s| statements.push(s))?;
        return Ok(SplitDump {
            name: "<stdin>".to_string(),
            statements,
            open_quote: summary.open_quote,
        });
    }

    let text = read_path(path, encoding)?;
    let mut iter = statements(&text);
    let statements: Vec<String> = iter.by_ref().map(str::to_string).collect();
    debug!(path = %path.display(), statements = statements.len(), "split dump");

    Ok(SplitDump {
        name: path.display().to_string(),
        statements,
        open_quote: iter.open_quote(),
    })
}

/// Split every input on the blocking pool, returned in argument order.
pub async fn split_all(paths: &[PathBuf], encoding: Encoding) -> DumpResult<Vec<SplitDump>> {
    let handles: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| tokio::task::spawn_blocking(move || split_path(&path, encoding)))
        .collect();

    let mut dumps = Vec::with_capacity(handles.len());
    for handle in handles {
        dumps.push(handle.await.map_err(|e| DumpError::Io(io::Error::other(e)))??);
    }
    Ok(dumps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn origin() -> &'static Path {
        Path::new("<test>")
    }

    #[test]
    fn test_parse_encoding_names() {
        assert_eq!("auto".parse::<Encoding>().unwrap(), Encoding::Auto);
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("utf8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("ISO-8859-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert!(matches!(
            "cp1252".parse::<Encoding>(),
            Err(DumpError::UnknownEncoding(name)) if name == "cp1252"
        ));
    }

    #[test]
    fn test_auto_prefers_utf8() {
        let text = decode("café".as_bytes().to_vec(), Encoding::Auto, origin()).unwrap();
        assert_eq!(text, "café");
    }

    #[test]
    fn test_auto_falls_back_to_latin1() {
        // "café" in Latin-1
        let bytes = vec![b'c', b'a', b'f', 0xE9];
        let text = decode(bytes, Encoding::Auto, origin()).unwrap();
        assert_eq!(text, "café");
    }

    #[test]
    fn test_strict_utf8_rejects_latin1() {
        let err = decode(vec![0xE9], Encoding::Utf8, origin()).unwrap_err();
        assert!(matches!(err, DumpError::Decode { .. }));
    }

    #[test]
    fn test_latin1_never_fails() {
        let text = decode(vec![0x00, 0x7F, 0x80, 0xFF], Encoding::Latin1, origin()).unwrap();
        assert_eq!(text.chars().count(), 4);
        assert_eq!(text.chars().last(), Some('ÿ'));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_path("/definitely/not/here.sql", Encoding::Auto).unwrap_err();
        assert!(matches!(err, DumpError::NotFound { .. }));
    }

    #[test]
    fn test_split_path_reads_latin1_file() {
        let path = std::env::temp_dir().join(format!("dumpsplit-{}-latin1.sql", std::process::id()));
        let mut bytes = b"INSERT INTO t VALUES ('Jos".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"; fine');\nINSERT INTO t VALUES ('x");
        std::fs::write(&path, bytes).unwrap();

        let dump = split_path(&path, Encoding::Auto).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            dump.statements,
            vec!["INSERT INTO t VALUES ('José; fine')", "INSERT INTO t VALUES ('x"]
        );
        assert_eq!(dump.open_quote, Some(Quote::Single));
    }

    #[test]
    fn test_stream_reader_emits_in_order() {
        let dump = "INSERT INTO t VALUES ('a;\nb');\nINSERT INTO t VALUES (2);\nSELECT 3";
        let mut seen = Vec::new();
        let summary =
            stream_reader(Cursor::new(dump), Encoding::Auto, origin(), |s| seen.push(s)).unwrap();

        assert_eq!(
            seen,
            vec![
                "INSERT INTO t VALUES ('a;\nb')",
                "INSERT INTO t VALUES (2)",
                "SELECT 3",
            ]
        );
        assert_eq!(summary.statements, 3);
        assert_eq!(summary.open_quote, None);
    }

    #[test]
    fn test_stream_reader_reports_open_quote() {
        let mut seen = Vec::new();
        let summary = stream_reader(
            Cursor::new("SELECT `x;\n"),
            Encoding::Utf8,
            origin(),
            |s| seen.push(s),
        )
        .unwrap();
        assert_eq!(seen, vec!["SELECT `x;"]);
        assert_eq!(summary.open_quote, Some(Quote::Backtick));
    }

    #[test]
    fn test_stream_reader_decodes_per_line() {
        let mut bytes = b"SELECT 'caf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"';\n");
        let mut seen = Vec::new();
        stream_reader(Cursor::new(bytes), Encoding::Auto, origin(), |s| seen.push(s)).unwrap();
        assert_eq!(seen, vec!["SELECT 'café'"]);
    }

    #[tokio::test]
    async fn test_split_all_keeps_argument_order() {
        let dir = std::env::temp_dir();
        let paths: Vec<PathBuf> = (0..4)
            .map(|i| dir.join(format!("dumpsplit-{}-order-{}.sql", std::process::id(), i)))
            .collect();
        for (i, path) in paths.iter().enumerate() {
            std::fs::write(path, format!("SELECT {};\nSELECT {}0;", i, i)).unwrap();
        }

        let dumps = split_all(&paths, Encoding::Auto).await.unwrap();
        for path in &paths {
            std::fs::remove_file(path).unwrap();
        }

        let flat: Vec<&str> = dumps
            .iter()
            .flat_map(|d| d.statements.iter().map(String::as_str))
            .collect();
        assert_eq!(
            flat,
            vec!["SELECT 0", "SELECT 00", "SELECT 1", "SELECT 10", "SELECT 2", "SELECT 20", "SELECT 3", "SELECT 30"]
        );
        assert_eq!(dumps[2].name, paths[2].display().to_string());
    }

    #[tokio::test]
    async fn test_split_all_fails_on_missing_input() {
        let paths = vec![PathBuf::from("/definitely/not/here.sql")];
        let err = split_all(&paths, Encoding::Auto).await.unwrap_err();
        assert!(matches!(err, DumpError::NotFound { .. }));
    }
}
