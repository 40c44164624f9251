//! Configuration file support.
//!
//! Looked up at `<config dir>/dumpsplit/config.toml` unless a path is given.
//! Every field has a default, so a missing file is the same as an empty one.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DumpError, DumpResult};
use crate::source::Encoding;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Encoding used when `--encoding` is not given.
    #[serde(default)]
    pub encoding: Encoding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Statements shown in detail by `--validate --verbose`.
    #[serde(default = "default_detail_limit")]
    pub detail_limit: usize,

    /// Characters kept in statement previews.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Prefix each statement in `--output` files with `-- Statement N`.
    #[serde(default = "default_true")]
    pub statement_headers: bool,
}

fn default_detail_limit() -> usize {
    10
}

fn default_preview_chars() -> usize {
    100
}

fn default_true() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            detail_limit: default_detail_limit(),
            preview_chars: default_preview_chars(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            statement_headers: default_true(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> DumpResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Config::default()),
            },
        };

        debug!(path = %path.display(), "loading config");
        let content = fs::read_to_string(&path).map_err(|e| {
            DumpError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> DumpResult<Self> {
        toml::from_str(content)
            .map_err(|e| DumpError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dumpsplit").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.encoding, Encoding::Auto);
        assert_eq!(config.report.detail_limit, 10);
        assert_eq!(config.report.preview_chars, 100);
        assert!(config.output.statement_headers);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_toml_config() {
        let toml_str = r#"
[input]
encoding = "latin1"

[report]
detail_limit = 25

[output]
statement_headers = false
"#;

        let config = Config::parse(toml_str).unwrap();
        assert_eq!(config.input.encoding, Encoding::Latin1);
        assert_eq!(config.report.detail_limit, 25);
        assert_eq!(config.report.preview_chars, 100);
        assert!(!config.output.statement_headers);
    }

    #[test]
    fn test_encoding_aliases() {
        let config = Config::parse("[input]\nencoding = \"utf-8\"").unwrap();
        assert_eq!(config.input.encoding, Encoding::Utf8);
    }

    #[test]
    fn test_invalid_config() {
        let err = Config::parse("[input]\nencoding = \"ebcdic\"").unwrap_err();
        assert!(matches!(err, DumpError::Config(_)));
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, DumpError::Config(_)));
    }
}
