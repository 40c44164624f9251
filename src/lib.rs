//! # dumpsplit — SQL dump statement splitter
//!
//! > **Split on semicolons. Not the ones in your data.**
//!
//! Turns the text of a mysqldump-style export into its individual
//! statements. Semicolons inside quoted regions never end a statement.
//!
//! ## Quick Example
//!
//! ```rust
//! let stmts = dumpsplit::split(r"INSERT INTO notes VALUES ('a;b'); UPDATE t SET n = 'O\'Brien';");
//! assert_eq!(stmts.len(), 2);
//! assert_eq!(stmts[1], r"UPDATE t SET n = 'O\'Brien'");
//! ```
//!
//! ## Quoting rules
//!
//! | Character | Opens       | Inside the region                  |
//! |-----------|-------------|------------------------------------|
//! | `'`       | string      | `\'` and `\\` are escape pairs     |
//! | `"`       | string      | `\"` and `\\` are escape pairs     |
//! | `` ` ``   | identifier  | `` \` `` and `\\` are escape pairs |
//!
//! Other quote characters inside a region are plain text. An unterminated
//! quote swallows the rest of the input into the last statement.

pub mod config;
pub mod error;
pub mod report;
pub mod sink;
pub mod source;
pub mod splitter;

pub use splitter::{split, statements, Quote, Statements, StreamSplitter};

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::*;
    pub use crate::report::{write_json, write_report, Report, StatementKind, StatementReport, Summary};
    pub use crate::source::{split_all, split_path, Encoding, SplitDump};
    pub use crate::splitter::{split, statements, Quote, Statements, StreamSplitter};
}
