//! Diagnostics over split statements.
//!
//! Nothing here feeds back into splitting. The report exists so a user can
//! sanity-check a dump: a statement containing `;` or an odd number of
//! quotes usually means the input was truncated or mis-encoded.

use std::borrow::Cow;
use std::io::Write;

use chrono::{DateTime, Utc};
use colored::*;
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{multispace0, satisfy},
    combinator::{not, value},
    sequence::{preceded, terminated},
    IResult,
};
use serde::Serialize;

use crate::error::DumpResult;
use crate::splitter::Quote;

/// Leading keyword of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Insert,
    Replace,
    Update,
    Delete,
    Select,
    Create,
    Alter,
    Drop,
    Set,
    Use,
    Lock,
    Unlock,
    Other,
}

impl StatementKind {
    /// Classify a statement by its first word.
    pub fn of(statement: &str) -> Self {
        match parse_kind(statement) {
            Ok((_, kind)) => kind,
            Err(_) => StatementKind::Other,
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatementKind::Insert => "INSERT",
            StatementKind::Replace => "REPLACE",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Select => "SELECT",
            StatementKind::Create => "CREATE",
            StatementKind::Alter => "ALTER",
            StatementKind::Drop => "DROP",
            StatementKind::Set => "SET",
            StatementKind::Use => "USE",
            StatementKind::Lock => "LOCK",
            StatementKind::Unlock => "UNLOCK",
            StatementKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Parse the leading keyword as a whole word.
fn parse_kind(input: &str) -> IResult<&str, StatementKind> {
    let keyword = alt((
        value(StatementKind::Insert, tag_no_case("insert")),
        value(StatementKind::Replace, tag_no_case("replace")),
        value(StatementKind::Update, tag_no_case("update")),
        value(StatementKind::Delete, tag_no_case("delete")),
        value(StatementKind::Select, tag_no_case("select")),
        value(StatementKind::Create, tag_no_case("create")),
        value(StatementKind::Alter, tag_no_case("alter")),
        value(StatementKind::Drop, tag_no_case("drop")),
        value(StatementKind::Set, tag_no_case("set")),
        value(StatementKind::Use, tag_no_case("use")),
        value(StatementKind::Lock, tag_no_case("lock")),
        value(StatementKind::Unlock, tag_no_case("unlock")),
    ));
    let word_end = not(satisfy(|c: char| c.is_alphanumeric() || c == '_'));

    preceded(multispace0, terminated(keyword, word_end))(input)
}

/// Prefix check for INSERT / UPDATE / REPLACE, no word boundary required.
fn starts_with_upsert(input: &str) -> bool {
    let prefix: IResult<&str, &str> = preceded(
        multispace0,
        alt((
            tag_no_case("insert"),
            tag_no_case("update"),
            tag_no_case("replace"),
        )),
    )(input);
    prefix.is_ok()
}

/// Shorten `statement` to `max_chars` characters, marking the cut with `...`.
pub fn preview(statement: &str, max_chars: usize) -> Cow<'_, str> {
    match statement.char_indices().nth(max_chars) {
        Some((cut, _)) => Cow::Owned(format!("{}...", &statement[..cut])),
        None => Cow::Borrowed(statement),
    }
}

/// Diagnostics for a single statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementReport {
    /// 1-based position in the dump.
    pub index: usize,
    /// Length in characters.
    pub length: usize,
    pub is_empty: bool,
    pub kind: StatementKind,
    pub starts_with_upsert: bool,
    pub has_semicolon: bool,
    pub quote_count_single: usize,
    pub quote_count_double: usize,
    pub quote_count_backtick: usize,
    pub preview: String,
}

impl StatementReport {
    pub fn analyze(index: usize, statement: &str, preview_chars: usize) -> Self {
        let count = |needle: char| statement.chars().filter(|&c| c == needle).count();

        Self {
            index,
            length: statement.chars().count(),
            is_empty: statement.trim().is_empty(),
            kind: StatementKind::of(statement),
            starts_with_upsert: starts_with_upsert(statement),
            has_semicolon: statement.contains(';'),
            quote_count_single: count('\''),
            quote_count_double: count('"'),
            quote_count_backtick: count('`'),
            preview: preview(statement, preview_chars).into_owned(),
        }
    }
}

/// Aggregate counts over a dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub empty: usize,
    pub upsert: usize,
    pub with_semicolon: usize,
    /// Quote character the dump ended inside of, if any.
    pub open_quote: Option<char>,
}

impl Summary {
    pub fn from_reports(reports: &[StatementReport], open_quote: Option<Quote>) -> Self {
        Self {
            total: reports.len(),
            empty: reports.iter().filter(|r| r.is_empty).count(),
            upsert: reports.iter().filter(|r| r.starts_with_upsert).count(),
            with_semicolon: reports.iter().filter(|r| r.has_semicolon).count(),
            open_quote: open_quote.map(Quote::as_char),
        }
    }
}

/// Full validation report for one dump.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub statements: Vec<StatementReport>,
}

impl Report {
    pub fn build<S: AsRef<str>>(
        source: impl Into<String>,
        statements: &[S],
        open_quote: Option<Quote>,
        preview_chars: usize,
    ) -> Self {
        let statements: Vec<StatementReport> = statements
            .iter()
            .enumerate()
            .map(|(i, s)| StatementReport::analyze(i + 1, s.as_ref(), preview_chars))
            .collect();

        Self {
            source: source.into(),
            generated_at: Utc::now(),
            summary: Summary::from_reports(&statements, open_quote),
            statements,
        }
    }
}

/// Write the human-readable validation block for one report.
///
/// With `verbose`, at most `detail_limit` statements are detailed and the
/// rest are summed up in a trailing line.
pub fn write_report<W: Write>(
    out: &mut W,
    report: &Report,
    verbose: bool,
    detail_limit: usize,
) -> DumpResult<()> {
    let summary = &report.summary;

    writeln!(
        out,
        "{} {}",
        format!("Validation Results for {} statements:", summary.total)
            .green()
            .bold(),
        report.source.dimmed()
    )?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "Total statements: {}", summary.total)?;
    writeln!(out, "Empty statements: {}", summary.empty)?;
    writeln!(out, "Upsert statements: {}", summary.upsert)?;
    writeln!(out, "Statements with semicolons: {}", summary.with_semicolon)?;
    if let Some(quote) = summary.open_quote {
        writeln!(
            out,
            "{}",
            format!("⚠ Input ends inside an unterminated {} quote", quote).yellow()
        )?;
    }
    writeln!(out)?;

    if !verbose {
        return Ok(());
    }

    writeln!(out, "{}", "Detailed Analysis:".cyan().bold())?;
    writeln!(out, "{}", "-".repeat(60).dimmed())?;
    for stmt in report.statements.iter().take(detail_limit) {
        writeln!(out, "{}", format!("Statement {}:", stmt.index).white().bold())?;
        writeln!(out, "  {} {} chars", "Length:".dimmed(), stmt.length)?;
        writeln!(out, "  {} {}", "Kind:".dimmed(), stmt.kind.to_string().cyan())?;
        writeln!(out, "  {} {}", "Empty:".dimmed(), stmt.is_empty)?;
        writeln!(out, "  {} {}", "Upsert:".dimmed(), stmt.starts_with_upsert)?;
        writeln!(out, "  {} {}", "Has semicolon:".dimmed(), stmt.has_semicolon)?;
        writeln!(
            out,
            "  {} single={}, double={}, backtick={}",
            "Quotes:".dimmed(),
            stmt.quote_count_single,
            stmt.quote_count_double,
            stmt.quote_count_backtick
        )?;
        if !stmt.preview.is_empty() {
            writeln!(out, "  {} {}", "Preview:".dimmed(), stmt.preview.yellow())?;
        }
        writeln!(out)?;
    }

    if report.statements.len() > detail_limit {
        writeln!(
            out,
            "{}",
            format!(
                "... and {} more statements",
                report.statements.len() - detail_limit
            )
            .dimmed()
        )?;
    }
    Ok(())
}

/// Write reports as a pretty-printed JSON array, one element per input.
pub fn write_json<W: Write>(out: &mut W, reports: &[Report]) -> DumpResult<()> {
    serde_json::to_writer_pretty(&mut *out, reports).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}
