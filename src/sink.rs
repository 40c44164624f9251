//! Writing split statements back out.
//!
//! Every statement is written with its `;` restored, so the output replays
//! as a script.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use colored::*;
use tracing::debug;

use crate::error::{DumpError, DumpResult};

/// Script-file layout: optional `-- Statement N` header, then `stmt;` and a
/// blank line.
pub fn write_file_format<W, S>(out: &mut W, statements: &[S], headers: bool) -> io::Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    for (i, stmt) in statements.iter().enumerate() {
        if headers {
            writeln!(out, "-- Statement {}", i + 1)?;
        }
        write!(out, "{};\n\n", stmt.as_ref())?;
    }
    Ok(())
}

/// Terminal layout: statement, `;` on its own line, blank line.
pub fn write_stdout_format<W, S>(out: &mut W, statements: &[S], verbose: bool) -> io::Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    for (i, stmt) in statements.iter().enumerate() {
        let stmt = stmt.as_ref();
        if verbose {
            writeln!(out, "-- Statement {}", i + 1)?;
        }
        writeln!(out, "{}", stmt)?;
        if !stmt.ends_with(';') {
            writeln!(out, ";")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write statements to `path` in the script-file layout.
pub fn write_to_path<S: AsRef<str>>(
    path: impl AsRef<Path>,
    statements: &[S],
    headers: bool,
) -> DumpResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| DumpError::write(path, e))?;
    let mut out = BufWriter::new(file);

    write_file_format(&mut out, statements, headers).map_err(|e| DumpError::write(path, e))?;
    out.flush().map_err(|e| DumpError::write(path, e))?;

    debug!(path = %path.display(), statements = statements.len(), "wrote statements");
    Ok(())
}

/// Print statements to stdout in the terminal layout.
pub fn write_stdout<S: AsRef<str>>(statements: &[S], verbose: bool) -> DumpResult<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_stdout_format(&mut out, statements, verbose)?;
    out.flush()?;
    Ok(())
}

/// The `--count-only` line.
pub fn write_count<W: Write>(out: &mut W, count: usize) -> DumpResult<()> {
    writeln!(out, "Found {} SQL statements", count)?;
    Ok(())
}

/// Confirmation after [`write_to_path`].
pub fn write_saved<W: Write>(out: &mut W, count: usize, path: &Path) -> DumpResult<()> {
    writeln!(
        out,
        "Wrote {} statements to {}",
        count,
        path.display().to_string().cyan()
    )?;
    Ok(())
}
