//! dumpsplit — The SQL dump splitter CLI
//!
//! # Usage
//!
//! ```bash
//! # Print every statement
//! dumpsplit dump.sql
//!
//! # Write statements to a file
//! dumpsplit dump.sql --output statements.sql
//!
//! # Sanity-check a dump
//! dumpsplit dump.sql --validate --verbose
//! ```

use std::io;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use dumpsplit::prelude::*;
use dumpsplit::sink;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dumpsplit")]
#[command(version)]
#[command(about = "Split SQL dump files into statements, respecting quoted semicolons", long_about = None)]
#[command(after_help = "EXAMPLES:
    dumpsplit dump.sql
    dumpsplit dump.sql --output statements.sql
    dumpsplit dump.sql --count-only
    dumpsplit dump.sql --validate --verbose
    mysqldump shop | dumpsplit - --count-only")]
struct Cli {
    /// SQL dump files to parse ("-" reads stdin)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output file for statements
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only show count of statements
    #[arg(long)]
    count_only: bool,

    /// Show validation analysis
    #[arg(long)]
    validate: bool,

    /// Print the validation report as JSON
    #[arg(long, requires = "validate")]
    json: bool,

    /// Show detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Input encoding: auto, utf8, or latin1
    #[arg(short, long, env = "DUMPSPLIT_ENCODING")]
    encoding: Option<Encoding>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "dumpsplit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let encoding = cli.encoding.unwrap_or(config.input.encoding);

    let dumps = split_all(&cli.files, encoding).await?;
    for dump in &dumps {
        if let Some(quote) = dump.open_quote {
            warn!(
                source = %dump.name,
                %quote,
                "input ends inside an unterminated quote; the last statement holds the rest of the file"
            );
        }
    }

    let statements: Vec<&str> = dumps
        .iter()
        .flat_map(|d| d.statements.iter().map(String::as_str))
        .collect();

    if cli.count_only {
        sink::write_count(&mut io::stdout().lock(), statements.len())?;
        return Ok(());
    }

    if cli.validate {
        return validate(cli, &config, &dumps);
    }

    if let Some(path) = &cli.output {
        sink::write_to_path(path, &statements, config.output.statement_headers)?;
        sink::write_saved(&mut io::stdout().lock(), statements.len(), path)?;
        return Ok(());
    }

    sink::write_stdout(&statements, cli.verbose)?;
    Ok(())
}

fn validate(cli: &Cli, config: &Config, dumps: &[SplitDump]) -> anyhow::Result<()> {
    let reports: Vec<Report> = dumps
        .iter()
        .map(|d| {
            Report::build(
                d.name.clone(),
                &d.statements,
                d.open_quote,
                config.report.preview_chars,
            )
        })
        .collect();

    let mut out = io::stdout().lock();
    if cli.json {
        write_json(&mut out, &reports)?;
        return Ok(());
    }

    for report in &reports {
        write_report(&mut out, report, cli.verbose, config.report.detail_limit)?;
    }
    Ok(())
}
