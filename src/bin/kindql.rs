//! kindql — the query block compiler CLI
//!
//! # Usage
//!
//! ```bash
//! # Rewrite every query block of a script
//! kindql transform PersonDao.groovy -o PersonDao.out.groovy
//!
//! # Report problems only (exit status 1 when there are any)
//! kindql check PersonDao.groovy --format json
//!
//! # Show what each query block compiles to
//! kindql explain PersonDao.groovy
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use tracing_subscriber::EnvFilter;

use kindql::config::TransformConfig;
use kindql::error::{Diagnostic, DiagnosticKind};
use kindql::transform::{TransformOutput, transform_source};

#[derive(Parser)]
#[command(name = "kindql")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiles datastore query blocks into query-builder code", long_about = None)]
#[command(after_help = "EXAMPLES:
    kindql transform PersonDao.groovy           # Print the rewritten script
    kindql check PersonDao.groovy               # Report query problems
    kindql explain PersonDao.groovy             # Show compiled queries")]
struct Cli {
    /// Configuration file (defaults to ./kindql.toml, then the user config dir)
    #[arg(short, long, global = true, env = "KINDQL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the suffix of generated variable names
    #[arg(long, global = true)]
    suffix: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite the query blocks of a script
    Transform {
        /// Script to transform
        file: PathBuf,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check query blocks without writing anything
    Check {
        /// Script to check
        file: PathBuf,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Print the compiled form of each query block
    Explain {
        /// Script to explain
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(2);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "kindql=debug" } else { "kindql=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the selected command and return the exit status.
fn run(cli: &Cli) -> Result<i32> {
    let mut config = TransformConfig::discover(cli.config.as_deref())?;
    if let Some(suffix) = &cli.suffix {
        config.suffix = suffix.clone();
    }

    match &cli.command {
        Commands::Transform { file, output } => {
            let result = transform_file(file, &config)?;
            print_diagnostics(file, &result.report.diagnostics.iter().collect::<Vec<_>>());
            match output {
                Some(path) => {
                    std::fs::write(path, &result.source)
                        .with_context(|| format!("Failed to write '{}'", path.display()))?;
                    println!(
                        "{} Rewrote {} query block(s) into {}",
                        "✓".green(),
                        result.report.queries.len(),
                        path.display().to_string().cyan()
                    );
                }
                None => print!("{}", result.source),
            }
            Ok(exit_status(&result))
        }
        Commands::Check { file, format } => {
            let result = transform_file(file, &config)?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&result.report.diagnostics)?);
                }
                OutputFormat::Text => {
                    let diagnostics: Vec<&Diagnostic> = result.report.diagnostics.iter().collect();
                    if diagnostics.is_empty() {
                        println!(
                            "{} {} query block(s), no problems",
                            "✓".green().bold(),
                            result.report.queries.len()
                        );
                    } else {
                        print_diagnostics(file, &diagnostics);
                        println!();
                        println!(
                            "{} {} problem(s) in {} query block(s)",
                            "✗".red().bold(),
                            diagnostics.len(),
                            result.report.queries.len()
                        );
                    }
                }
            }
            Ok(exit_status(&result))
        }
        Commands::Explain { file } => {
            let result = transform_file(file, &config)?;
            if result.report.queries.is_empty() {
                println!("{}", "(no query blocks)".dimmed());
            }
            for query in &result.report.queries {
                println!(
                    "{} {}.{} at {}",
                    "Query".cyan().bold(),
                    query.receiver,
                    query.method,
                    query.span.to_string().yellow()
                );
                println!("{}", serde_json::to_string_pretty(&query.spec)?);
                println!();
                println!("{}", "Generated:".green().bold());
                for line in query.code.lines() {
                    println!("  {}", line.white());
                }
                println!();
            }
            print_diagnostics(file, &result.report.diagnostics.iter().collect::<Vec<_>>());
            Ok(exit_status(&result))
        }
    }
}

fn transform_file(file: &Path, config: &TransformConfig) -> Result<TransformOutput> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;
    let output = transform_source(&source, config)
        .with_context(|| format!("Failed to transform '{}'", file.display()))?;
    Ok(output)
}

fn exit_status(result: &TransformOutput) -> i32 {
    if result.report.has_errors() { 1 } else { 0 }
}

fn print_diagnostics(file: &Path, diagnostics: &[&Diagnostic]) {
    for diagnostic in diagnostics {
        let label = match diagnostic.kind {
            DiagnosticKind::Internal => "internal error".red().bold(),
            kind => format!("{} error", kind).red(),
        };
        eprintln!(
            "{}:{}:{}: {}: {}",
            file.display(),
            diagnostic.line,
            diagnostic.column,
            label,
            diagnostic.message
        );
    }
}
