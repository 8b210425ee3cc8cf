//! booklend-report - Stock, fine and ledger reports.
//!
//! # Usage
//!
//! ```bash
//! booklend-report stock --year 1
//! booklend-report fines
//! booklend-report fines --member "Ali bin Abu"
//! booklend-report export-log -o ledger.csv
//! ```

use crate::cmd::common::{self, GlobalArgs};
use crate::cmd::completions::ShellType;
use crate::report;
use anyhow::{Context, Result};
use booklend_store::{Persistence, Store};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Print reports over the catalog and the ledger.
#[derive(Parser, Debug)]
#[command(name = "booklend-report")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    generate_completions: Option<ShellType>,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Report subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Copies on the shelf and on loan for each book
    Stock {
        /// Only books for this year
        #[arg(long)]
        year: Option<u8>,
    },
    /// Fine totals and outstanding damage records
    Fines {
        /// Only records for this member id or name
        #[arg(long)]
        member: Option<String>,
    },
    /// Write the ledger as CSV, oldest record first
    ExportLog {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Main entry point for the report command.
pub fn main() -> ExitCode {
    main_with_name("booklend-report")
}

/// Main entry point with a custom binary name.
pub fn main_with_name(bin_name: &str) -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate_completions {
        crate::cmd::completions::generate_completions::<Args>(shell, bin_name);
        return ExitCode::SUCCESS;
    }

    let Some(command) = &args.command else {
        eprintln!("error: a subcommand is required");
        eprintln!("For more information, try '--help'");
        return ExitCode::from(2);
    };

    common::init_tracing(&args.global);
    let result = common::open_store(&args.global)
        .and_then(|mut store| run(command, &mut store, &mut io::stdout().lock()));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Run a report command against a store.
pub fn run<P: Persistence, W: Write>(
    command: &Command,
    store: &mut Store<P>,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Stock { year } => {
            let lines: Vec<_> = store
                .stock_report()
                .into_iter()
                .filter(|l| year.map_or(true, |y| l.book.year == y))
                .collect();
            report::write_stock(out, &lines)?;
        }
        Command::Fines { member: None } => {
            report::write_fines(out, &store.fine_summary(), store.outstanding_fines())?;
        }
        Command::Fines {
            member: Some(member),
        } => {
            let name = store
                .find_member(member)
                .map_or_else(|| member.trim().to_uppercase(), |m| m.name.clone());
            let summary = store.member_fines(&name);
            let outstanding = store
                .outstanding_fines()
                .into_iter()
                .filter(|t| t.user_name == name);
            writeln!(out, "{name}")?;
            report::write_fines(out, &summary, outstanding)?;
        }
        Command::ExportLog { output } => {
            let entries = store.ledger().chronological();
            match output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    report::write_log_csv(BufWriter::new(file), entries.iter().copied())?;
                    tracing::info!(records = entries.len(), path = %path.display(), "ledger exported");
                    writeln!(out, "Wrote {} records to {}", entries.len(), path.display())?;
                }
                None => report::write_log_csv(&mut *out, entries.iter().copied())?,
            }
        }
    }
    Ok(())
}
