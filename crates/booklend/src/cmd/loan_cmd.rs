//! booklend-loan - Borrow, return and damage actions on the loan ledger.
//!
//! # Usage
//!
//! ```bash
//! booklend-loan borrow SN1 "Ali bin Abu"
//! booklend-loan return SN1 "Ali bin Abu"
//! booklend-loan damaged SN1 "Ali bin Abu"
//! booklend-loan resolve T1767225600000 replacement
//! booklend-loan active "Ali bin Abu"
//! ```

use crate::cmd::common::{self, GlobalArgs};
use crate::cmd::completions::ShellType;
use crate::report;
use anyhow::{Context, Result};
use booklend_core::{LoanAction, MemberType, ResolutionMethod};
use booklend_store::{LoanRequest, Persistence, Store};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::process::ExitCode;

/// Record loans, returns and damage, and settle fines.
#[derive(Parser, Debug)]
#[command(name = "booklend-loan")]
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

/// Who a loan action is for.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Book id or code
    pub book: String,

    /// Member id or name; unknown names are recorded as typed
    pub name: String,

    /// Number of copies. A return closes a whole borrow record, so record
    /// partial returns one copy at a time
    #[arg(short = 'n', long, default_value = "1")]
    pub quantity: u32,

    /// Record an unknown name as a teacher
    #[arg(long)]
    pub teacher: bool,
}

/// Loan subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Lend copies of a book
    Borrow(Target),
    /// Take copies back in good condition
    Return(Target),
    /// Take copies back damaged or report them lost; a fine is raised
    Damaged(Target),
    /// Settle a damage fine
    Resolve {
        /// Transaction id of the damage record
        transaction: String,
        /// cash or replacement
        method: ResolutionMethod,
    },
    /// Show the loans a member still holds
    Active {
        /// Member id or name
        name: String,
    },
    /// Show the ledger, most recent first
    Log {
        /// Only records for this name
        #[arg(long)]
        name: Option<String>,
        /// Show at most this many records
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Erase the whole ledger (stock counts are kept)
    ResetLog {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Main entry point for the loan command.
pub fn main() -> ExitCode {
    main_with_name("booklend-loan")
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

fn request<P: Persistence>(
    store: &Store<P>,
    action: LoanAction,
    target: &Target,
) -> Result<LoanRequest> {
    let book = store
        .find_book(&target.book)
        .with_context(|| format!("no book with id or code {}", target.book))?;
    let request = match store.find_member(&target.name) {
        Some(member) => LoanRequest::for_member(&book.id, action, member),
        None => {
            let user_type = if target.teacher {
                MemberType::Teacher
            } else {
                MemberType::Student
            };
            tracing::debug!(name = %target.name, "name is not on the roster");
            LoanRequest::new(&book.id, action, &target.name, user_type)
        }
    };
    Ok(request.quantity(target.quantity))
}

/// Run a loan command against a store.
pub fn run<P: Persistence, W: Write>(
    command: &Command,
    store: &mut Store<P>,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Borrow(target) | Command::Return(target) | Command::Damaged(target) => {
            let action = match command {
                Command::Borrow(_) => LoanAction::Borrow,
                Command::Return(_) => LoanAction::Return,
                _ => LoanAction::ReturnDamaged,
            };
            let request = request(store, action, target)?;
            let tx = store.apply_action(request)?;
            let stock = store.book(&tx.book_id).map_or(0, |b| b.stock);
            writeln!(
                out,
                "{} {} x{} {} ({stock} left)",
                tx.id, tx.action, tx.quantity, tx.book_title
            )?;
            if tx.is_damage() {
                writeln!(out, "Fine raised: {}", report::money(tx.fine_amount))?;
            }
        }
        Command::Resolve {
            transaction,
            method,
        } => {
            let tx = store.resolve_damage(transaction, *method)?;
            writeln!(
                out,
                "{} settled by {method} ({})",
                tx.id,
                report::money(tx.reported_fine())
            )?;
        }
        Command::Active { name } => {
            let name = store
                .find_member(name)
                .map_or_else(|| name.clone(), |m| m.name.clone());
            let loans = store.active_loans(&name);
            if loans.is_empty() {
                writeln!(out, "{name} holds no books")?;
            } else {
                report::write_log(out, loans)?;
            }
        }
        Command::Log { name, limit } => {
            let limit = limit.unwrap_or(usize::MAX);
            match name {
                Some(name) => {
                    report::write_log(out, store.ledger().for_user(name).take(limit))?;
                }
                None => report::write_log(out, store.ledger().entries().iter().take(limit))?,
            }
        }
        Command::ResetLog { yes } => {
            if common::confirm("Erase every ledger record?", *yes)? {
                let count = store.reset_transactions();
                writeln!(out, "Removed {count} records")?;
            } else {
                writeln!(out, "Cancelled")?;
            }
        }
    }
    Ok(())
}
