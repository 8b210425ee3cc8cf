//! booklend-form - View, edit and print member loan forms.
//!
//! A form row shows what was written on the member's paper form when one
//! has been stored, and what the ledger says otherwise.
//!
//! # Usage
//!
//! ```bash
//! booklend-form show "Ali bin Abu" SN1
//! booklend-form set "Ali bin Abu" SN1 serial SN1-0042
//! booklend-form print "Ali bin Abu"
//! booklend-form print --year 2 --class Bestari
//! ```

use crate::cmd::common::{self, GlobalArgs};
use crate::cmd::completions::ShellType;
use crate::report;
use anyhow::{bail, Context, Result};
use booklend_core::FormField;
use booklend_store::{Persistence, Store};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::process::ExitCode;

/// View and edit loan forms.
#[derive(Parser, Debug)]
#[command(name = "booklend-form")]
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

/// Form subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show one form row
    Show {
        /// Member id or name
        member: String,
        /// Book id or code
        book: String,
    },
    /// Write one field of a form row
    Set {
        /// Member id or name
        member: String,
        /// Book id or code
        book: String,
        /// serial, received, returned or status
        field: FormField,
        /// New value (empty clears the field)
        value: String,
    },
    /// Print loan forms
    Print {
        /// Member id or name
        #[arg(required_unless_present = "year")]
        member: Option<String>,
        /// Print every student in this year
        #[arg(long, conflicts_with = "member")]
        year: Option<u8>,
        /// With --year, only this class
        #[arg(long, requires = "year")]
        class: Option<String>,
    },
}

/// Main entry point for the form command.
pub fn main() -> ExitCode {
    main_with_name("booklend-form")
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

fn resolve<P: Persistence>(store: &Store<P>, member: &str, book: &str) -> Result<(String, String)> {
    let member_id = store
        .find_member(member)
        .map(|m| m.id.clone())
        .with_context(|| format!("no member with id or name {member}"))?;
    let book_id = store
        .find_book(book)
        .map(|b| b.id.clone())
        .with_context(|| format!("no book with id or code {book}"))?;
    Ok((member_id, book_id))
}

fn print_member<P: Persistence, W: Write>(store: &Store<P>, member_id: &str, out: &mut W) -> Result<()> {
    let member = store
        .member(member_id)
        .with_context(|| format!("no member with id {member_id}"))?;
    let rows = store.form_rows(member_id)?;
    report::write_form(out, store.settings(), member, &rows)?;
    Ok(())
}

/// Run a form command against a store.
pub fn run<P: Persistence, W: Write>(
    command: &Command,
    store: &mut Store<P>,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Show { member, book } => {
            let (member_id, book_id) = resolve(store, member, book)?;
            let entry = store.form_snapshot(&member_id, &book_id)?;
            let stored = store.forms().get(&member_id, &book_id).is_some();
            writeln!(out, "serial:       {}", entry.serial)?;
            writeln!(out, "receivedDate: {}", entry.received_date)?;
            writeln!(out, "returnDate:   {}", entry.return_date)?;
            writeln!(out, "status:       {}", entry.status)?;
            writeln!(out, "source:       {}", if stored { "form" } else { "ledger" })?;
        }
        Command::Set {
            member,
            book,
            field,
            value,
        } => {
            let (member_id, book_id) = resolve(store, member, book)?;
            let entry = store.set_form_field(&member_id, &book_id, *field, value)?;
            writeln!(out, "{field} = {}", entry.field(*field))?;
        }
        Command::Print {
            member: Some(member),
            ..
        } => {
            let member_id = store
                .find_member(member)
                .map(|m| m.id.clone())
                .with_context(|| format!("no member with id or name {member}"))?;
            print_member(store, &member_id, out)?;
        }
        Command::Print {
            member: None,
            year: Some(year),
            class,
        } => {
            let class = class.as_deref().map(|c| c.trim().to_uppercase());
            let ids: Vec<String> = store
                .members()
                .iter()
                .filter(|m| m.is_student() && m.year == Some(*year))
                .filter(|m| class.is_none() || m.class_name == class)
                .map(|m| m.id.clone())
                .collect();
            if ids.is_empty() {
                bail!("no students in year {year}");
            }
            for (i, id) in ids.iter().enumerate() {
                if i > 0 {
                    // Form feed between forms for printing.
                    writeln!(out, "\x0c")?;
                }
                print_member(store, id, out)?;
            }
        }
        Command::Print { .. } => bail!("give a member or --year"),
    }
    Ok(())
}
