//! booklend-roster - Manage members, classes, imports and year-end promotion.
//!
//! # Usage
//!
//! ```bash
//! booklend-roster add "Ali bin Abu" --year 2 --class Bestari
//! booklend-roster add "Cikgu Lee" --teacher
//! booklend-roster import kelas.txt
//! booklend-roster add-class 1 Amanah
//! booklend-roster promote
//! ```

use crate::cmd::common::{self, Config, GlobalArgs};
use crate::cmd::completions::ShellType;
use crate::report;
use anyhow::{Context, Result};
use booklend_core::{MemberDraft, MemberType};
use booklend_importer::{HttpExtractor, ImportResult, RosterImporter};
use booklend_store::{Persistence, Store};
use clap::{Parser, Subcommand};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Manage the member roster and class registry.
#[derive(Parser, Debug)]
#[command(name = "booklend-roster")]
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

/// Roster subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List members
    List {
        /// Only students in this year
        #[arg(long)]
        year: Option<u8>,
        /// Only students in this class
        #[arg(long)]
        class: Option<String>,
    },
    /// Add a member
    Add {
        /// Full name
        name: String,
        /// Add as a teacher
        #[arg(long, conflicts_with_all = ["year", "class"])]
        teacher: bool,
        /// Year, 1-6
        #[arg(long, default_value = "1")]
        year: u8,
        /// Class name
        #[arg(long)]
        class: Option<String>,
    },
    /// Change a member's fields
    Update {
        /// Member id or name
        member: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New type: teacher or student
        #[arg(long = "type", value_name = "TYPE")]
        member_type: Option<MemberType>,
        /// New year
        #[arg(long)]
        year: Option<u8>,
        /// New class
        #[arg(long)]
        class: Option<String>,
    },
    /// Remove a member and their stored form entries
    Delete {
        /// Member id or name
        member: String,
    },
    /// List registered classes
    Classes,
    /// Register a class
    AddClass {
        /// Year, 1-6
        year: u8,
        /// Class name
        name: String,
    },
    /// Unregister a class (members keep their class name)
    RemoveClass {
        /// Year, 1-6
        year: u8,
        /// Class name
        name: String,
    },
    /// Import students from a class list, CSV file, image or PDF ("-" reads text from stdin)
    Import {
        /// Roster file
        file: PathBuf,
        /// Add the students without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Move every student up a year; year 6 students leave the roster
    Promote {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove every member and stored form entry
    Reset {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Main entry point for the roster command.
pub fn main() -> ExitCode {
    main_with_name("booklend-roster")
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
    match run_with_args(&args.global, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run_with_args(global: &GlobalArgs, command: &Command) -> Result<()> {
    let config = Config::load(&global.config_path()?)?;
    let mut importer = RosterImporter::new();
    if config.extractor.is_enabled() {
        importer = importer.with_extractor(HttpExtractor::new(config.extractor)?);
    }
    let mut store = common::open_store(global)?;
    run(command, &mut store, &importer, &mut io::stdout().lock())
}

fn member_id<P: Persistence>(store: &Store<P>, member: &str) -> Result<String> {
    store
        .find_member(member)
        .map(|m| m.id.clone())
        .with_context(|| format!("no member with id or name {member}"))
}

fn stage(importer: &RosterImporter, file: &Path) -> Result<ImportResult> {
    if file.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read class list from stdin")?;
        return Ok(importer.import_text(&text)?);
    }
    importer
        .import_file(file)
        .with_context(|| format!("failed to import {}", file.display()))
}

/// Run a roster command against a store.
pub fn run<P: Persistence, W: Write>(
    command: &Command,
    store: &mut Store<P>,
    importer: &RosterImporter,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::List { year, class } => {
            let class = class.as_deref().map(|c| c.trim().to_uppercase());
            let members: Vec<_> = store
                .members()
                .iter()
                .filter(|m| year.map_or(true, |y| m.year == Some(y)))
                .filter(|m| class.is_none() || m.class_name == class)
                .cloned()
                .collect();
            report::write_members(out, &members)?;
        }
        Command::Add {
            name,
            teacher,
            year,
            class,
        } => {
            let draft = if *teacher {
                MemberDraft::teacher(name.as_str())
            } else {
                MemberDraft::student(name.as_str(), *year, class.as_deref())
            };
            let member = store.add_member(draft)?;
            writeln!(out, "Added {} {member}", member.id)?;
        }
        Command::Update {
            member,
            name,
            member_type,
            year,
            class,
        } => {
            let id = member_id(store, member)?;
            let current = store
                .member(&id)
                .with_context(|| format!("no member with id {id}"))?;
            let draft = MemberDraft {
                name: name.clone().unwrap_or_else(|| current.name.clone()),
                member_type: member_type.unwrap_or(current.member_type),
                year: year.or(current.year),
                class_name: class.clone().or_else(|| current.class_name.clone()),
            };
            let updated = store.update_member(&id, draft)?;
            writeln!(out, "Updated {} {updated}", updated.id)?;
        }
        Command::Delete { member } => {
            let id = member_id(store, member)?;
            let removed = store.delete_member(&id)?;
            writeln!(out, "Deleted {} {removed}", removed.id)?;
        }
        Command::Classes => {
            for (year, names) in store.classes().iter() {
                writeln!(out, "Year {year}: {}", names.join(", "))?;
            }
        }
        Command::AddClass { year, name } => {
            let name = store.add_class(*year, name)?;
            writeln!(out, "Added class {year} {name}")?;
        }
        Command::RemoveClass { year, name } => {
            if store.remove_class(*year, name) {
                writeln!(out, "Removed class {year} {}", name.trim().to_uppercase())?;
            } else {
                anyhow::bail!("class {year} {name} is not registered");
            }
        }
        Command::Import { file, yes } => {
            let staged = stage(importer, file)?;
            for warning in &staged.warnings {
                tracing::warn!("{warning}");
            }
            for (i, row) in staged.rows.iter().enumerate() {
                writeln!(out, "{:>3}. {} ({} {})", i + 1, row.name, row.year, row.class_name)?;
            }
            out.flush()?;
            let prompt = format!("Add these {} students?", staged.rows.len());
            if common::confirm(&prompt, *yes)? {
                let summary = store.confirm_import(&staged.rows)?;
                writeln!(
                    out,
                    "Added {} students, {} new classes",
                    summary.members.len(),
                    summary.classes_added.len()
                )?;
            } else {
                writeln!(out, "Cancelled")?;
            }
        }
        Command::Promote { yes } => {
            if common::confirm("Promote every student? This cannot be undone.", *yes)? {
                let summary = store.promote();
                writeln!(out, "Promoted {} students", summary.promoted)?;
                for member in &summary.graduated {
                    writeln!(out, "Graduated {member}")?;
                }
            } else {
                writeln!(out, "Cancelled")?;
            }
        }
        Command::Reset { yes } => {
            if common::confirm("Remove every member?", *yes)? {
                let count = store.reset_all_members();
                writeln!(out, "Removed {count} members")?;
            } else {
                writeln!(out, "Cancelled")?;
            }
        }
    }
    Ok(())
}
