//! booklend-admin - Backup, restore and school settings.
//!
//! # Usage
//!
//! ```bash
//! booklend-admin backup -o booklend-backup.json
//! booklend-admin restore booklend-backup.json
//! booklend-admin settings show
//! booklend-admin settings set --school-name "SK Taman Melati" --session 2026/2027
//! ```

use crate::cmd::common::{self, GlobalArgs};
use crate::cmd::completions::ShellType;
use anyhow::{Context, Result};
use booklend_store::{Persistence, Store};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Back up, restore and configure the loan records.
#[derive(Parser, Debug)]
#[command(name = "booklend-admin")]
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

/// Admin subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a JSON backup of books, members, classes, ledger and forms
    Backup {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all records with a backup (settings are kept)
    Restore {
        /// Backup file
        file: PathBuf,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show or change school settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

/// Settings subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingsCommand {
    /// Print the current settings
    Show,
    /// Change one or more settings
    Set {
        /// School name
        #[arg(long)]
        school_name: Option<String>,
        /// School code
        #[arg(long)]
        school_code: Option<String>,
        /// Session label, e.g. 2026/2027
        #[arg(long)]
        session: Option<String>,
        /// Teacher in charge of the loan scheme
        #[arg(long)]
        officer: Option<String>,
    },
}

/// Main entry point for the admin command.
pub fn main() -> ExitCode {
    main_with_name("booklend-admin")
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

/// Run an admin command against a store.
pub fn run<P: Persistence, W: Write>(
    command: &Command,
    store: &mut Store<P>,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Backup { output } => {
            let json = store.export_backup().to_json()?;
            match output {
                Some(path) => {
                    fs::write(path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    writeln!(out, "Backup written to {}", path.display())?;
                }
                None => writeln!(out, "{json}")?,
            }
        }
        Command::Restore { file, yes } => {
            let json = fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            if common::confirm("Replace every record with this backup?", *yes)? {
                store
                    .restore_json(&json)
                    .with_context(|| format!("failed to restore {}", file.display()))?;
                writeln!(
                    out,
                    "Restored {} books, {} members, {} records",
                    store.books().len(),
                    store.members().len(),
                    store.ledger().len()
                )?;
            } else {
                writeln!(out, "Cancelled")?;
            }
        }
        Command::Settings(SettingsCommand::Show) => {
            let settings = store.settings();
            writeln!(out, "schoolName:  {}", settings.school_name)?;
            writeln!(out, "schoolCode:  {}", settings.school_code)?;
            writeln!(out, "session:     {}", settings.session)?;
            writeln!(out, "officerName: {}", settings.officer_name)?;
        }
        Command::Settings(SettingsCommand::Set {
            school_name,
            school_code,
            session,
            officer,
        }) => {
            let mut settings = store.settings().clone();
            let edits = [
                (&mut settings.school_name, school_name),
                (&mut settings.school_code, school_code),
                (&mut settings.session, session),
                (&mut settings.officer_name, officer),
            ];
            let mut changed = false;
            for (field, value) in edits {
                if let Some(value) = value {
                    value.trim().clone_into(field);
                    changed = true;
                }
            }
            if changed {
                store.update_settings(settings);
                writeln!(out, "Settings saved")?;
            } else {
                writeln!(out, "Nothing to change")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use booklend_core::MemberDraft;
    use booklend_store::MemoryPersistence;

    fn exec(store: &mut Store<MemoryPersistence>, command: Command) -> String {
        let mut out = Vec::new();
        run(&command, store, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from([
            "booklend-admin",
            "settings",
            "set",
            "--school-name",
            "SK Melati",
        ]);
        assert_eq!(
            args.command,
            Some(Command::Settings(SettingsCommand::Set {
                school_name: Some("SK Melati".to_string()),
                school_code: None,
                session: None,
                officer: None,
            }))
        );
    }

    #[test]
    fn test_settings() {
        let mut store = Store::open(MemoryPersistence::new());
        let text = exec(
            &mut store,
            Command::Settings(SettingsCommand::Set {
                school_name: Some(" SK Melati ".to_string()),
                school_code: None,
                session: Some("2026/2027".to_string()),
                officer: None,
            }),
        );
        assert_eq!(text, "Settings saved\n");
        assert_eq!(store.settings().school_name, "SK Melati");

        let text = exec(&mut store, Command::Settings(SettingsCommand::Show));
        assert!(text.contains("session:     2026/2027"));
    }

    #[test]
    fn test_backup_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");

        let mut source = Store::open(MemoryPersistence::new());
        source
            .add_member(MemberDraft::student("Ali", 2, Some("Bestari")))
            .unwrap();
        exec(
            &mut source,
            Command::Backup {
                output: Some(path.clone()),
            },
        );

        let mut target = Store::open(MemoryPersistence::with_values([("books", "[]")]));
        let text = exec(
            &mut target,
            Command::Restore {
                file: path,
                yes: true,
            },
        );
        assert!(text.contains("1 members"));
        assert_eq!(target.books().len(), source.books().len());
        assert!(target.member_by_name("ali").is_some());
    }

    #[test]
    fn test_restore_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        fs::write(&path, "{\"hello\": 1}").unwrap();
        let mut store = Store::open(MemoryPersistence::new());
        let before = store.books().len();
        let err = run(
            &Command::Restore {
                file: path,
                yes: true,
            },
            &mut store,
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("failed to restore"));
        assert_eq!(store.books().len(), before);
    }
}
