//! booklend-catalog - Manage the textbook catalog.
//!
//! # Usage
//!
//! ```bash
//! booklend-catalog list --year 1
//! booklend-catalog add "Sains Tahun 1" SN1 1 --stock 40 --price 12.50
//! booklend-catalog update SN1 --price 13.90
//! booklend-catalog delete SN1
//! ```

use crate::cmd::common::{self, GlobalArgs};
use crate::cmd::completions::ShellType;
use crate::report;
use anyhow::{Context, Result};
use booklend_core::{BookDraft, Decimal};
use booklend_store::{Persistence, Store};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::process::ExitCode;

/// Manage the book catalog.
#[derive(Parser, Debug)]
#[command(name = "booklend-catalog")]
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

/// Optional book fields.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFields {
    /// Textbook, Activity, or any other label
    #[arg(long = "type", value_name = "TYPE")]
    pub book_type: Option<String>,

    /// Subject name
    #[arg(long)]
    pub subject: Option<String>,

    /// Replacement price, charged as the fine for damaged or lost copies
    #[arg(long)]
    pub price: Option<Decimal>,
}

impl BookFields {
    fn apply(&self, mut draft: BookDraft) -> BookDraft {
        if let Some(book_type) = &self.book_type {
            draft = draft.with_type(book_type.as_str());
        }
        if let Some(subject) = &self.subject {
            draft = draft.with_subject(subject.as_str());
        }
        if let Some(price) = self.price {
            draft = draft.with_price(price);
        }
        draft
    }
}

/// Catalog subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List books
    List {
        /// Only books for this year
        #[arg(long)]
        year: Option<u8>,
    },
    /// Add a book
    Add {
        /// Title
        title: String,
        /// Catalog code
        code: String,
        /// School year, 1-6
        year: u8,
        /// Copies on the shelf; afterwards only loans and returns change it
        #[arg(long, default_value = "0")]
        stock: u32,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Change a book's fields (stock is not editable)
    Update {
        /// Book id or code
        book: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New code
        #[arg(long)]
        code: Option<String>,
        /// New year
        #[arg(long)]
        year: Option<u8>,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Remove a book (ledger history keeps its title)
    Delete {
        /// Book id or code
        book: String,
    },
}

/// Main entry point for the catalog command.
pub fn main() -> ExitCode {
    main_with_name("booklend-catalog")
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

fn book_id<P: Persistence>(store: &Store<P>, book: &str) -> Result<String> {
    store
        .find_book(book)
        .map(|b| b.id.clone())
        .with_context(|| format!("no book with id or code {book}"))
}

/// Run a catalog command against a store.
pub fn run<P: Persistence, W: Write>(
    command: &Command,
    store: &mut Store<P>,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::List { year } => {
            let books: Vec<_> = store
                .books()
                .iter()
                .filter(|b| year.map_or(true, |y| b.year == y))
                .cloned()
                .collect();
            report::write_books(out, &books)?;
        }
        Command::Add {
            title,
            code,
            year,
            stock,
            fields,
        } => {
            let draft = fields.apply(
                BookDraft::new(title.as_str(), code.as_str(), *year).with_stock(*stock),
            );
            let book = store.add_book(draft)?;
            writeln!(out, "Added {} {} ({})", book.id, book.code, book.title)?;
        }
        Command::Update {
            book,
            title,
            code,
            year,
            fields,
        } => {
            let id = book_id(store, book)?;
            let current = store
                .book(&id)
                .with_context(|| format!("no book with id {id}"))?;
            let draft = BookDraft {
                title: title.clone().unwrap_or_else(|| current.title.clone()),
                code: code.clone().unwrap_or_else(|| current.code.clone()),
                year: year.unwrap_or(current.year),
                book_type: current.book_type.clone(),
                stock: current.stock,
                subject: current.subject.clone(),
                price: current.price,
            };
            let updated = store.update_book(&id, fields.apply(draft))?;
            writeln!(out, "Updated {} {}", updated.id, updated.code)?;
        }
        Command::Delete { book } => {
            let id = book_id(store, book)?;
            let removed = store.delete_book(&id)?;
            writeln!(out, "Deleted {} {}", removed.id, removed.code)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use booklend_core::BookType;
    use booklend_store::MemoryPersistence;
    use rust_decimal_macros::dec;

    fn empty() -> Store<MemoryPersistence> {
        Store::open(MemoryPersistence::with_values([("books", "[]")]))
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from([
            "booklend-catalog",
            "add",
            "Sains",
            "SN1",
            "1",
            "--stock",
            "40",
            "--price",
            "12.50",
            "--type",
            "Activity",
        ]);
        let Some(Command::Add {
            year,
            stock,
            fields,
            ..
        }) = args.command
        else {
            panic!("expected add");
        };
        assert_eq!(year, 1);
        assert_eq!(stock, 40);
        assert_eq!(fields.price, Some(dec!(12.50)));
        assert_eq!(fields.book_type.as_deref(), Some("Activity"));
    }

    #[test]
    fn test_add_update_delete() {
        let mut store = empty();
        let add = Command::Add {
            title: "Sains".to_string(),
            code: "sn1".to_string(),
            year: 1,
            stock: 10,
            fields: BookFields::default(),
        };
        run(&add, &mut store, &mut Vec::new()).unwrap();
        assert_eq!(store.books()[0].code, "SN1");

        let update = Command::Update {
            book: "SN1".to_string(),
            title: None,
            code: None,
            year: None,
            fields: BookFields {
                book_type: Some("Activity".to_string()),
                ..BookFields::default()
            },
        };
        run(&update, &mut store, &mut Vec::new()).unwrap();
        assert_eq!(store.books()[0].stock, 10);
        assert_eq!(store.books()[0].book_type, BookType::Activity);
        assert_eq!(store.books()[0].title, "SAINS");

        run(
            &Command::Delete {
                book: "sn1".to_string(),
            },
            &mut store,
            &mut Vec::new(),
        )
        .unwrap();
        assert!(store.books().is_empty());
    }

    #[test]
    fn test_update_has_no_stock_flag() {
        assert!(Args::try_parse_from(["booklend-catalog", "update", "SN1", "--stock", "99"]).is_err());
    }

    #[test]
    fn test_list_filters_by_year() {
        let mut store = Store::open(MemoryPersistence::new());
        let mut out = Vec::new();
        run(&Command::List { year: Some(2) }, &mut store, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().skip(1).all(|l| l.contains(" 2 ")));
        assert!(text.lines().count() > 1);
    }
}
