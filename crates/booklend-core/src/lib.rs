//! Core types for booklend
//!
//! This crate holds the data model of the school textbook-loan system and
//! the rules that keep it consistent. It does no I/O; persistence lives in
//! `booklend-store`.
//!
//! - [`Book`] - A catalog title with a shared stock count
//! - [`Member`] - A teacher or student on the roster
//! - [`ClassConfig`] - Registered class names per year
//! - [`Transaction`] - An immutable ledger record
//! - [`Ledger`] - The append-only log, active-loan replay and fine totals
//! - [`PersistentForms`] - Stored loan-form entries, read over derived ones
//! - [`promote`] - Year-end promotion with graduation
//!
//! # Example
//!
//! ```
//! use booklend_core::{ledger, Book, BookDraft, Ledger, LoanAction, MemberType, Transaction};
//!
//! let mut book = Book::from_draft("B1", BookDraft::new("Sains", "SN1", 1).with_stock(2)).unwrap();
//! let mut log = Ledger::new();
//!
//! book.stock = ledger::stock_after(&book, LoanAction::Borrow, 1).unwrap();
//! log.record(Transaction::new("T1", &book, LoanAction::Borrow, ("Ali", MemberType::Student), 1, 1));
//!
//! assert_eq!(book.stock, 1);
//! assert_eq!(log.active_loans("ALI").len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod book;
pub mod catalog;
pub mod class;
pub mod error;
pub mod form;
pub mod ledger;
pub mod member;
pub mod roster;
pub mod session;
pub mod transaction;

pub use book::{Book, BookDraft, BookType};
pub use catalog::seed_catalog;
pub use class::ClassConfig;
pub use error::CoreError;
pub use form::{FormEntry, FormField, PersistentForms};
pub use ledger::{FineSummary, Ledger, LedgerError, StockAdjustment};
pub use member::{Member, MemberDraft, MemberType};
pub use roster::{RosterRow, NO_CLASS};
pub use session::{promote, PromotionSummary};
pub use transaction::{LoanAction, ResolutionMethod, ResolutionStatus, Transaction, TxStatus};

// Re-export commonly used external types
pub use rust_decimal::Decimal;

/// Highest school year. Students in this year graduate on promotion.
pub const MAX_YEAR: u8 = 6;
