//! Entity store for booklend.
//!
//! The [`Store`] owns the catalog, roster, class registry, ledger, stored
//! form entries and school settings. Each container is kept as a JSON
//! document in a [`Persistence`] backend and written through after every
//! change.
//!
//! # Features
//!
//! - All-or-nothing ledger actions with the form side effect
//! - Damage settlement with correction of earlier settlements
//! - Tolerant loading: malformed containers fall back to defaults and are
//!   reported as warnings
//! - Full-state backup and restore
//! - In-memory and directory backends
//!
//! # Example
//!
//! ```
//! use booklend_core::{BookDraft, LoanAction, MemberDraft};
//! use booklend_store::{LoanRequest, MemoryPersistence, Store};
//!
//! let mut store = Store::open(MemoryPersistence::new());
//! let book = store.add_book(BookDraft::new("Sains", "SN1", 1).with_stock(3)).unwrap();
//! let ali = store.add_member(MemberDraft::student("Ali", 1, Some("Amanah"))).unwrap();
//!
//! store
//!     .apply_action(LoanRequest::for_member(&book.id, LoanAction::Borrow, &ali))
//!     .unwrap();
//!
//! assert_eq!(store.book(&book.id).unwrap().stock, 2);
//! assert_eq!(store.active_loans("ALI").len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backup;
pub mod clock;
mod error;
pub mod persistence;
pub mod settings;
mod store;

pub use backup::{Backup, BACKUP_VERSION};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::StoreError;
pub use persistence::{ContainerKey, FilePersistence, MemoryPersistence, Persistence};
pub use settings::Settings;
pub use store::{ImportSummary, LoanRequest, StockLine, Store};
