//! The append-only loan ledger and everything derived from it.
//!
//! The [`Ledger`] keeps transactions most-recent-first, the way the log is
//! shown. Every derivation replays the records by `created_at`, so a reset
//! or restored log never disagrees with a cached flag.
//!
//! # Stock rules
//!
//! | Action | Textbook | Activity |
//! |--------|----------|----------|
//! | Borrow | `-qty` | `-qty` |
//! | Return | `+qty` | unchanged |
//! | `ReturnDamaged` | unchanged | unchanged |
//!
//! A damaged copy only comes back into circulation when the fine is settled
//! with a replacement book.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Book, LoanAction, ResolutionMethod, Transaction};

/// Error raised by a ledger action. No state changes when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Borrow asked for more units than are on the shelf.
    #[error("insufficient stock for {book_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Book being lent.
        book_id: String,
        /// Units requested.
        requested: u32,
        /// Units on the shelf.
        available: u32,
    },

    /// Quantity of zero.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// Settlement attempted on a record that is not a damage record.
    #[error("transaction {0} is not a damage record")]
    NotADamageRecord(String),
}

/// Compute a book's stock after an action, without modifying it.
///
/// ```
/// use booklend_core::{ledger, Book, BookDraft, LoanAction, LedgerError};
///
/// let book = Book::from_draft("B1", BookDraft::new("Sains", "SN1", 1).with_stock(1)).unwrap();
/// assert_eq!(ledger::stock_after(&book, LoanAction::Borrow, 1), Ok(0));
/// assert!(matches!(
///     ledger::stock_after(&book, LoanAction::Borrow, 2),
///     Err(LedgerError::InsufficientStock { .. })
/// ));
/// ```
pub fn stock_after(book: &Book, action: LoanAction, quantity: u32) -> Result<u32, LedgerError> {
    if quantity == 0 {
        return Err(LedgerError::ZeroQuantity);
    }
    match action {
        LoanAction::Borrow => {
            book.stock
                .checked_sub(quantity)
                .ok_or_else(|| LedgerError::InsufficientStock {
                    book_id: book.id.clone(),
                    requested: quantity,
                    available: book.stock,
                })
        }
        LoanAction::Return if book.is_returnable() => Ok(book.stock.saturating_add(quantity)),
        LoanAction::Return | LoanAction::ReturnDamaged => Ok(book.stock),
    }
}

/// Stock movement caused by settling a damage record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    /// Put units back on the shelf.
    Credit(u32),
    /// Take previously credited units back off the shelf.
    Debit(u32),
    /// No movement.
    Unchanged,
}

impl StockAdjustment {
    /// Apply to a stock count. Returns `None` if a debit would go below zero.
    #[must_use]
    pub const fn apply(self, stock: u32) -> Option<u32> {
        match self {
            Self::Credit(n) => Some(stock.saturating_add(n)),
            Self::Debit(n) => stock.checked_sub(n),
            Self::Unchanged => Some(stock),
        }
    }
}

/// Decide the stock movement for settling `tx` with `method`.
///
/// A replacement copy credits one unit, once. Re-settling with the same
/// method moves nothing; correcting a replacement to cash takes the unit
/// back.
pub fn settlement_adjustment(
    tx: &Transaction,
    method: ResolutionMethod,
) -> Result<StockAdjustment, LedgerError> {
    if !tx.is_damage() {
        return Err(LedgerError::NotADamageRecord(tx.id.clone()));
    }
    let was_replaced = tx.resolution_method == Some(ResolutionMethod::ReplacementBook);
    Ok(match (was_replaced, method) {
        (false, ResolutionMethod::ReplacementBook) => StockAdjustment::Credit(1),
        (true, ResolutionMethod::Cash) => StockAdjustment::Debit(1),
        _ => StockAdjustment::Unchanged,
    })
}

/// The transaction log, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<Transaction>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, most recent first.
    #[must_use]
    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend a new record.
    pub fn record(&mut self, tx: Transaction) {
        self.entries.insert(0, tx);
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.entries.iter().find(|t| t.id == id)
    }

    /// Mark a damage record as settled.
    ///
    /// Only the settlement fields change. Returns the updated record, or
    /// `None` if the id is unknown.
    pub fn settle(&mut self, id: &str, method: ResolutionMethod) -> Option<&Transaction> {
        let tx = self.entries.iter_mut().find(|t| t.id == id)?;
        tx.settle(method);
        Some(tx)
    }

    /// Records for one member name, most recent first.
    pub fn for_user<'a>(&'a self, user_name: &str) -> impl Iterator<Item = &'a Transaction> {
        let name = user_name.trim().to_uppercase();
        self.entries.iter().filter(move |t| t.user_name == name)
    }

    /// Records in ascending `created_at` order.
    #[must_use]
    pub fn chronological(&self) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.entries.iter().collect();
        // Entries are newest first; reverse so equal keys keep insertion order.
        sorted.reverse();
        sorted.sort_by_key(|t| t.created_at);
        sorted
    }

    /// Largest `created_at` in the log.
    #[must_use]
    pub fn latest_created_at(&self) -> Option<i64> {
        self.entries.iter().map(|t| t.created_at).max()
    }

    /// Drop every record. The only way anything leaves the ledger.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Loans a member currently holds.
    ///
    /// Replays the member's records oldest first. A borrow opens a loan; a
    /// return or damage report closes the oldest open loan of the same
    /// book. Copies are not tracked individually.
    ///
    /// Matching is per record, not per unit: a return of any quantity
    /// closes one whole borrow record. A borrow of 2 followed by a return
    /// of 1 leaves nothing open, so partial returns should be recorded as
    /// single-unit actions.
    #[must_use]
    pub fn active_loans(&self, user_name: &str) -> Vec<&Transaction> {
        let name = user_name.trim().to_uppercase();
        let mut open: Vec<&Transaction> = Vec::new();
        for tx in self.chronological() {
            if tx.user_name != name {
                continue;
            }
            if tx.action == LoanAction::Borrow {
                open.push(tx);
            } else if let Some(pos) = open.iter().position(|b| b.book_id == tx.book_id) {
                open.remove(pos);
            }
        }
        open
    }

    /// Units of a book currently out on loan, across all members. Sums the
    /// quantities of the open borrow records from [`Ledger::active_loans`].
    #[must_use]
    pub fn on_loan(&self, book_id: &str) -> u32 {
        let mut names: Vec<&str> = self
            .entries
            .iter()
            .filter(|t| t.book_id == book_id)
            .map(|t| t.user_name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
            .into_iter()
            .flat_map(|name| self.active_loans(name))
            .filter(|t| t.book_id == book_id)
            .map(|t| t.quantity)
            .sum()
    }

    /// Most recent record for a member and book matching `pred`.
    pub(crate) fn latest_for<'a>(
        &'a self,
        user_name: &str,
        book_id: &str,
        pred: impl Fn(&Transaction) -> bool,
    ) -> Option<&'a Transaction> {
        self.for_user(user_name)
            .filter(|t| t.book_id == book_id && pred(t))
            .max_by_key(|t| t.created_at)
    }
}

/// Fine totals over a set of damage records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FineSummary {
    /// Sum of fines still owed.
    pub outstanding: Decimal,
    /// Sum of fines settled in cash.
    pub collected_cash: Decimal,
    /// Sum of fines waived by a replacement copy.
    pub waived: Decimal,
    /// Number of damage records.
    pub records: usize,
    /// Number of damage records still owed.
    pub outstanding_records: usize,
}

impl FineSummary {
    /// Total over all damage records, waived ones included.
    #[must_use]
    pub fn assessed(&self) -> Decimal {
        self.outstanding + self.collected_cash + self.waived
    }
}

/// Summarize the damage fines among `txs`.
///
/// ```
/// use booklend_core::ledger::fine_summary;
/// use booklend_core::Transaction;
///
/// let none: Vec<Transaction> = Vec::new();
/// assert_eq!(fine_summary(&none).records, 0);
/// ```
pub fn fine_summary<'a>(txs: impl IntoIterator<Item = &'a Transaction>) -> FineSummary {
    let mut summary = FineSummary::default();
    for tx in txs.into_iter().filter(|t| t.is_damage()) {
        summary.records += 1;
        if tx.is_outstanding() {
            summary.outstanding += tx.fine_amount;
            summary.outstanding_records += 1;
        } else if tx.resolution_method == Some(ResolutionMethod::ReplacementBook) {
            summary.waived += tx.fine_amount;
        } else {
            summary.collected_cash += tx.fine_amount;
        }
    }
    summary
}
