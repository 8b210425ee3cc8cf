//! Ledger records.
//!
//! A [`Transaction`] is written once and never edited, except for the
//! settlement fields of a damage record.

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Book, MemberType};

/// Display format for dates on loan forms.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Display format for ledger timestamps.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Format a millisecond instant as a local date, e.g. `05/01/2026`.
#[must_use]
pub fn format_date(millis: i64) -> String {
    format_local(millis, DATE_FORMAT)
}

/// Format a millisecond instant as a local timestamp.
#[must_use]
pub fn format_timestamp(millis: i64) -> String {
    format_local(millis, TIMESTAMP_FORMAT)
}

fn format_local(millis: i64, fmt: &str) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|t| t.with_timezone(&Local).format(fmt).to_string())
        .unwrap_or_default()
}

/// What happened to the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanAction {
    /// Issued to a member.
    Borrow,
    /// Returned in good condition.
    Return,
    /// Returned damaged, or reported lost.
    ReturnDamaged,
}

impl LoanAction {
    /// Whether this action closes a loan.
    #[must_use]
    pub const fn is_return(self) -> bool {
        matches!(self, Self::Return | Self::ReturnDamaged)
    }
}

impl FromStr for LoanAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "borrow" => Ok(Self::Borrow),
            "return" => Ok(Self::Return),
            "returndamaged" | "damaged" | "lost" => Ok(Self::ReturnDamaged),
            _ => Err(format!("unknown loan action: {s}")),
        }
    }
}

impl fmt::Display for LoanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Borrow => write!(f, "Borrow"),
            Self::Return => write!(f, "Return"),
            Self::ReturnDamaged => write!(f, "ReturnDamaged"),
        }
    }
}

/// Outcome recorded on a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxStatus {
    /// Normal borrow or return.
    Success,
    /// Damaged or lost copy; carries a fine.
    #[serde(rename = "Damaged/Lost")]
    DamagedLost,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::DamagedLost => write!(f, "Damaged/Lost"),
        }
    }
}

/// Whether a damage fine is still owed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionStatus {
    /// Not yet paid or replaced.
    Outstanding,
    /// Paid in cash or replaced.
    Settled,
}

/// How a damage fine was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionMethod {
    /// Fine paid in cash.
    Cash,
    /// Member handed in a replacement copy; the fine is waived.
    #[serde(rename = "Replacement-Book")]
    ReplacementBook,
}

impl FromStr for ResolutionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "cash" => Ok(Self::Cash),
            "replacementbook" | "replacement" | "book" => Ok(Self::ReplacementBook),
            _ => Err(format!("unknown resolution method: {s}")),
        }
    }
}

impl fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => write!(f, "Cash"),
            Self::ReplacementBook => write!(f, "Replacement-Book"),
        }
    }
}

/// A ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique id.
    pub id: String,
    /// Book the action applied to.
    pub book_id: String,
    /// Title at the time of the action.
    pub book_title: String,
    /// Name the loan is recorded against.
    pub user_name: String,
    /// Teacher or student.
    pub user_type: MemberType,
    /// Number of units moved.
    pub quantity: u32,
    /// Display-only local timestamp.
    pub timestamp: String,
    /// Milliseconds since the epoch; the chronological sort key.
    pub created_at: i64,
    /// What happened.
    pub action: LoanAction,
    /// Outcome.
    pub status: TxStatus,
    /// Fine owed for a damage record, snapshot of the book price.
    #[serde(default)]
    pub fine_amount: Decimal,
    /// Settlement state, damage records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_status: Option<ResolutionStatus>,
    /// Settlement method, set once settled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_method: Option<ResolutionMethod>,
}

impl Transaction {
    /// Record an action on a book at the given instant.
    ///
    /// Status, fine and resolution fields follow from the action.
    pub fn new(
        id: impl Into<String>,
        book: &Book,
        action: LoanAction,
        user: (&str, MemberType),
        quantity: u32,
        created_at: i64,
    ) -> Self {
        let damaged = action == LoanAction::ReturnDamaged;
        Self {
            id: id.into(),
            book_id: book.id.clone(),
            book_title: book.title.clone(),
            user_name: user.0.trim().to_uppercase(),
            user_type: user.1,
            quantity,
            timestamp: format_timestamp(created_at),
            created_at,
            action,
            status: if damaged {
                TxStatus::DamagedLost
            } else {
                TxStatus::Success
            },
            fine_amount: if damaged { book.price } else { Decimal::ZERO },
            resolution_status: damaged.then_some(ResolutionStatus::Outstanding),
            resolution_method: None,
        }
    }

    /// Whether this is a damage or loss record.
    #[must_use]
    pub fn is_damage(&self) -> bool {
        self.status == TxStatus::DamagedLost
    }

    /// Whether the fine is still owed.
    #[must_use]
    pub fn is_outstanding(&self) -> bool {
        self.is_damage() && self.resolution_status != Some(ResolutionStatus::Settled)
    }

    /// Fine as reported: zero when waived by a replacement copy.
    #[must_use]
    pub fn reported_fine(&self) -> Decimal {
        if self.resolution_method == Some(ResolutionMethod::ReplacementBook) {
            Decimal::ZERO
        } else {
            self.fine_amount
        }
    }

    pub(crate) fn settle(&mut self, method: ResolutionMethod) {
        self.resolution_status = Some(ResolutionStatus::Settled);
        self.resolution_method = Some(method);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BookDraft;
    use rust_decimal_macros::dec;

    fn book() -> Book {
        Book::from_draft("B1", BookDraft::new("Sains", "SN1", 1).with_price(dec!(12.90))).unwrap()
    }

    #[test]
    fn test_borrow_record() {
        let tx = Transaction::new("T1", &book(), LoanAction::Borrow, ("ali", MemberType::Student), 1, 0);
        assert_eq!(tx.user_name, "ALI");
        assert_eq!(tx.book_title, "SAINS");
        assert_eq!(tx.status, TxStatus::Success);
        assert_eq!(tx.fine_amount, Decimal::ZERO);
        assert_eq!(tx.resolution_status, None);
        assert!(!tx.is_damage());
    }

    #[test]
    fn test_damage_record_snapshots_price() {
        let tx = Transaction::new(
            "T2",
            &book(),
            LoanAction::ReturnDamaged,
            ("ali", MemberType::Student),
            1,
            0,
        );
        assert_eq!(tx.status, TxStatus::DamagedLost);
        assert_eq!(tx.fine_amount, dec!(12.90));
        assert_eq!(tx.resolution_status, Some(ResolutionStatus::Outstanding));
        assert!(tx.is_outstanding());
    }

    #[test]
    fn test_reported_fine_waived_by_replacement() {
        let mut tx = Transaction::new(
            "T3",
            &book(),
            LoanAction::ReturnDamaged,
            ("ali", MemberType::Student),
            1,
            0,
        );
        tx.settle(ResolutionMethod::Cash);
        assert_eq!(tx.reported_fine(), dec!(12.90));
        assert!(!tx.is_outstanding());
        tx.settle(ResolutionMethod::ReplacementBook);
        assert_eq!(tx.reported_fine(), Decimal::ZERO);
        assert_eq!(tx.fine_amount, dec!(12.90));
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(
            serde_json::to_string(&TxStatus::DamagedLost).unwrap(),
            "\"Damaged/Lost\""
        );
        assert_eq!(
            serde_json::to_string(&ResolutionMethod::ReplacementBook).unwrap(),
            "\"Replacement-Book\""
        );
    }

    #[test]
    fn test_action_and_method_from_str() {
        assert_eq!("return-damaged".parse(), Ok(LoanAction::ReturnDamaged));
        assert_eq!("Borrow".parse(), Ok(LoanAction::Borrow));
        assert_eq!("Replacement-Book".parse(), Ok(ResolutionMethod::ReplacementBook));
        assert!("swap".parse::<ResolutionMethod>().is_err());
    }

    #[test]
    fn test_format_helpers_handle_out_of_range() {
        assert_eq!(format_date(i64::MAX), "");
        assert!(!format_timestamp(0).is_empty());
    }
}
