//! Printable loan-form state.
//!
//! Each (member, book) pair has a form entry with a serial number, the
//! received and returned dates, and the condition on return. Entries are
//! read through two tiers:
//!
//! 1. [`PersistentForms`] holds entries that were written, either by hand or
//!    by a ledger action. A stored entry is returned as is.
//! 2. Otherwise [`derive_entry`] computes one from the ledger. Derived
//!    entries are never stored as a side effect of reading.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::transaction::format_date;
use crate::{Ledger, LoanAction, Member};

/// Condition written on a form when the book came back intact.
pub const STATUS_GOOD: &str = "Good";

/// Condition written on a form for a damaged or lost copy.
pub const STATUS_DAMAGED: &str = "Damaged/Lost";

/// One row on a member's loan form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormEntry {
    /// Serial number written on the copy.
    pub serial: String,
    /// Date the member received the book.
    pub received_date: String,
    /// Date the book came back.
    pub return_date: String,
    /// Condition on return.
    pub status: String,
}

impl FormEntry {
    /// Whether every field is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.serial.is_empty()
            && self.received_date.is_empty()
            && self.return_date.is_empty()
            && self.status.is_empty()
    }

    /// Read one field.
    #[must_use]
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Serial => &self.serial,
            FormField::ReceivedDate => &self.received_date,
            FormField::ReturnDate => &self.return_date,
            FormField::Status => &self.status,
        }
    }

    fn set(&mut self, field: FormField, value: &str) {
        let value = if field.is_upper_cased() {
            value.trim().to_uppercase()
        } else {
            value.trim().to_string()
        };
        match field {
            FormField::Serial => self.serial = value,
            FormField::ReceivedDate => self.received_date = value,
            FormField::ReturnDate => self.return_date = value,
            FormField::Status => self.status = value,
        }
    }
}

/// Editable form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    /// Serial number.
    Serial,
    /// Date received.
    ReceivedDate,
    /// Date returned.
    ReturnDate,
    /// Condition on return.
    Status,
}

impl FormField {
    /// Serial and status are stored upper-cased; dates verbatim.
    #[must_use]
    pub const fn is_upper_cased(self) -> bool {
        matches!(self, Self::Serial | Self::Status)
    }
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "serial" => Ok(Self::Serial),
            "receiveddate" | "received" => Ok(Self::ReceivedDate),
            "returndate" | "returned" => Ok(Self::ReturnDate),
            "status" => Ok(Self::Status),
            _ => Err(format!("unknown form field: {s}")),
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => write!(f, "serial"),
            Self::ReceivedDate => write!(f, "receivedDate"),
            Self::ReturnDate => write!(f, "returnDate"),
            Self::Status => write!(f, "status"),
        }
    }
}

/// Stored form entries keyed by member id, then book id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistentForms {
    members: BTreeMap<String, BTreeMap<String, FormEntry>>,
}

impl PersistentForms {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored entry, if any.
    #[must_use]
    pub fn get(&self, member_id: &str, book_id: &str) -> Option<&FormEntry> {
        self.members.get(member_id)?.get(book_id)
    }

    /// All stored entries for a member, keyed by book id.
    #[must_use]
    pub fn member_entries(&self, member_id: &str) -> Option<&BTreeMap<String, FormEntry>> {
        self.members.get(member_id)
    }

    /// Write one field, creating the entry if needed.
    pub fn set_field(&mut self, member_id: &str, book_id: &str, field: FormField, value: &str) {
        self.entry_mut(member_id, book_id).set(field, value);
    }

    /// Ledger side effect of a borrow: new received date, return cleared.
    pub fn record_borrow(&mut self, member_id: &str, book_id: &str, date: &str) {
        let entry = self.entry_mut(member_id, book_id);
        entry.received_date = date.to_string();
        entry.return_date.clear();
        entry.status.clear();
    }

    /// Ledger side effect of a return: return date and condition.
    pub fn record_return(&mut self, member_id: &str, book_id: &str, date: &str, damaged: bool) {
        let entry = self.entry_mut(member_id, book_id);
        entry.return_date = date.to_string();
        entry.status = condition_label(damaged).to_string();
    }

    /// Forget every entry of a member.
    pub fn remove_member(&mut self, member_id: &str) -> bool {
        self.members.remove(member_id).is_some()
    }

    /// Number of members with stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    fn entry_mut(&mut self, member_id: &str, book_id: &str) -> &mut FormEntry {
        self.members
            .entry(member_id.to_string())
            .or_default()
            .entry(book_id.to_string())
            .or_default()
    }
}

const fn condition_label(damaged: bool) -> &'static str {
    if damaged {
        STATUS_DAMAGED
    } else {
        STATUS_GOOD
    }
}

/// Compute a form entry from the ledger alone.
///
/// The received date comes from the latest borrow, the return date and
/// condition from the latest return or damage report. Missing records give
/// empty fields. The serial is never derived.
#[must_use]
pub fn derive_entry(ledger: &Ledger, user_name: &str, book_id: &str) -> FormEntry {
    let borrow = ledger.latest_for(user_name, book_id, |t| t.action == LoanAction::Borrow);
    let ret = ledger.latest_for(user_name, book_id, |t| t.action.is_return());
    FormEntry {
        serial: String::new(),
        received_date: borrow.map(|t| format_date(t.created_at)).unwrap_or_default(),
        return_date: ret.map(|t| format_date(t.created_at)).unwrap_or_default(),
        status: ret
            .map(|t| condition_label(t.action == LoanAction::ReturnDamaged).to_string())
            .unwrap_or_default(),
    }
}

/// The form entry shown for a member and book: stored first, derived second.
#[must_use]
pub fn snapshot(forms: &PersistentForms, ledger: &Ledger, member: &Member, book_id: &str) -> FormEntry {
    forms
        .get(&member.id, book_id)
        .cloned()
        .unwrap_or_else(|| derive_entry(ledger, &member.name, book_id))
}
