//! Books in the loan catalog.
//!
//! A [`Book`] is one catalog title with a shared stock count. Individual
//! physical copies are not tracked; the ledger only moves the count.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{check_year, normalize_name, CoreError};

/// Kind of book, which decides how returns affect stock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookType {
    /// Returnable textbook.
    #[default]
    Textbook,
    /// Activity (work) book, consumed once issued.
    Activity,
    /// Any other label kept verbatim.
    Other(String),
}

impl From<String> for BookType {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "textbook" => Self::Textbook,
            "activity" => Self::Activity,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for BookType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<BookType> for String {
    fn from(value: BookType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for BookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Textbook => write!(f, "Textbook"),
            Self::Activity => write!(f, "Activity"),
            Self::Other(label) => write!(f, "{label}"),
        }
    }
}

/// A catalog title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Identifier, assigned once at creation.
    pub id: String,
    /// Upper-cased title.
    pub title: String,
    /// Upper-cased catalog code.
    pub code: String,
    /// School year (1-6) the book belongs to.
    pub year: u8,
    /// Book kind.
    #[serde(rename = "type")]
    pub book_type: BookType,
    /// Units currently on the shelf.
    pub stock: u32,
    /// Subject name.
    #[serde(default)]
    pub subject: String,
    /// Replacement price, used as the fine for damaged or lost copies.
    #[serde(default)]
    pub price: Decimal,
}

impl Book {
    /// Build a book from a validated draft.
    pub fn from_draft(id: impl Into<String>, draft: BookDraft) -> Result<Self, CoreError> {
        let draft = draft.normalized()?;
        Ok(Self {
            id: id.into(),
            title: draft.title,
            code: draft.code,
            year: draft.year,
            book_type: draft.book_type,
            stock: draft.stock,
            subject: draft.subject,
            price: draft.price,
        })
    }

    /// Replace every editable field, keeping the id and the stock count.
    ///
    /// Stock is set once at creation; afterwards only ledger actions move it.
    pub fn update(&mut self, draft: BookDraft) -> Result<(), CoreError> {
        let stock = self.stock;
        *self = Self::from_draft(self.id.clone(), draft)?;
        self.stock = stock;
        Ok(())
    }

    /// Whether returns put this book back on the shelf.
    #[must_use]
    pub fn is_returnable(&self) -> bool {
        self.book_type != BookType::Activity
    }
}

/// Editable fields of a book, used for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    /// Title (normalized to upper case).
    pub title: String,
    /// Catalog code (normalized to upper case).
    pub code: String,
    /// School year 1-6.
    pub year: u8,
    /// Book kind.
    #[serde(rename = "type")]
    pub book_type: BookType,
    /// Initial stock. Ignored by [`Book::update`].
    pub stock: u32,
    /// Subject name.
    pub subject: String,
    /// Replacement price.
    pub price: Decimal,
}

impl BookDraft {
    /// Start a draft with the required fields.
    pub fn new(title: impl Into<String>, code: impl Into<String>, year: u8) -> Self {
        Self {
            title: title.into(),
            code: code.into(),
            year,
            ..Self::default()
        }
    }

    /// Set the book type.
    #[must_use]
    pub fn with_type(mut self, book_type: impl Into<BookType>) -> Self {
        self.book_type = book_type.into();
        self
    }

    /// Set the stock count.
    #[must_use]
    pub const fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    /// Set the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the price.
    #[must_use]
    pub const fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    fn normalized(self) -> Result<Self, CoreError> {
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(CoreError::NegativePrice(self.price));
        }
        Ok(Self {
            title: normalize_name(&self.title, "title")?,
            code: self.code.trim().to_uppercase(),
            year: check_year(self.year)?,
            subject: self.subject.trim().to_string(),
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_book_from_draft_normalizes() {
        let draft = BookDraft::new(" mathematics year 1 ", "mt1", 1)
            .with_stock(30)
            .with_price(dec!(8.50));
        let book = Book::from_draft("B1", draft).unwrap();
        assert_eq!(book.title, "MATHEMATICS YEAR 1");
        assert_eq!(book.code, "MT1");
        assert_eq!(book.book_type, BookType::Textbook);
        assert_eq!(book.price, dec!(8.50));
    }

    #[test]
    fn test_book_rejects_invalid_fields() {
        assert_eq!(
            Book::from_draft("B1", BookDraft::new("X", "X", 7)),
            Err(CoreError::InvalidYear(7))
        );
        assert_eq!(
            Book::from_draft("B1", BookDraft::new("  ", "X", 1)),
            Err(CoreError::EmptyField("title"))
        );
        assert_eq!(
            Book::from_draft("B1", BookDraft::new("X", "X", 1).with_price(dec!(-1))),
            Err(CoreError::NegativePrice(dec!(-1)))
        );
    }

    #[test]
    fn test_book_update_keeps_id_and_stock() {
        let mut book =
            Book::from_draft("B9", BookDraft::new("science", "sn2", 2).with_stock(8)).unwrap();
        book.update(
            BookDraft::new("science revised", "sn2r", 2)
                .with_type("Activity")
                .with_stock(99),
        )
        .unwrap();
        assert_eq!(book.id, "B9");
        assert_eq!(book.stock, 8);
        assert_eq!(book.title, "SCIENCE REVISED");
        assert!(!book.is_returnable());

        let err = book.update(BookDraft::new("", "x", 2));
        assert!(err.is_err());
        assert_eq!(book.id, "B9");
        assert_eq!(book.title, "SCIENCE REVISED");
    }

    #[test]
    fn test_book_type_serde_labels() {
        let json = serde_json::to_string(&BookType::Activity).unwrap();
        assert_eq!(json, "\"Activity\"");
        let other: BookType = serde_json::from_str("\"Reference\"").unwrap();
        assert_eq!(other, BookType::Other("Reference".to_string()));
        let parsed: BookType = serde_json::from_str("\"textbook\"").unwrap();
        assert_eq!(parsed, BookType::Textbook);
    }
}
