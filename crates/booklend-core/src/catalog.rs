//! Built-in starting catalog.
//!
//! Used when no book list has been saved yet. Each year gets the core
//! textbooks and one activity book; ids are stable (`SEED-<year>-<n>`) so a
//! reseeded store lines up with older ledgers.

use rust_decimal::Decimal;

use crate::{Book, BookDraft, BookType};

const SUBJECTS: &[(&str, &str, i64)] = &[
    ("BAHASA MELAYU", "BM", 950),
    ("BAHASA INGGERIS", "BI", 1_050),
    ("MATEMATIK", "MT", 890),
    ("SAINS", "SN", 1_290),
    ("PENDIDIKAN ISLAM", "PI", 760),
    ("PENDIDIKAN MORAL", "PM", 720),
];

const ACTIVITY: (&str, &str, i64) = ("BUKU AKTIVITI MATEMATIK", "AKT-MT", 550);

/// Stock given to every seeded title.
pub const SEED_STOCK: u32 = 40;

/// The default catalog for years 1-6.
#[must_use]
pub fn seed_catalog() -> Vec<Book> {
    let mut books = Vec::new();
    for year in 1..=crate::MAX_YEAR {
        let entries = SUBJECTS
            .iter()
            .map(|entry| (entry, BookType::Textbook))
            .chain(std::iter::once((&ACTIVITY, BookType::Activity)));
        for (n, ((subject, code, cents), book_type)) in entries.enumerate() {
            let draft = BookDraft::new(format!("{subject} TAHUN {year}"), format!("{code}{year}"), year)
                .with_type(book_type)
                .with_subject(*subject)
                .with_stock(SEED_STOCK)
                .with_price(Decimal::new(*cents, 2));
            if let Ok(book) = Book::from_draft(format!("SEED-{year}-{:02}", n + 1), draft) {
                books.push(book);
            }
        }
    }
    books
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_seed_catalog_shape() {
        let books = seed_catalog();
        assert_eq!(books.len(), 6 * (SUBJECTS.len() + 1));
        assert!(books.iter().all(|b| (1..=6).contains(&b.year)));

        let first = &books[0];
        assert_eq!(first.id, "SEED-1-01");
        assert_eq!(first.title, "BAHASA MELAYU TAHUN 1");
        assert_eq!(first.code, "BM1");
        assert_eq!(first.price, dec!(9.50));

        let activities = books.iter().filter(|b| b.book_type == BookType::Activity).count();
        assert_eq!(activities, 6);
    }

    #[test]
    fn test_seed_ids_unique() {
        let books = seed_catalog();
        let mut ids: Vec<&str> = books.iter().map(|b| b.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), books.len());
    }
}
