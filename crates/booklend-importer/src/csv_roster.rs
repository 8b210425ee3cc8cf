//! CSV roster importer.
//!
//! Expects a header row with `Name`, `Year` and `Class` columns (any case,
//! any order). `Year` and `Class` may be missing; `Name` may not.

use booklend_core::{RosterRow, MAX_YEAR};

use crate::{ImportError, ImportResult};

struct Columns {
    name: usize,
    year: Option<usize>,
    class_name: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, ImportError> {
        let find = |wanted: &[&str]| {
            headers
                .iter()
                .position(|h| wanted.iter().any(|w| h.trim().eq_ignore_ascii_case(w)))
        };
        Ok(Self {
            name: find(&["name", "nama"]).ok_or(ImportError::MissingColumn("Name"))?,
            year: find(&["year", "tahun"]),
            class_name: find(&["class", "kelas", "classname"]),
        })
    }
}

/// Parse a CSV roster.
///
/// Rows with a blank name are skipped silently; rows with an unreadable
/// year default to year 1 and add a warning.
pub fn parse_csv(content: &str) -> Result<ImportResult, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut result = ImportResult::empty();
    // Header is line 1.
    for (line, record) in reader.records().enumerate().map(|(i, r)| (i + 2, r)) {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                result.warnings.push(format!("Line {line}: {e}"));
                continue;
            }
        };
        let name = record.get(columns.name).unwrap_or_default();
        if name.chars().count() < 2 {
            continue;
        }
        let raw_year = columns.year.and_then(|i| record.get(i)).unwrap_or_default();
        let year = match raw_year.parse::<u8>() {
            Ok(y) if (1..=MAX_YEAR).contains(&y) => y,
            _ if raw_year.is_empty() => 1,
            _ => {
                result
                    .warnings
                    .push(format!("Line {line}: invalid year {raw_year:?}, using 1"));
                1
            }
        };
        let class_name = columns
            .class_name
            .and_then(|i| record.get(i))
            .unwrap_or_default();
        result.rows.push(RosterRow::new(name, year, class_name));
    }

    if result.rows.is_empty() {
        return Err(ImportError::NoRowsExtracted);
    }
    tracing::debug!(
        rows = result.rows.len(),
        warnings = result.warnings.len(),
        "parsed CSV roster"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use booklend_core::NO_CLASS;

    #[test]
    fn test_basic_roster() {
        let csv = "Name,Year,Class\nAli bin Abu,2,Bestari\nSiti,3,\n";
        let result = parse_csv(csv).unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0], RosterRow::new("ALI BIN ABU", 2, "BESTARI"));
        assert_eq!(result.rows[1].class_name, NO_CLASS);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_columns_in_any_order_and_case() {
        let csv = "kelas,NAMA\nAmanah,Chong Wei\n";
        let result = parse_csv(csv).unwrap();
        assert_eq!(result.rows[0].name, "CHONG WEI");
        assert_eq!(result.rows[0].year, 1);
        assert_eq!(result.rows[0].class_name, "AMANAH");
    }

    #[test]
    fn test_bad_year_warns() {
        let csv = "Name,Year\nAli,9\nSiti,two\nMuthu,6\n";
        let result = parse_csv(csv).unwrap();
        assert_eq!(result.rows.len(), 3);
        assert_eq!(result.rows[0].year, 1);
        assert_eq!(result.rows[2].year, 6);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].starts_with("Line 2"));
    }

    #[test]
    fn test_missing_name_column() {
        let err = parse_csv("Year,Class\n1,A\n").unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn("Name")));
    }

    #[test]
    fn test_blank_names_only() {
        let err = parse_csv("Name,Year\n,1\nX,2\n").unwrap_err();
        assert!(matches!(err, ImportError::NoRowsExtracted));
    }
}
