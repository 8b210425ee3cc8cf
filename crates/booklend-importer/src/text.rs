//! Local parser for pasted class lists.
//!
//! The input is a block of lines such as:
//!
//! ```text
//! Year 1 Amanah
//! 1. Ali bin Abu
//! 2. Siti Aminah
//! Year 2
//! - Chong Wei
//! ```
//!
//! Header lines move a year/class cursor; every other line is a name that
//! takes the current cursor. Lines are upper-cased and trimmed first.

use std::sync::OnceLock;

use booklend_core::RosterRow;
use regex::Regex;

use crate::{ImportError, ImportResult};

struct Patterns {
    class_header: Regex,
    year_header: Regex,
    name_prefix: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            class_header: Regex::new(r"^(?:(?:YEAR|TAHUN)\s*)?([1-6])\s*([A-Z0-9\s-]+)$")?,
            year_header: Regex::new(r"^(?:YEAR|TAHUN)\s*([1-6])$")?,
            name_prefix: Regex::new(r"^(?:\d+[.)\s]|[-*•])\s*")?,
        })
    }
}

fn patterns() -> Result<&'static Patterns, ImportError> {
    static PATTERNS: OnceLock<Result<Patterns, regex::Error>> = OnceLock::new();
    PATTERNS
        .get_or_init(Patterns::compile)
        .as_ref()
        .map_err(|e| ImportError::Pattern(e.clone()))
}

/// Cursor state while walking the lines.
struct Cursor {
    year: u8,
    class_name: String,
}

/// Parse a pasted class list into roster rows.
///
/// Returns [`ImportError::NoRowsExtracted`] when no line yields a name.
///
/// ```
/// use booklend_importer::parse_text;
///
/// let result = parse_text("2 Bestari\n1. Ali\n2. Siti").unwrap();
/// assert_eq!(result.rows.len(), 2);
/// assert_eq!(result.rows[0].year, 2);
/// assert_eq!(result.rows[0].class_name, "BESTARI");
/// ```
pub fn parse_text(input: &str) -> Result<ImportResult, ImportError> {
    let patterns = patterns()?;
    let mut cursor = Cursor {
        year: 1,
        class_name: String::new(),
    };
    let mut rows = Vec::new();

    for line in input.lines() {
        let line = line.trim().to_uppercase();
        if line.is_empty() {
            continue;
        }
        if let Some(caps) = patterns.class_header.captures(&line) {
            cursor.year = caps[1].parse().unwrap_or(1);
            cursor.class_name = caps[2].trim().to_string();
        } else if let Some(caps) = patterns.year_header.captures(&line) {
            cursor.year = caps[1].parse().unwrap_or(1);
            cursor.class_name.clear();
        } else {
            let name = patterns.name_prefix.replace(&line, "");
            let name = name.trim();
            if name.chars().count() > 1 {
                rows.push(RosterRow::new(name, cursor.year, &cursor.class_name));
            }
        }
    }

    if rows.is_empty() {
        return Err(ImportError::NoRowsExtracted);
    }
    tracing::debug!(rows = rows.len(), "parsed class list");
    Ok(ImportResult::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use booklend_core::NO_CLASS;

    // ===== Header Tests =====

    #[test]
    fn test_class_header_sets_cursor() {
        let result = parse_text("Year 3 Cerdik\nAli\nSiti").unwrap();
        assert_eq!(result.rows.len(), 2);
        assert!(result
            .rows
            .iter()
            .all(|r| r.year == 3 && r.class_name == "CERDIK"));
    }

    #[test]
    fn test_header_without_year_word() {
        let result = parse_text("4 Al-Farabi\nAhmad").unwrap();
        assert_eq!(result.rows[0].year, 4);
        assert_eq!(result.rows[0].class_name, "AL-FARABI");
    }

    #[test]
    fn test_year_only_header_clears_class() {
        let result = parse_text("Year 5 Amanah\nAli\nyear 6\nSiti").unwrap();
        assert_eq!(result.rows[0].class_name, "AMANAH");
        assert_eq!(result.rows[1].year, 6);
        assert_eq!(result.rows[1].class_name, NO_CLASS);
    }

    #[test]
    fn test_malay_year_word() {
        let result = parse_text("Tahun 2 Bestari\nAli").unwrap();
        assert_eq!(result.rows[0].year, 2);
        assert_eq!(result.rows[0].class_name, "BESTARI");
    }

    // ===== Name Tests =====

    #[test]
    fn test_defaults_without_header() {
        let result = parse_text("ali bin abu").unwrap();
        assert_eq!(result.rows[0].name, "ALI BIN ABU");
        assert_eq!(result.rows[0].year, 1);
        assert_eq!(result.rows[0].class_name, NO_CLASS);
    }

    #[test]
    fn test_prefixes_stripped() {
        let result = parse_text("1. Ali\n2) Siti\n- Chong Wei\n* Muthu\n• Mei Ling").unwrap();
        let names: Vec<&str> = result.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["ALI", "SITI", "CHONG WEI", "MUTHU", "MEI LING"]);
    }

    #[test]
    fn test_single_characters_skipped() {
        let result = parse_text("A\n1. B\n\n   \nAli").unwrap();
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn test_nothing_to_extract() {
        assert!(matches!(parse_text(""), Err(ImportError::NoRowsExtracted)));
        assert!(matches!(
            parse_text("Year 1 Amanah\nYear 2\n"),
            Err(ImportError::NoRowsExtracted)
        ));
    }
}
