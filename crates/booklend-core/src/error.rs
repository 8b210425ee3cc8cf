//! Validation errors shared by the core types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Error raised when a book, member or class fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Year is outside the 1-6 range used by the school.
    #[error("year {0} is outside 1-6")]
    InvalidYear(u8),

    /// A required text field was blank after trimming.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// Book price below zero.
    #[error("price must not be negative: {0}")]
    NegativePrice(Decimal),

    /// The class name is already registered for this year.
    #[error("class {class} is already registered for year {year}")]
    DuplicateClass {
        /// Year the class belongs to.
        year: u8,
        /// Normalized class name.
        class: String,
    },
}

/// Check that a year lies within 1-6.
pub const fn check_year(year: u8) -> Result<u8, CoreError> {
    if year >= 1 && year <= crate::MAX_YEAR {
        Ok(year)
    } else {
        Err(CoreError::InvalidYear(year))
    }
}

/// Trim and upper-case a free-text name, rejecting blank input.
pub fn normalize_name(value: &str, field: &'static str) -> Result<String, CoreError> {
    let normalized = value.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(CoreError::EmptyField(field));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_year_bounds() {
        assert_eq!(check_year(1), Ok(1));
        assert_eq!(check_year(6), Ok(6));
        assert_eq!(check_year(0), Err(CoreError::InvalidYear(0)));
        assert_eq!(check_year(7), Err(CoreError::InvalidYear(7)));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  siti aminah ", "name").unwrap(), "SITI AMINAH");
        assert_eq!(
            normalize_name("   ", "name"),
            Err(CoreError::EmptyField("name"))
        );
    }
}
