//! School settings printed on forms and reports.

use serde::{Deserialize, Serialize};

/// School-level settings. Every field is optional free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// School name.
    pub school_name: String,
    /// School code.
    pub school_code: String,
    /// Current session label, e.g. `2026/2027`.
    pub session: String,
    /// Teacher in charge of the loan scheme.
    pub officer_name: String,
}

impl Settings {
    /// Header line for printed forms.
    #[must_use]
    pub fn header(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !self.school_name.is_empty() {
            parts.push(&self.school_name);
        }
        if !self.school_code.is_empty() {
            parts.push(&self.school_code);
        }
        if !self.session.is_empty() {
            parts.push(&self.session);
        }
        parts.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_skips_blank_fields() {
        let settings = Settings {
            school_name: "SK TAMAN MELATI".to_string(),
            session: "2026".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.header(), "SK TAMAN MELATI | 2026");
        assert_eq!(Settings::default().header(), "");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"schoolName":"SK A"}"#).unwrap();
        assert_eq!(settings.school_name, "SK A");
        assert_eq!(settings.officer_name, "");
    }
}
