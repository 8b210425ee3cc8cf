//! Rows produced by a roster import.

use serde::{Deserialize, Serialize};

use crate::{MemberDraft, MemberType};

/// Class placeholder for students whose class is unknown.
pub const NO_CLASS: &str = "NONE";

/// One student extracted from a roster, before it becomes a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow {
    /// Upper-cased name.
    pub name: String,
    /// Year, 1-6.
    pub year: u8,
    /// Upper-cased class name, or [`NO_CLASS`].
    pub class_name: String,
}

impl RosterRow {
    /// Build a normalized row. A blank class becomes [`NO_CLASS`].
    pub fn new(name: &str, year: u8, class_name: &str) -> Self {
        let class_name = class_name.trim().to_uppercase();
        Self {
            name: name.trim().to_uppercase(),
            year,
            class_name: if class_name.is_empty() {
                NO_CLASS.to_string()
            } else {
                class_name
            },
        }
    }

    /// Whether the row names a real class.
    #[must_use]
    pub fn has_class(&self) -> bool {
        !self.class_name.is_empty() && self.class_name != NO_CLASS
    }

    /// Member draft for this row. Imported members are always students.
    #[must_use]
    pub fn to_member_draft(&self) -> MemberDraft {
        MemberDraft {
            name: self.name.clone(),
            member_type: MemberType::Student,
            year: Some(self.year),
            class_name: Some(self.class_name.clone()),
        }
    }
}
