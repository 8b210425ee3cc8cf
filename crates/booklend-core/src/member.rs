//! Teachers and students on the roster.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{check_year, normalize_name, CoreError};

/// Whether a member is a teacher or a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MemberType {
    /// Teaching staff. Never carries a year or class.
    Teacher,
    /// Pupil in year 1-6.
    #[default]
    Student,
}

impl FromStr for MemberType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            _ => Err(format!("unknown member type: {s}")),
        }
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Teacher => write!(f, "Teacher"),
            Self::Student => write!(f, "Student"),
        }
    }
}

/// A roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Identifier.
    pub id: String,
    /// Upper-cased full name. Loans are recorded against this name.
    pub name: String,
    /// Teacher or student.
    #[serde(rename = "type")]
    pub member_type: MemberType,
    /// Year, students only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u8>,
    /// Class name, students only. May name a class that is no longer registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl Member {
    /// Build a member from a draft, normalizing name and type-specific fields.
    pub fn from_draft(id: impl Into<String>, draft: MemberDraft) -> Result<Self, CoreError> {
        let name = normalize_name(&draft.name, "name")?;
        let (year, class_name) = match draft.member_type {
            MemberType::Teacher => (None, None),
            MemberType::Student => {
                let year = check_year(draft.year.unwrap_or(1))?;
                let class_name = draft
                    .class_name
                    .map(|c| c.trim().to_uppercase())
                    .filter(|c| !c.is_empty());
                (Some(year), class_name)
            }
        };
        Ok(Self {
            id: id.into(),
            name,
            member_type: draft.member_type,
            year,
            class_name,
        })
    }

    /// Replace the editable fields, keeping the id.
    pub fn update(&mut self, draft: MemberDraft) -> Result<(), CoreError> {
        *self = Self::from_draft(self.id.clone(), draft)?;
        Ok(())
    }

    /// Whether this member is a student.
    #[must_use]
    pub fn is_student(&self) -> bool {
        self.member_type == MemberType::Student
    }

    /// Case-insensitive match against a recorded loan name.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.name == name.trim().to_uppercase()
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.member_type, self.year) {
            (MemberType::Student, Some(year)) => write!(
                f,
                "{} ({year} {})",
                self.name,
                self.class_name.as_deref().unwrap_or("-")
            ),
            _ => write!(f, "{} ({})", self.name, self.member_type),
        }
    }
}

/// Editable member fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDraft {
    /// Full name.
    pub name: String,
    /// Teacher or student.
    #[serde(rename = "type")]
    pub member_type: MemberType,
    /// Year, ignored for teachers. Students default to 1.
    pub year: Option<u8>,
    /// Class, ignored for teachers.
    pub class_name: Option<String>,
}

impl MemberDraft {
    /// Draft for a student.
    pub fn student(name: impl Into<String>, year: u8, class_name: Option<&str>) -> Self {
        Self {
            name: name.into(),
            member_type: MemberType::Student,
            year: Some(year),
            class_name: class_name.map(str::to_string),
        }
    }

    /// Draft for a teacher.
    pub fn teacher(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            member_type: MemberType::Teacher,
            year: None,
            class_name: None,
        }
    }
}
