//! Full-state backup documents.
//!
//! A backup holds the five entity containers plus a version tag and the
//! export time. Restoring replaces the containers wholesale; there is no
//! merge and no migration beyond checking that every container is present.

use booklend_core::{Book, ClassConfig, Ledger, Member, PersistentForms};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::StoreError;

/// Version tag written into every backup.
pub const BACKUP_VERSION: &str = "booklend-backup/1";

/// Containers a backup must carry, with whether each is a JSON array.
const REQUIRED: [(&str, bool); 5] = [
    ("books", true),
    ("members", true),
    ("classes", false),
    ("transactions", true),
    ("persistentForms", false),
];

/// A full-state export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    /// Format tag.
    pub version: String,
    /// Local timestamp of the export.
    pub exported_at: String,
    /// Book catalog.
    pub books: Vec<Book>,
    /// Roster.
    pub members: Vec<Member>,
    /// Class registry.
    pub classes: ClassConfig,
    /// Ledger, most recent first.
    pub transactions: Ledger,
    /// Stored form entries.
    pub persistent_forms: PersistentForms,
}

impl Backup {
    /// Parse a backup, checking that every container is present and has
    /// the right JSON shape before decoding.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| StoreError::InvalidBackup(e.to_string()))?;
        let Some(object) = value.as_object() else {
            return Err(StoreError::InvalidBackup(
                "document is not a JSON object".to_string(),
            ));
        };
        for (key, is_array) in REQUIRED {
            match object.get(key) {
                None => {
                    return Err(StoreError::InvalidBackup(format!("missing {key}")));
                }
                Some(v) if is_array && !v.is_array() => {
                    return Err(StoreError::InvalidBackup(format!("{key} is not a list")));
                }
                Some(v) if !is_array && !v.is_object() => {
                    return Err(StoreError::InvalidBackup(format!("{key} is not a map")));
                }
                Some(_) => {}
            }
        }
        let mut object = object.clone();
        object
            .entry("version")
            .or_insert_with(|| Value::String(String::new()));
        object
            .entry("exportedAt")
            .or_insert_with(|| Value::String(String::new()));
        serde_json::from_value(Value::Object(object))
            .map_err(|e| StoreError::InvalidBackup(e.to_string()))
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(|source| StoreError::Encode {
            key: "backup".to_string(),
            source,
        })
    }
}
