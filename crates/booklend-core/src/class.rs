//! Registered class names per school year.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{check_year, normalize_name, CoreError};

/// Class names registered for each year.
///
/// Names are stored upper-cased, unique within a year and kept sorted.
/// Removing a class never touches members assigned to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassConfig {
    years: BTreeMap<u8, Vec<String>>,
}

impl ClassConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, rejecting duplicates within the year.
    ///
    /// ```
    /// use booklend_core::{ClassConfig, CoreError};
    ///
    /// let mut classes = ClassConfig::new();
    /// classes.add(1, "amanah").unwrap();
    /// assert!(matches!(classes.add(1, " Amanah "), Err(CoreError::DuplicateClass { .. })));
    /// assert_eq!(classes.classes(1), ["AMANAH"]);
    /// ```
    pub fn add(&mut self, year: u8, name: &str) -> Result<String, CoreError> {
        let year = check_year(year)?;
        let name = normalize_name(name, "class name")?;
        if self.contains(year, &name) {
            return Err(CoreError::DuplicateClass { year, class: name });
        }
        self.insert_sorted(year, name.clone());
        Ok(name)
    }

    /// Register a class if it is missing. Returns true when it was inserted.
    ///
    /// Invalid years and blank names are ignored.
    pub fn ensure(&mut self, year: u8, name: &str) -> bool {
        self.add(year, name).is_ok()
    }

    /// Remove a class. Returns true when it was registered.
    pub fn remove(&mut self, year: u8, name: &str) -> bool {
        let name = name.trim().to_uppercase();
        let Some(names) = self.years.get_mut(&year) else {
            return false;
        };
        let before = names.len();
        names.retain(|n| *n != name);
        before != names.len()
    }

    /// Check whether a class is registered for a year.
    #[must_use]
    pub fn contains(&self, year: u8, name: &str) -> bool {
        let name = name.trim().to_uppercase();
        self.classes(year).iter().any(|n| *n == name)
    }

    /// Registered classes for a year, sorted.
    #[must_use]
    pub fn classes(&self, year: u8) -> &[String] {
        self.years.get(&year).map_or(&[], Vec::as_slice)
    }

    /// Iterate years that have at least one class.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[String])> {
        self.years
            .iter()
            .filter(|(_, names)| !names.is_empty())
            .map(|(year, names)| (*year, names.as_slice()))
    }

    fn insert_sorted(&mut self, year: u8, name: String) {
        let names = self.years.entry(year).or_default();
        names.push(name);
        names.sort();
        names.dedup();
    }
}
