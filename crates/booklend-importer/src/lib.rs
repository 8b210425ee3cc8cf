//! Roster import for booklend
//!
//! This crate turns class lists into staged [`RosterRow`]s. Nothing here
//! touches the store: the caller reviews the rows and commits them with
//! `Store::confirm_import`.
//!
//! # Sources
//!
//! - Pasted text, parsed locally by [`parse_text`]
//! - `Name,Year,Class` CSV files, parsed locally by [`parse_csv`]
//! - Images and PDFs, sent to a [`RosterExtractor`]
//!
//! # Example
//!
//! ```
//! use booklend_importer::RosterImporter;
//!
//! let importer = RosterImporter::new();
//! let staged = importer.import_text("Year 1 Amanah\n1. Ali\n2. Siti").unwrap();
//! assert_eq!(staged.rows.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod csv_roster;
mod error;
pub mod extractor;
pub mod text;

use std::fs;
use std::path::Path;

use booklend_core::RosterRow;

pub use config::ExtractorConfig;
pub use csv_roster::parse_csv;
pub use error::ImportError;
pub use extractor::{encode_document, map_extracted, ExtractedMember, HttpExtractor, RosterExtractor};
pub use text::parse_text;

/// Rows staged by an import, awaiting confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Extracted rows, in source order.
    pub rows: Vec<RosterRow>,
    /// Problems that did not stop the import.
    pub warnings: Vec<String>,
}

impl ImportResult {
    /// Create a result with rows.
    #[must_use]
    pub const fn new(rows: Vec<RosterRow>) -> Self {
        Self {
            rows,
            warnings: Vec::new(),
        }
    }

    /// Create an empty result.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Add a warning.
    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Kind of roster file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Plain text class list.
    Text,
    /// CSV roster.
    Csv,
    /// Image or PDF for the extraction service, with its MIME type.
    Document(&'static str),
}

impl SourceKind {
    /// Identify a file by its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Some(match ext.as_str() {
            "txt" | "text" => Self::Text,
            "csv" => Self::Csv,
            "pdf" => Self::Document("application/pdf"),
            "png" => Self::Document("image/png"),
            "jpg" | "jpeg" => Self::Document("image/jpeg"),
            "webp" => Self::Document("image/webp"),
            "gif" => Self::Document("image/gif"),
            _ => return None,
        })
    }
}

/// Dispatches roster files to the right parser or extractor.
#[derive(Default)]
pub struct RosterImporter {
    extractor: Option<Box<dyn RosterExtractor>>,
}

impl RosterImporter {
    /// An importer for local formats only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an extraction service for documents.
    #[must_use]
    pub fn with_extractor(mut self, extractor: impl RosterExtractor + 'static) -> Self {
        self.extractor = Some(Box::new(extractor));
        self
    }

    /// Whether documents can be imported.
    #[must_use]
    pub fn has_extractor(&self) -> bool {
        self.extractor.is_some()
    }

    /// Parse a pasted class list.
    pub fn import_text(&self, input: &str) -> Result<ImportResult, ImportError> {
        parse_text(input)
    }

    /// Send a document to the extraction service.
    ///
    /// A service answer with no usable rows is
    /// [`ImportError::NoRowsExtracted`].
    pub fn import_document(&self, bytes: &[u8], mime_type: &str) -> Result<ImportResult, ImportError> {
        let extractor = self
            .extractor
            .as_deref()
            .ok_or_else(|| ImportError::NoExtractor(mime_type.to_string()))?;
        let members = extractor.extract_members(&encode_document(bytes), mime_type)?;
        let result = map_extracted(members);
        if result.rows.is_empty() {
            return Err(ImportError::NoRowsExtracted);
        }
        tracing::info!(
            extractor = extractor.name(),
            rows = result.rows.len(),
            warnings = result.warnings.len(),
            "document roster extracted"
        );
        Ok(result)
    }

    /// Import a file, choosing the parser by extension.
    pub fn import_file(&self, path: &Path) -> Result<ImportResult, ImportError> {
        let kind = SourceKind::from_path(path)
            .ok_or_else(|| ImportError::UnsupportedFile(path.display().to_string()))?;
        let io_err = |source: std::io::Error| ImportError::Io {
            path: path.to_path_buf(),
            source,
        };
        match kind {
            SourceKind::Text => parse_text(&fs::read_to_string(path).map_err(io_err)?),
            SourceKind::Csv => parse_csv(&fs::read_to_string(path).map_err(io_err)?),
            SourceKind::Document(mime) => {
                self.import_document(&fs::read(path).map_err(io_err)?, mime)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct CannedExtractor(Vec<ExtractedMember>);

    impl RosterExtractor for CannedExtractor {
        fn name(&self) -> &str {
            "canned"
        }

        fn extract_members(
            &self,
            data_base64: &str,
            mime_type: &str,
        ) -> Result<Vec<ExtractedMember>, ImportError> {
            assert_eq!(mime_type, "image/png");
            assert_eq!(data_base64, encode_document(b"scan"));
            Ok(self.0.clone())
        }
    }

    struct FailingExtractor;

    impl RosterExtractor for FailingExtractor {
        fn name(&self) -> &str {
            "failing"
        }

        fn extract_members(&self, _: &str, _: &str) -> Result<Vec<ExtractedMember>, ImportError> {
            Err(ImportError::ExtractionFailed("service unavailable".to_string()))
        }
    }

    // ===== ImportResult Tests =====

    #[test]
    fn test_import_result_with_warning() {
        let result = ImportResult::empty().with_warning("Row 1: no usable name");
        assert!(result.rows.is_empty());
        assert_eq!(result.warnings, ["Row 1: no usable name"]);
    }

    // ===== SourceKind Tests =====

    #[test]
    fn test_source_kind_from_path() {
        assert_eq!(SourceKind::from_path(Path::new("a.TXT")), Some(SourceKind::Text));
        assert_eq!(SourceKind::from_path(Path::new("a.csv")), Some(SourceKind::Csv));
        assert_eq!(
            SourceKind::from_path(Path::new("scan.JPG")),
            Some(SourceKind::Document("image/jpeg"))
        );
        assert_eq!(SourceKind::from_path(Path::new("a.docx")), None);
        assert_eq!(SourceKind::from_path(&PathBuf::from("noext")), None);
    }

    // ===== Document Tests =====

    #[test]
    fn test_document_import() {
        let importer = RosterImporter::new().with_extractor(CannedExtractor(vec![ExtractedMember {
            name: "ali".to_string(),
            year: Some(2),
            class_name: Some("bestari".to_string()),
        }]));
        let result = importer.import_document(b"scan", "image/png").unwrap();
        assert_eq!(result.rows, [RosterRow::new("ALI", 2, "BESTARI")]);
    }

    #[test]
    fn test_document_without_extractor() {
        let importer = RosterImporter::new();
        assert!(!importer.has_extractor());
        let err = importer.import_document(b"scan", "image/png").unwrap_err();
        assert!(matches!(err, ImportError::NoExtractor(_)));
    }

    #[test]
    fn test_extraction_failure_surfaces() {
        let importer = RosterImporter::new().with_extractor(FailingExtractor);
        let err = importer.import_document(b"scan", "image/png").unwrap_err();
        assert!(matches!(err, ImportError::ExtractionFailed(_)));
    }

    #[test]
    fn test_empty_extraction() {
        let importer = RosterImporter::new().with_extractor(CannedExtractor(Vec::new()));
        let err = importer.import_document(b"scan", "image/png").unwrap_err();
        assert!(matches!(err, ImportError::NoRowsExtracted));
    }
}
