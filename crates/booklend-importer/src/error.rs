//! Import errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while extracting roster rows.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The extraction service failed or returned something unusable.
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// The input contained no student names.
    #[error("no rows extracted")]
    NoRowsExtracted,

    /// A file type no importer handles.
    #[error("unsupported roster file: {0}")]
    UnsupportedFile(String),

    /// Documents need an extraction service and none is configured.
    #[error("no extraction service configured for {0}")]
    NoExtractor(String),

    /// A CSV roster is missing a required column.
    #[error("missing column {0}")]
    MissingColumn(&'static str),

    /// A built-in pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(regex::Error),

    /// A CSV roster could not be read.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Reading the input file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
