//! Command implementations for CLI tools.
//!
//! Each module contains the full implementation for a command,
//! which can be invoked by thin wrapper binaries.

pub mod admin_cmd;
pub mod catalog_cmd;
pub mod common;
pub mod completions;
pub mod form_cmd;
pub mod loan_cmd;
pub mod report_cmd;
pub mod roster_cmd;
