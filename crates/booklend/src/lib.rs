//! Textbook loan CLI tools.
//!
//! This crate provides command-line tools for running a school textbook
//! loan scheme:
//!
//! - `booklend-loan`: Borrow, return and damage actions; fine settlement
//! - `booklend-catalog`: Manage the book catalog
//! - `booklend-roster`: Members, classes, roster import and promotion
//! - `booklend-form`: View, edit and print loan forms
//! - `booklend-report`: Stock and fine reports, ledger CSV export
//! - `booklend-admin`: Backup, restore and school settings
//!
//! # Example Usage
//!
//! ```bash
//! booklend-roster import kelas.txt
//! booklend-loan borrow SN1 "Ali bin Abu"
//! booklend-report fines
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod report;
