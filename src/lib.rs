//! # nbcheck
//!
//! Validates an exercise notebook against its autograder: every
//! `%%solution` snippet must pass all of its autotests, and every
//! `%%submission` snippet must satisfy the check cell written after it.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Evaluating grading verdicts: solution and submission protocols, plus the
/// interpreter for check code
pub mod check;
/// Uploading notebooks to the grading service
pub mod client;
/// Run settings
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Finding solution and submission snippets in a master notebook
pub mod extract;
/// Driving a whole validation pass
pub mod harness;
/// Metadata blocks declared in markdown cells
pub mod metadata;
/// The notebook document model
pub mod notebook;
/// Building the notebook uploaded for one snippet
pub mod synthesize;
/// The grading service's response
pub mod verdict;
