//! Normalization of V-QUEST analysis output.
//!
//! The live HTTP submission to the service happens outside this crate; what
//! arrives here is its result directory. `table` parses the tab-delimited
//! tables, `extract` merges them into a submission document.

pub mod extract;
pub mod table;

pub use extract::{extract_submission, JUNCTION_FILE, PARAMETERS_FILE, SUMMARY_FILE};
pub use table::{TabTable, TableRow};
