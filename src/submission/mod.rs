//! Submission document model for this crate
//!
//! This module provides:
//! - `SubmissionResult` / `SequenceRecord`: the per-submission document
//! - `schema`: JSON Schema generation and runtime validation
//! - `SubmissionStore`: the storage collaborator trait and its JSON-file
//!   implementation

pub mod schema;
pub mod store;
pub mod types;

pub use store::{JsonFileStore, SubmissionStore};
pub use types::{ExtractionInfo, SequenceRecord, SubmissionResult, SUBMITTED_SEQUENCES_PARAM};
