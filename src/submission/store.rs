//! Submission document storage.
//!
//! The report pipeline talks to storage through the [`SubmissionStore`]
//! trait so the core stays testable without a live document database.
//! [`JsonFileStore`] is the bundled implementation: one JSON file per
//! submission under `<root>/<sample_id>/<submission_id>.json`, replaced
//! wholesale on save.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{CllError, CllResult};

use super::types::SubmissionResult;

/// Storage collaborator for submission documents.
pub trait SubmissionStore {
    /// Load a submission document, or None if it was never saved.
    fn load(&self, sample_id: &str, submission_id: &str) -> CllResult<Option<SubmissionResult>>;

    /// Save a submission document, replacing any previous version.
    fn save(
        &self,
        sample_id: &str,
        submission_id: &str,
        result: &SubmissionResult,
    ) -> CllResult<()>;
}

/// Document store backed by per-submission JSON files.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, sample_id: &str, submission_id: &str) -> PathBuf {
        self.root
            .join(sample_id)
            .join(format!("{}.json", submission_id))
    }
}

impl SubmissionStore for JsonFileStore {
    fn load(&self, sample_id: &str, submission_id: &str) -> CllResult<Option<SubmissionResult>> {
        let path = self.document_path(sample_id, submission_id);
        if !Path::new(&path).exists() {
            return Ok(None);
        }
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let result: SubmissionResult = serde_json::from_reader(reader).map_err(|e| {
            CllError::parse(&path.display().to_string(), 0, e.to_string())
        })?;
        Ok(Some(result))
    }

    fn save(
        &self,
        sample_id: &str,
        submission_id: &str,
        result: &SubmissionResult,
    ) -> CllResult<()> {
        let path = self.document_path(sample_id, submission_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, result).map_err(|e| {
            CllError::Io(std::io::Error::other(format!(
                "Failed to write submission document {}: {}",
                path.display(),
                e
            )))
        })?;
        info!(
            "Submission document written to {} ({} sequences)",
            path.display(),
            result.records.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("cllgenie-store-test-{}", nanos))
    }

    #[test]
    fn test_save_load_replace() {
        let root = scratch_dir();
        let store = JsonFileStore::new(&root);

        assert!(store.load("sample1", "submission_1").unwrap().is_none());

        let mut result = SubmissionResult::default();
        result
            .parameters
            .insert("Species".to_string(), "Homo sapiens".to_string());
        store.save("sample1", "submission_1", &result).unwrap();

        let loaded = store.load("sample1", "submission_1").unwrap().unwrap();
        assert_eq!(loaded.parameters["Species"], "Homo sapiens");

        // Whole-document replace semantics
        let mut replacement = SubmissionResult::default();
        replacement
            .parameters
            .insert("Species".to_string(), "Homo sapiens (updated)".to_string());
        store.save("sample1", "submission_1", &replacement).unwrap();
        let loaded = store.load("sample1", "submission_1").unwrap().unwrap();
        assert_eq!(loaded.parameters["Species"], "Homo sapiens (updated)");

        fs::remove_dir_all(&root).unwrap();
    }
}
