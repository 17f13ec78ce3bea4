//! Persisted submission document types.
//!
//! One `SubmissionResult` exists per V-QUEST submission. It is created once
//! by result extraction, read many times for reporting, and replaced
//! wholesale on update; nothing mutates it in place.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{CllError, CllResult};

/// Parameter naming the number of sequences sent to the analysis service.
pub const SUBMITTED_SEQUENCES_PARAM: &str = "Number of submitted sequences";

// ============================================================================
// Per-sequence record
// ============================================================================

/// One analyzed sequence, immutable once produced by extraction.
///
/// The typed fields are derived at extraction time so classification and
/// report composition never re-parse instrument strings; `summary` and
/// `junction` keep the raw column/value pairs for the rendered report table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SequenceRecord {
    /// Sequence identifier from the instrument export (e.g. "Seq1").
    pub sequence_id: String,

    /// V-REGION identity %, decimal-comma normalized and parsed.
    pub v_identity_percent: f64,

    /// Whether the rearrangement is in frame.
    pub inframe: bool,

    /// Whether the rearrangement carries a stop codon.
    pub stop_codon: bool,

    /// CLL subset label, when assigned (e.g. "#2", "#8").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cll_subset: Option<String>,

    /// Raw summary-table columns for this sequence; empty cells are None.
    pub summary: IndexMap<String, Option<String>>,

    /// Raw junction-table columns for this sequence; empty cells are None.
    pub junction: IndexMap<String, Option<String>>,
}

// ============================================================================
// Submission document
// ============================================================================

/// Provenance recorded when a submission document is extracted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionInfo {
    /// Timestamp of extraction (ISO 8601).
    pub timestamp: String,

    /// Version of the extraction tool.
    pub tool_version: String,

    /// Directory the analysis result files were read from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<String>,
}

/// The whole-submission document: analysis parameters plus one record per
/// sequence, keyed and ordered by sequence identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SubmissionResult {
    /// Analysis parameter name -> value, as reported by the service.
    pub parameters: IndexMap<String, String>,

    /// Sequence identifier -> record, in summary-table order.
    pub records: IndexMap<String, SequenceRecord>,

    /// Extraction provenance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionInfo>,
}

impl SubmissionResult {
    /// The declared number of submitted sequences.
    ///
    /// A missing or non-numeric parameter is a parse failure, not a silent
    /// zero: the count drives the clinical wording.
    pub fn submitted_count(&self) -> CllResult<usize> {
        let raw = self.parameters.get(SUBMITTED_SEQUENCES_PARAM).ok_or_else(|| {
            CllError::parse(
                "vquest parameters",
                0,
                format!("missing parameter '{}'", SUBMITTED_SEQUENCES_PARAM),
            )
        })?;
        raw.trim().parse::<usize>().map_err(|e| {
            CllError::parse(
                "vquest parameters",
                0,
                format!("'{}' is not a count: {}", raw, e),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submitted_count() {
        let mut result = SubmissionResult::default();
        assert!(result.submitted_count().is_err());

        result
            .parameters
            .insert(SUBMITTED_SEQUENCES_PARAM.to_string(), "2".to_string());
        assert_eq!(result.submitted_count().unwrap(), 2);

        result
            .parameters
            .insert(SUBMITTED_SEQUENCES_PARAM.to_string(), "many".to_string());
        assert!(result.submitted_count().is_err());
    }

    #[test]
    fn test_document_roundtrip() {
        let mut result = SubmissionResult::default();
        result
            .parameters
            .insert(SUBMITTED_SEQUENCES_PARAM.to_string(), "1".to_string());
        let mut record = SequenceRecord {
            sequence_id: "Seq1".to_string(),
            v_identity_percent: 96.43,
            inframe: true,
            stop_codon: false,
            cll_subset: Some("#2".to_string()),
            ..Default::default()
        };
        record
            .summary
            .insert("V-GENE and allele".to_string(), Some("IGHV3-21*01".to_string()));
        record.junction.insert("JUNCTION-nt nb".to_string(), None);
        result.records.insert("Seq1".to_string(), record);

        let json = serde_json::to_string(&result).unwrap();
        let back: SubmissionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.records.len(), 1);
        let rec = &back.records["Seq1"];
        assert_eq!(rec.v_identity_percent, 96.43);
        assert_eq!(rec.cll_subset.as_deref(), Some("#2"));
        assert_eq!(
            rec.summary["V-GENE and allele"].as_deref(),
            Some("IGHV3-21*01")
        );
        assert!(rec.junction["JUNCTION-nt nb"].is_none());
    }
}
