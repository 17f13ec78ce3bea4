//! CLL subset resolution.
//!
//! Each sequence may carry a subset label from a small fixed set (e.g. "#2",
//! "#8"). A submission collapses to zero, one or conflicting assignments;
//! conflicting labels are a valid clinical state, not an error.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::submission::SequenceRecord;

/// Outcome of collapsing the subset labels of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "decision", content = "subset", rename_all = "snake_case")]
pub enum SubsetDecision {
    /// No record carries a subset label.
    NoAssignment,
    /// Every labeled record agrees on one subset.
    Assigned(String),
    /// Two or more distinct labels across the submission.
    Conflicting,
}

impl SubsetDecision {
    /// The resolved label, present only for a unique assignment.
    pub fn label(&self) -> Option<&str> {
        match self {
            SubsetDecision::Assigned(label) => Some(label),
            _ => None,
        }
    }
}

/// Collapse the distinct non-null subset labels of a record set.
pub fn resolve_subset<'a, I>(records: I) -> SubsetDecision
where
    I: IntoIterator<Item = &'a SequenceRecord>,
{
    let mut labels: Vec<&str> = Vec::new();
    for record in records {
        if let Some(label) = record.cll_subset.as_deref() {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
    }

    match labels.len() {
        0 => SubsetDecision::NoAssignment,
        1 => SubsetDecision::Assigned(labels[0].to_string()),
        _ => SubsetDecision::Conflicting,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subset: Option<&str>) -> SequenceRecord {
        SequenceRecord {
            cll_subset: subset.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_and_unlabeled() {
        let empty: [SequenceRecord; 0] = [];
        assert_eq!(resolve_subset(empty.iter()), SubsetDecision::NoAssignment);

        let unlabeled = [record(None), record(None)];
        assert_eq!(
            resolve_subset(unlabeled.iter()),
            SubsetDecision::NoAssignment
        );
    }

    #[test]
    fn test_unique_assignment() {
        let records = [record(Some("#2")), record(Some("#2")), record(None)];
        assert_eq!(
            resolve_subset(records.iter()),
            SubsetDecision::Assigned("#2".to_string())
        );
        assert_eq!(resolve_subset(records.iter()).label(), Some("#2"));
    }

    #[test]
    fn test_conflicting_assignment() {
        let records = [record(Some("#2")), record(Some("#8"))];
        assert_eq!(resolve_subset(records.iter()), SubsetDecision::Conflicting);
        assert_eq!(resolve_subset(records.iter()).label(), None);
    }
}
