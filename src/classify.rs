//! IGHV hypermutation classification.
//!
//! The threshold classifier maps one V-REGION identity percentage to a
//! mutation status; the cohort aggregator condenses a whole submission into
//! a single classification plus the sequence-quality flags that gate the
//! clinical wording.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::HypermutationCutoffs;
use crate::submission::SequenceRecord;
use crate::utils::num::round2;

// ============================================================================
// Per-sequence classification
// ============================================================================

/// Mutation status of a single sequence, always recomputed from the identity
/// percentage and the configured cutoffs, never stored as ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum MutationStatus {
    #[serde(rename = "M-CLL")]
    MCll,
    #[serde(rename = "U-CLL")]
    UCll,
    Borderline,
}

impl MutationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationStatus::MCll => "M-CLL",
            MutationStatus::UCll => "U-CLL",
            MutationStatus::Borderline => "Borderline",
        }
    }
}

/// Classify one V-REGION identity percentage.
///
/// Strict comparisons on both sides: a value exactly equal to either cutoff
/// is Borderline. Out-of-domain values (negative, >100) are not rejected
/// here; validating the 0-100 domain is the caller's job.
pub fn classify(identity_percent: f64, cutoffs: &HypermutationCutoffs) -> MutationStatus {
    if identity_percent < cutoffs.lower {
        MutationStatus::MCll
    } else if identity_percent > cutoffs.upper {
        MutationStatus::UCll
    } else {
        MutationStatus::Borderline
    }
}

// ============================================================================
// Cohort aggregation
// ============================================================================

/// Position of a whole submission relative to the borderline band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CohortClassification {
    /// Every identity strictly below the lower cutoff.
    AllHypermutated,
    /// Every identity strictly above the upper cutoff.
    AllUnmutated,
    /// Every identity within the closed borderline band.
    AllBorderline,
    /// Anything else; must never silently collapse into one of the above.
    Inconclusive,
}

/// Aggregated view of one submission's sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortCall {
    pub classification: CohortClassification,
    /// True iff every record is in frame (vacuously true when empty).
    pub fully_inframe: bool,
    /// True iff any record carries a stop codon (vacuously false when empty).
    pub any_stop_codon: bool,
    /// V-REGION identities rounded to two decimals, in record order.
    pub identities: Vec<f64>,
}

/// Aggregate the records of one submission.
///
/// Callers must guard the empty cohort before asking for a classification;
/// the quality flags are total, the classification is only meaningful for a
/// non-empty record set.
pub fn aggregate<'a, I>(records: I, cutoffs: &HypermutationCutoffs) -> CohortCall
where
    I: IntoIterator<Item = &'a SequenceRecord>,
{
    let mut fully_inframe = true;
    let mut any_stop_codon = false;
    let mut identities = Vec::new();

    for record in records {
        if !record.inframe {
            fully_inframe = false;
        }
        if record.stop_codon {
            any_stop_codon = true;
        }
        identities.push(round2(record.v_identity_percent));
    }

    let classification = if identities.iter().all(|v| *v > cutoffs.upper) {
        CohortClassification::AllUnmutated
    } else if identities.iter().all(|v| *v < cutoffs.lower) {
        CohortClassification::AllHypermutated
    } else if identities
        .iter()
        .all(|v| *v >= cutoffs.lower && *v <= cutoffs.upper)
    {
        CohortClassification::AllBorderline
    } else {
        CohortClassification::Inconclusive
    };

    CohortCall {
        classification,
        fully_inframe,
        any_stop_codon,
        identities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cutoffs(lower: f64, upper: f64) -> HypermutationCutoffs {
        HypermutationCutoffs::new(lower, upper).unwrap()
    }

    fn record(identity: f64, inframe: bool, stop_codon: bool) -> SequenceRecord {
        SequenceRecord {
            v_identity_percent: identity,
            inframe,
            stop_codon,
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_boundaries() {
        let c = cutoffs(97.0, 97.99);
        assert_eq!(classify(96.99, &c), MutationStatus::MCll);
        assert_eq!(classify(97.0, &c), MutationStatus::Borderline);
        assert_eq!(classify(97.5, &c), MutationStatus::Borderline);
        assert_eq!(classify(97.99, &c), MutationStatus::Borderline);
        assert_eq!(classify(98.0, &c), MutationStatus::UCll);
    }

    #[test]
    fn test_classify_out_of_domain_values_still_classify() {
        let c = cutoffs(97.0, 97.99);
        assert_eq!(classify(-1.0, &c), MutationStatus::MCll);
        assert_eq!(classify(250.0, &c), MutationStatus::UCll);
    }

    #[test]
    fn test_classify_degenerate_band() {
        // lower == upper leaves a single-point borderline band
        let c = cutoffs(98.0, 98.0);
        assert_eq!(classify(98.0, &c), MutationStatus::Borderline);
        assert_eq!(classify(97.999, &c), MutationStatus::MCll);
        assert_eq!(classify(98.001, &c), MutationStatus::UCll);
    }

    #[test]
    fn test_aggregate_uniform_cohorts() {
        let c = cutoffs(97.0, 97.99);

        let unmutated = [record(99.3, true, false), record(98.0, true, false)];
        let call = aggregate(unmutated.iter(), &c);
        assert_eq!(call.classification, CohortClassification::AllUnmutated);
        assert!(call.fully_inframe);
        assert!(!call.any_stop_codon);

        let mutated = [record(92.1, true, false), record(96.99, true, false)];
        let call = aggregate(mutated.iter(), &c);
        assert_eq!(call.classification, CohortClassification::AllHypermutated);

        let borderline = [record(97.0, true, false), record(97.99, true, false)];
        let call = aggregate(borderline.iter(), &c);
        assert_eq!(call.classification, CohortClassification::AllBorderline);
    }

    #[test]
    fn test_aggregate_mixed_is_inconclusive() {
        let c = cutoffs(97.0, 97.99);
        let mixed = [record(92.0, true, false), record(99.0, true, false)];
        let call = aggregate(mixed.iter(), &c);
        assert_eq!(call.classification, CohortClassification::Inconclusive);

        // A borderline value next to an unmutated one is also mixed
        let mixed = [record(97.5, true, false), record(99.0, true, false)];
        let call = aggregate(mixed.iter(), &c);
        assert_eq!(call.classification, CohortClassification::Inconclusive);
    }

    #[test]
    fn test_aggregate_flags() {
        let c = cutoffs(97.0, 97.99);
        let records = [record(99.0, true, false), record(99.0, false, true)];
        let call = aggregate(records.iter(), &c);
        assert!(!call.fully_inframe);
        assert!(call.any_stop_codon);

        // Vacuous flags on an empty record set
        let empty: [SequenceRecord; 0] = [];
        let call = aggregate(empty.iter(), &c);
        assert!(call.fully_inframe);
        assert!(!call.any_stop_codon);
        assert!(call.identities.is_empty());
    }

    #[test]
    fn test_aggregate_rounds_identities() {
        let c = cutoffs(97.0, 97.99);
        let records = [record(98.456, true, false)];
        let call = aggregate(records.iter(), &c);
        assert_eq!(call.identities, vec![98.46]);
    }

    #[test]
    fn test_classification_is_exhaustive_and_exclusive() {
        let c = cutoffs(97.0, 97.99);
        for &v in &[0.0, 96.99, 97.0, 97.5, 97.99, 98.0, 100.0] {
            let records = [record(v, true, false)];
            let call = aggregate(records.iter(), &c);
            let expected = match classify(round2(v), &c) {
                MutationStatus::MCll => CohortClassification::AllHypermutated,
                MutationStatus::UCll => CohortClassification::AllUnmutated,
                MutationStatus::Borderline => CohortClassification::AllBorderline,
            };
            assert_eq!(call.classification, expected, "identity {}", v);
        }
    }
}
