//! Clinical report composition.
//!
//! Builds the multi-paragraph Swedish summary for one submission, plus the
//! per-sequence table view the rendered report shows. Composition is pure:
//! everything is derived from the submission document and the configured
//! cutoffs, and branch selection runs on typed classification values, never
//! on re-inspection of already-composed prose.

pub mod text;

use indexmap::IndexMap;
use log::info;
use serde::Serialize;

use crate::classify::{aggregate, classify, CohortClassification, MutationStatus};
use crate::config::HypermutationCutoffs;
use crate::error::CllResult;
use crate::submission::SubmissionResult;
use crate::subset::{resolve_subset, SubsetDecision};
use crate::utils::num::format_identity;
use crate::vquest::TableRow;

/// Summary columns shown in the rendered report table, in display order.
/// The laboratory's accreditation covers exactly this set.
pub const REPORT_SUMMARY_COLUMNS: [&str; 25] = [
    "V-DOMAIN Functionality",
    "V-GENE and allele",
    "V-REGION score",
    "V-REGION identity %",
    "V-REGION identity nt",
    "V-REGION identity % (with ins/del events)",
    "V-REGION identity nt (with ins/del events)",
    "V-REGION potential ins/del",
    "J-GENE and allele",
    "J-REGION score",
    "J-REGION identity %",
    "J-REGION identity nt",
    "D-GENE and allele",
    "D-REGION reading frame",
    "CDR-IMGT lengths",
    "FR-IMGT lengths",
    "AA JUNCTION",
    "V-DOMAIN Functionality comment",
    "V-REGION insertions",
    "V-REGION deletions",
    "Analysed sequence length",
    "Sequence analysis category",
    "CLL subset",
    "Merge Count",
    "Total Reads Per",
];

/// Junction columns shown in the rendered report table.
pub const REPORT_JUNCTION_COLUMNS: [&str; 2] = ["JUNCTION-nt nb", "JUNCTION decryption"];

/// Structured report output for one submission.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload {
    /// The composed multi-paragraph summary.
    pub summary: String,
    /// Declared number of submitted sequences.
    pub submitted_count: usize,
    /// Whole-cohort classification.
    pub cohort: CohortClassification,
    /// Per-sequence mutation status, in record order.
    pub mutation_status: IndexMap<String, MutationStatus>,
    /// Resolved subset decision.
    pub subset: SubsetDecision,
    /// Rounded V-REGION identities, in record order.
    pub identities: Vec<f64>,
    /// Per-sequence whitelisted table view for rendering.
    pub table: IndexMap<String, TableRow>,
}

fn push_paragraph(out: &mut String, paragraph: &str) {
    out.push_str(paragraph);
    out.push_str("\n\n");
}

fn identity_list(identities: &[f64]) -> String {
    identities
        .iter()
        .map(|v| format_identity(*v))
        .collect::<Vec<_>>()
        .join("%, ")
}

/// Compose the report summary text for a submission.
///
/// Returns `Ok(None)` when the submission has no analyzed sequences at all:
/// no clinical statement can be made and the caller surfaces an explicit
/// "no report" state instead of a partially correct one.
pub fn compose_summary(
    submission: &SubmissionResult,
    cutoffs: &HypermutationCutoffs,
) -> CllResult<Option<String>> {
    if submission.records.is_empty() {
        return Ok(None);
    }

    let submitted_count = submission.submitted_count()?;
    let cohort = aggregate(submission.records.values(), cutoffs);
    let subset = resolve_subset(submission.records.values());

    let mut summary = String::with_capacity(2048);
    push_paragraph(&mut summary, text::METHODOLOGY);

    if submitted_count == 0 {
        push_paragraph(&mut summary, text::ZERO_COUNT);
    } else if submitted_count == 1 {
        if !cohort.fully_inframe || cohort.any_stop_codon {
            push_paragraph(&mut summary, text::SINGLE_NON_FUNCTIONAL);
        } else {
            push_paragraph(&mut summary, text::SINGLE_FUNCTIONAL);
        }
    } else {
        let tables = (1..=submitted_count)
            .map(|n| format!("Seq{}", n))
            .collect::<Vec<_>>()
            .join(", ");
        let paragraph = text::multi_functional(text::number_word(submitted_count)?, &tables);
        push_paragraph(&mut summary, &paragraph);
    }

    // Hypermutation, subset and guidance paragraphs only apply to a
    // non-empty, fully functional cohort.
    if submitted_count > 0 && cohort.fully_inframe && !cohort.any_stop_codon {
        let identities = identity_list(&cohort.identities);
        let hyper = text::hypermutation_paragraph(
            cohort.classification,
            submission.records.len(),
            &identities,
        )?;
        push_paragraph(&mut summary, &hyper);
        push_paragraph(&mut summary, &text::subset_paragraph(&subset));

        if let Some(guidance) = text::guidance_sentence(cohort.classification) {
            push_paragraph(&mut summary, guidance);
        }
        if let Some(prognosis) = text::subset_prognosis(&subset) {
            push_paragraph(&mut summary, prognosis);
        }
    }

    Ok(Some(summary))
}

/// Per-sequence table view restricted to the report column whitelist.
///
/// Columns absent from a record are simply omitted, matching how the
/// instrument output varies between runs.
pub fn report_table(submission: &SubmissionResult) -> IndexMap<String, TableRow> {
    let mut table = IndexMap::with_capacity(submission.records.len());
    for (sequence_id, record) in &submission.records {
        let mut row: TableRow = IndexMap::new();
        for column in REPORT_SUMMARY_COLUMNS {
            if let Some(value) = record.summary.get(column) {
                row.insert(column.to_string(), value.clone());
            }
        }
        for column in REPORT_JUNCTION_COLUMNS {
            if let Some(value) = record.junction.get(column) {
                row.insert(column.to_string(), value.clone());
            }
        }
        table.insert(sequence_id.clone(), row);
    }
    table
}

/// Build the full structured report for a submission, or None when no
/// report can be produced.
pub fn build_report(
    submission: &SubmissionResult,
    cutoffs: &HypermutationCutoffs,
) -> CllResult<Option<ReportPayload>> {
    let summary = match compose_summary(submission, cutoffs)? {
        Some(summary) => summary,
        None => {
            info!("Submission has no analyzed sequences; no report produced");
            return Ok(None);
        }
    };

    let cohort = aggregate(submission.records.values(), cutoffs);
    let mutation_status: IndexMap<String, MutationStatus> = submission
        .records
        .iter()
        .map(|(id, record)| {
            (
                id.clone(),
                classify(crate::utils::num::round2(record.v_identity_percent), cutoffs),
            )
        })
        .collect();

    Ok(Some(ReportPayload {
        summary,
        submitted_count: submission.submitted_count()?,
        cohort: cohort.classification,
        mutation_status,
        subset: resolve_subset(submission.records.values()),
        identities: cohort.identities,
        table: report_table(submission),
    }))
}
