//! Result extraction from the analysis service's flat files.
//!
//! Each submission produces three tab-delimited files: a key/value parameter
//! file, a per-sequence summary table and a per-sequence junction table.
//! Extraction normalizes them into one [`SubmissionResult`]: rows merged by
//! sequence id, numeric fields parsed (decimal commas normalized), quality
//! flags derived. Failures are hard: a missing file, malformed content or a
//! summary sequence without its junction row never yields a partial document.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};

use crate::error::{CllError, CllResult};
use crate::submission::{ExtractionInfo, SequenceRecord, SubmissionResult};
use crate::utils::num::parse_decimal;
use crate::utils::time::utc_now_iso8601;

use super::table::{group_by_id, read_table, TableRow};

/// File names inside a V-QUEST result directory.
pub const PARAMETERS_FILE: &str = "11_Parameters.txt";
pub const SUMMARY_FILE: &str = "1_Summary.txt";
pub const JUNCTION_FILE: &str = "6_Junction.txt";

/// Columns consumed for typed record fields.
pub const SEQUENCE_ID_COLUMN: &str = "Sequence ID";
pub const V_IDENTITY_COLUMN: &str = "V-REGION identity %";
pub const FUNCTIONALITY_COLUMN: &str = "V-DOMAIN Functionality";
pub const FUNCTIONALITY_COMMENT_COLUMN: &str = "V-DOMAIN Functionality comment";
pub const SUBSET_COLUMN: &str = "CLL subset";

/// Parse the key/value parameter file.
///
/// The "Date" line and the "Nb of nucleotides..." counters are bookkeeping
/// the report never shows; everything else is kept verbatim.
pub fn read_parameters<R: BufRead>(
    reader: R,
    file_label: &str,
) -> CllResult<IndexMap<String, String>> {
    let mut parameters = IndexMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, '\t');
        let key = parts.next().unwrap_or("").trim();
        if key == "Date" || key.starts_with("Nb of nucleotides") {
            continue;
        }
        let value = parts.next().ok_or_else(|| {
            CllError::parse(
                file_label,
                i + 1,
                format!("parameter '{}' has no value", key),
            )
        })?;
        parameters.insert(key.to_string(), value.trim().to_string());
    }

    Ok(parameters)
}

/// Derive the in-frame and stop-codon flags from the IMGT functionality
/// columns. "productive" means in frame with no stop codon; anything else is
/// judged by its comment. A record with no functionality call is treated as
/// non-functional, matching how the report handles unusable submissions.
fn derive_quality_flags(summary: &TableRow) -> (bool, bool) {
    let functionality = summary
        .get(FUNCTIONALITY_COLUMN)
        .and_then(|v| v.as_deref())
        .map(|s| s.to_ascii_lowercase());
    let comment = summary
        .get(FUNCTIONALITY_COMMENT_COLUMN)
        .and_then(|v| v.as_deref())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    match functionality.as_deref() {
        Some(f) if f.starts_with("productive") => (true, false),
        Some(_) => {
            let inframe =
                !(comment.contains("out-of-frame") || comment.contains("frameshift"));
            let stop_codon = comment.contains("stop codon");
            (inframe, stop_codon)
        }
        None => (false, true),
    }
}

fn build_record(
    sequence_id: &str,
    summary: TableRow,
    junction: TableRow,
) -> CllResult<SequenceRecord> {
    let raw_identity = summary
        .get(V_IDENTITY_COLUMN)
        .and_then(|v| v.as_deref())
        .ok_or_else(|| {
            CllError::parse(
                SUMMARY_FILE,
                0,
                format!("sequence {} has no '{}'", sequence_id, V_IDENTITY_COLUMN),
            )
        })?;
    let v_identity_percent = parse_decimal(raw_identity).map_err(|e| {
        CllError::parse(
            SUMMARY_FILE,
            0,
            format!(
                "sequence {}: '{}' is not a valid identity percentage: {}",
                sequence_id, raw_identity, e
            ),
        )
    })?;

    let (inframe, stop_codon) = derive_quality_flags(&summary);
    let cll_subset = summary
        .get(SUBSET_COLUMN)
        .and_then(|v| v.as_deref())
        .map(|s| s.to_string());

    Ok(SequenceRecord {
        sequence_id: sequence_id.to_string(),
        v_identity_percent,
        inframe,
        stop_codon,
        cll_subset,
        summary,
        junction,
    })
}

/// Build a submission document from already-open readers.
///
/// Every sequence id in the summary table must have a junction row; a
/// missing counterpart aborts the whole extraction rather than dropping the
/// sequence from a clinical report.
pub fn extract_from_readers<P, S, J>(
    parameters: P,
    summary: S,
    junction: J,
) -> CllResult<SubmissionResult>
where
    P: BufRead,
    S: BufRead,
    J: BufRead,
{
    let parameters = read_parameters(parameters, PARAMETERS_FILE)?;

    let summary_table = read_table(summary, SUMMARY_FILE)?;
    let summary_rows = group_by_id(&summary_table, SEQUENCE_ID_COLUMN, SUMMARY_FILE)?;

    let junction_table = read_table(junction, JUNCTION_FILE)?;
    let mut junction_rows = group_by_id(&junction_table, SEQUENCE_ID_COLUMN, JUNCTION_FILE)?;

    let mut records = IndexMap::with_capacity(summary_rows.len());
    for (sequence_id, summary_row) in summary_rows {
        let junction_row = junction_rows
            .shift_remove(&sequence_id)
            .ok_or_else(|| CllError::IncompleteCohort(sequence_id.clone()))?;
        let record = build_record(&sequence_id, summary_row, junction_row)?;
        debug!(
            "Extracted {}: identity {:.2}%, inframe={}, stop_codon={}, subset={:?}",
            sequence_id,
            record.v_identity_percent,
            record.inframe,
            record.stop_codon,
            record.cll_subset
        );
        records.insert(sequence_id, record);
    }

    Ok(SubmissionResult {
        parameters,
        records,
        extraction: None,
    })
}

fn open(dir: &Path, name: &str) -> CllResult<BufReader<File>> {
    let path = dir.join(name);
    if !path.exists() {
        return Err(CllError::MissingInputFile(path));
    }
    Ok(BufReader::new(File::open(&path)?))
}

/// Extract a submission document from a V-QUEST result directory.
pub fn extract_submission(dir: &Path) -> CllResult<SubmissionResult> {
    let mut result = extract_from_readers(
        open(dir, PARAMETERS_FILE)?,
        open(dir, SUMMARY_FILE)?,
        open(dir, JUNCTION_FILE)?,
    )?;

    result.extraction = Some(ExtractionInfo {
        timestamp: utc_now_iso8601(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        source_dir: Some(dir.display().to_string()),
    });

    info!(
        "Extracted {} sequences and {} parameters from {}",
        result.records.len(),
        result.parameters.len(),
        dir.display()
    );
    Ok(result)
}
