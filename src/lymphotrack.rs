//! Lymphotrack export ingestion.
//!
//! The instrument export carries a few rows of run metadata, then a header
//! row, then one row per merged read. Reads are filtered on "% total reads"
//! and optionally on the instrument's in-frame / no-stop-codon calls before
//! the survivors are written out as FASTA for sequence analysis.
//!
//! Numeric columns may use decimal commas; values that still fail to parse
//! are coerced to absent (and an absent "% total reads" never passes the
//! cutoff), mirroring how the historical ingestion treated unparseable
//! cells.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use indexmap::IndexMap;
use log::{info, warn};

use crate::error::{CllError, CllResult};
use crate::utils::num::parse_decimal;

/// Columns read from the export.
const RANK_COLUMN: &str = "Rank";
const SEQUENCE_COLUMN: &str = "Sequence";
const LENGTH_COLUMN: &str = "Length";
const MERGE_COUNT_COLUMN: &str = "Merge count";
const PCT_TOTAL_READS_COLUMN: &str = "% total reads";
const CUMULATIVE_PCT_COLUMN: &str = "Cumulative %";
const MUTATION_RATE_COLUMN: &str = "Mutation rate to partial V-gene (%)";
const V_COVERAGE_COLUMN: &str = "V-coverage";
const IN_FRAME_COLUMN: &str = "In-frame (Y/N)";
const NO_STOP_CODON_COLUMN: &str = "No Stop codon (Y/N)";

/// Yes/no/both condition on an instrument Y/N column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConditionFilter {
    Yes,
    No,
    Both,
}

impl ConditionFilter {
    fn keeps(&self, flag: &str) -> bool {
        match self {
            ConditionFilter::Yes => flag == "Y",
            ConditionFilter::No => flag == "N",
            ConditionFilter::Both => true,
        }
    }
}

/// One merged read from the export.
#[derive(Debug, Clone)]
pub struct LymphotrackRead {
    pub rank: u32,
    pub sequence: String,
    pub length: Option<u32>,
    pub merge_count: Option<u32>,
    pub pct_total_reads: Option<f64>,
    pub cumulative_pct: Option<f64>,
    pub mutation_rate: Option<f64>,
    pub v_coverage: Option<f64>,
    /// Instrument in-frame call, "Y" or "N".
    pub in_frame: String,
    /// Instrument no-stop-codon call, "Y" or "N".
    pub no_stop_codon: String,
}

/// A parsed export: run metadata plus the read table.
#[derive(Debug, Clone)]
pub struct LymphotrackSheet {
    pub metadata: IndexMap<String, String>,
    pub reads: Vec<LymphotrackRead>,
}

/// Filtering conditions applied before submission.
#[derive(Debug, Clone, Copy)]
pub struct FilterParams {
    /// Minimum "% total reads".
    pub cutoff: f64,
    pub in_frame: ConditionFilter,
    pub no_stop_codon: ConditionFilter,
}

fn column_index(header: &[&str], name: &str, file_label: &str, line: usize) -> CllResult<usize> {
    header
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| {
            CllError::parse(file_label, line, format!("missing column '{}'", name))
        })
}

fn cell<'a>(cells: &'a [&str], idx: usize) -> &'a str {
    cells.get(idx).map(|c| c.trim()).unwrap_or("")
}

fn coerce_f64(raw: &str) -> Option<f64> {
    parse_decimal(raw).ok()
}

fn coerce_u32(raw: &str) -> Option<u32> {
    coerce_f64(raw).map(|v| v as u32)
}

/// Parse a Lymphotrack TSV export.
///
/// `header_row` is the 0-based index of the column-header row; the rows
/// above it are key/value run metadata.
pub fn read_sheet<R: BufRead>(
    reader: R,
    header_row: usize,
    file_label: &str,
) -> CllResult<LymphotrackSheet> {
    let mut metadata = IndexMap::new();
    let mut reads = Vec::new();
    let mut columns: Option<(usize, usize, Vec<(usize, &'static str)>)> = None;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if i < header_row {
            let mut parts = line.splitn(2, '\t');
            let key = parts.next().unwrap_or("").trim();
            if !key.is_empty() {
                metadata.insert(
                    key.to_string(),
                    parts.next().unwrap_or("").trim().to_string(),
                );
            }
            continue;
        }

        if i == header_row {
            let header: Vec<&str> = line.split('\t').map(|c| c.trim()).collect();
            let rank = column_index(&header, RANK_COLUMN, file_label, i + 1)?;
            let sequence = column_index(&header, SEQUENCE_COLUMN, file_label, i + 1)?;
            let mut optional = Vec::new();
            for name in [
                LENGTH_COLUMN,
                MERGE_COUNT_COLUMN,
                PCT_TOTAL_READS_COLUMN,
                CUMULATIVE_PCT_COLUMN,
                MUTATION_RATE_COLUMN,
                V_COVERAGE_COLUMN,
                IN_FRAME_COLUMN,
                NO_STOP_CODON_COLUMN,
            ] {
                if let Some(idx) = header.iter().position(|h| *h == name) {
                    optional.push((idx, name));
                }
            }
            columns = Some((rank, sequence, optional));
            continue;
        }

        if line.trim().is_empty() {
            continue;
        }
        let Some((rank_idx, seq_idx, optional)) = &columns else {
            continue;
        };
        let (rank_idx, seq_idx) = (*rank_idx, *seq_idx);

        let cells: Vec<&str> = line.split('\t').collect();
        let rank = match coerce_u32(cell(&cells, rank_idx)) {
            Some(rank) => rank,
            None => {
                warn!(
                    "{} line {}: skipping row with unparseable rank '{}'",
                    file_label,
                    i + 1,
                    cell(&cells, rank_idx)
                );
                continue;
            }
        };

        let mut read = LymphotrackRead {
            rank,
            sequence: cell(&cells, seq_idx).to_string(),
            length: None,
            merge_count: None,
            pct_total_reads: None,
            cumulative_pct: None,
            mutation_rate: None,
            v_coverage: None,
            in_frame: String::new(),
            no_stop_codon: String::new(),
        };
        for (idx, name) in optional {
            let raw = cell(&cells, *idx);
            match *name {
                LENGTH_COLUMN => read.length = coerce_u32(raw),
                MERGE_COUNT_COLUMN => read.merge_count = coerce_u32(raw),
                PCT_TOTAL_READS_COLUMN => read.pct_total_reads = coerce_f64(raw),
                CUMULATIVE_PCT_COLUMN => read.cumulative_pct = coerce_f64(raw),
                MUTATION_RATE_COLUMN => read.mutation_rate = coerce_f64(raw),
                V_COVERAGE_COLUMN => read.v_coverage = coerce_f64(raw),
                IN_FRAME_COLUMN => read.in_frame = raw.to_string(),
                NO_STOP_CODON_COLUMN => read.no_stop_codon = raw.to_string(),
                _ => {}
            }
        }
        reads.push(read);
    }

    if columns.is_none() {
        return Err(CllError::parse(
            file_label,
            header_row + 1,
            "missing header row",
        ));
    }

    Ok(LymphotrackSheet { metadata, reads })
}

/// Open and parse an export file.
pub fn read_sheet_file(path: &Path, header_row: usize) -> CllResult<LymphotrackSheet> {
    if !path.exists() {
        return Err(CllError::MissingInputFile(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    read_sheet(reader, header_row, &path.display().to_string())
}

/// Apply the pre-submission filters.
///
/// An empty result is a legitimate outcome (logged, not an error): some
/// samples simply have no read above the cutoff.
pub fn filter_reads(sheet: &LymphotrackSheet, params: &FilterParams) -> Vec<LymphotrackRead> {
    let filtered: Vec<LymphotrackRead> = sheet
        .reads
        .iter()
        .filter(|read| read.pct_total_reads.is_some_and(|pct| pct >= params.cutoff))
        .filter(|read| params.in_frame.keeps(&read.in_frame))
        .filter(|read| params.no_stop_codon.keeps(&read.no_stop_codon))
        .cloned()
        .collect();

    if filtered.is_empty() {
        info!(
            "No reads left after filtration (% total reads >= {}, in-frame {:?}, no stop codon {:?})",
            params.cutoff, params.in_frame, params.no_stop_codon
        );
    }
    filtered
}

/// Render reads as FASTA, one record per read, named by rank.
pub fn to_fasta(reads: &[LymphotrackRead]) -> String {
    let mut fasta = String::new();
    for read in reads {
        fasta.push_str(&format!(">{}\n{}\n", read.rank, read.sequence));
    }
    fasta
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SHEET: &str = "Sample\t24MD01234\n\
        Total reads\t51234\n\
        Rank\tSequence\tLength\tMerge count\t% total reads\tCumulative %\tMutation rate to partial V-gene (%)\tV-coverage\tIn-frame (Y/N)\tNo Stop codon (Y/N)\n\
        1\tGGTACC\t300\t12000\t23,4\t23,4\t3,57\t98,1\tY\tY\n\
        2\tCCATGG\t298\t8000\t15.6\t39,0\t0,0\t97,9\tN\tY\n\
        3\tTTGGCC\t295\t40\t0,08\t39,08\t1,2\t96,5\tY\tN\n";

    fn sheet() -> LymphotrackSheet {
        read_sheet(Cursor::new(SHEET), 2, "test.tsv").unwrap()
    }

    #[test]
    fn test_metadata_and_comma_decimals() {
        let sheet = sheet();
        assert_eq!(sheet.metadata["Sample"], "24MD01234");
        assert_eq!(sheet.reads.len(), 3);
        assert_eq!(sheet.reads[0].pct_total_reads, Some(23.4));
        assert_eq!(sheet.reads[0].mutation_rate, Some(3.57));
        assert_eq!(sheet.reads[1].pct_total_reads, Some(15.6));
    }

    #[test]
    fn test_filters() {
        let sheet = sheet();

        let both = FilterParams {
            cutoff: 1.0,
            in_frame: ConditionFilter::Both,
            no_stop_codon: ConditionFilter::Both,
        };
        assert_eq!(filter_reads(&sheet, &both).len(), 2); // rank 3 fails the cutoff

        let functional = FilterParams {
            cutoff: 1.0,
            in_frame: ConditionFilter::Yes,
            no_stop_codon: ConditionFilter::Yes,
        };
        let reads = filter_reads(&sheet, &functional);
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].rank, 1);

        let none = FilterParams {
            cutoff: 99.0,
            in_frame: ConditionFilter::Both,
            no_stop_codon: ConditionFilter::Both,
        };
        assert!(filter_reads(&sheet, &none).is_empty());
    }

    #[test]
    fn test_fasta_output() {
        let sheet = sheet();
        let params = FilterParams {
            cutoff: 1.0,
            in_frame: ConditionFilter::Both,
            no_stop_codon: ConditionFilter::Both,
        };
        let fasta = to_fasta(&filter_reads(&sheet, &params));
        assert_eq!(fasta, ">1\nGGTACC\n>2\nCCATGG\n");
    }

    #[test]
    fn test_missing_required_column() {
        let data = "meta\tx\nmeta2\ty\nRank\tLength\n1\t300\n";
        assert!(read_sheet(Cursor::new(data), 2, "t").is_err());
    }
}
