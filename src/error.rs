//! Error types shared across the classification and extraction core.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// The main error type for cll-genie operations.
#[derive(Debug)]
pub enum CllError {
    /// A required analysis result file is absent. The analysis run is
    /// considered incomplete; never retried.
    MissingInputFile(PathBuf),
    /// Malformed delimited content or an unparseable numeric field.
    Parse { file: String, line: usize, msg: String },
    /// A summary sequence has no junction counterpart. Hard failure so a
    /// sequence is never silently dropped from a clinical report.
    IncompleteCohort(String),
    /// A submitted-sequence count above the supported number-word range.
    UnsupportedSequenceCount(usize),
    /// Invalid configuration value or combination.
    InvalidConfig(String),
    /// Error during IO operations (file reading, report writing, etc.)
    Io(io::Error),
}

impl fmt::Display for CllError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CllError::MissingInputFile(path) => {
                write!(f, "Required input file not found: {}", path.display())
            }
            CllError::Parse { file, line, msg } => {
                write!(f, "Parse error in {} at line {}: {}", file, line, msg)
            }
            CllError::IncompleteCohort(seq_id) => write!(
                f,
                "Sequence {} is present in the summary table but has no junction row",
                seq_id
            ),
            CllError::UnsupportedSequenceCount(n) => write!(
                f,
                "Unsupported submitted sequence count {} (report wording is defined for 1-10)",
                n
            ),
            CllError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            CllError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for CllError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CllError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CllError {
    fn from(err: io::Error) -> Self {
        CllError::Io(err)
    }
}

/// Result type alias for cll-genie operations.
pub type CllResult<T> = Result<T, CllError>;

impl CllError {
    /// Shorthand for a parse error tied to a file and 1-based line number.
    pub fn parse(file: &str, line: usize, msg: impl Into<String>) -> Self {
        CllError::Parse {
            file: file.to_string(),
            line,
            msg: msg.into(),
        }
    }
}
