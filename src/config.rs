//! Application configuration.
//!
//! This module provides structs and loading functions for:
//! - Hypermutation borderline cutoffs used by the classifier
//! - Lymphotrack ingestion defaults (header row, filtration cutoff)
//! - Report output location and privileged user groups

use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;

use crate::error::{CllError, CllResult};

// ============================================================================
// Hypermutation cutoffs
// ============================================================================

/// The two configured V-REGION identity cutoffs.
///
/// Values strictly below `lower` classify as M-CLL, strictly above `upper`
/// as U-CLL; the closed band `[lower, upper]` is Borderline.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct HypermutationCutoffs {
    #[serde(default = "default_lower_cutoff")]
    pub lower: f64,
    #[serde(default = "default_upper_cutoff")]
    pub upper: f64,
}

fn default_lower_cutoff() -> f64 {
    97.0
}

fn default_upper_cutoff() -> f64 {
    97.99
}

impl Default for HypermutationCutoffs {
    fn default() -> Self {
        Self {
            lower: default_lower_cutoff(),
            upper: default_upper_cutoff(),
        }
    }
}

impl HypermutationCutoffs {
    pub fn new(lower: f64, upper: f64) -> CllResult<Self> {
        let cutoffs = Self { lower, upper };
        cutoffs.validate()?;
        Ok(cutoffs)
    }

    pub fn validate(&self) -> CllResult<()> {
        if !self.lower.is_finite() || !self.upper.is_finite() {
            return Err(CllError::InvalidConfig(format!(
                "hypermutation cutoffs must be finite, got {} / {}",
                self.lower, self.upper
            )));
        }
        if self.lower > self.upper {
            return Err(CllError::InvalidConfig(format!(
                "hypermutation lower cutoff {} exceeds upper cutoff {}",
                self.lower, self.upper
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Lymphotrack ingestion defaults
// ============================================================================

/// Defaults for Lymphotrack TSV ingestion and pre-submission filtering.
#[derive(Deserialize, Debug, Clone)]
pub struct LymphotrackConfig {
    /// 0-based index of the column-header row; the rows above it hold
    /// run metadata as key/value pairs.
    #[serde(default = "default_header_row")]
    pub header_row: usize,
    /// Minimum "% total reads" a read must reach to be submitted.
    #[serde(default = "default_filtration_cutoff")]
    pub filtration_cutoff: f64,
}

fn default_header_row() -> usize {
    5
}

fn default_filtration_cutoff() -> f64 {
    1.0
}

impl Default for LymphotrackConfig {
    fn default() -> Self {
        Self {
            header_row: default_header_row(),
            filtration_cutoff: default_filtration_cutoff(),
        }
    }
}

// ============================================================================
// Top-level configuration
// ============================================================================

/// Application configuration, loaded from a JSON file.
#[derive(Deserialize, Debug, Clone)]
pub struct CllConfig {
    #[serde(default)]
    pub cutoffs: HypermutationCutoffs,

    #[serde(default)]
    pub lymphotrack: LymphotrackConfig,

    /// Directory where generated reports are written.
    #[serde(default = "default_report_outdir")]
    pub report_outdir: String,

    /// Groups whose members may delete reports and re-run analyses.
    /// Consumed by the (external) presentation layer, carried here so one
    /// config file serves the whole deployment.
    #[serde(default)]
    pub super_user_groups: Vec<String>,
}

fn default_report_outdir() -> String {
    "reports".to_string()
}

impl Default for CllConfig {
    fn default() -> Self {
        CllConfig {
            cutoffs: HypermutationCutoffs::default(),
            lymphotrack: LymphotrackConfig::default(),
            report_outdir: default_report_outdir(),
            super_user_groups: Vec::new(),
        }
    }
}

impl CllConfig {
    /// Load configuration from a JSON file and validate invariants.
    pub fn load(path: &str) -> CllResult<Self> {
        let file = File::open(path)
            .map_err(|e| CllError::Io(std::io::Error::other(format!(
                "Error opening config file {}: {}",
                path, e
            ))))?;
        let reader = BufReader::new(file);
        let config: CllConfig = serde_json::from_reader(reader)
            .map_err(|e| CllError::InvalidConfig(format!("{}: {}", path, e)))?;
        config.cutoffs.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: CllConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.cutoffs.lower, 97.0);
        assert_eq!(config.cutoffs.upper, 97.99);
        assert_eq!(config.lymphotrack.header_row, 5);
        assert_eq!(config.report_outdir, "reports");
        assert!(config.super_user_groups.is_empty());
    }

    #[test]
    fn test_partial_override() {
        let data = r#"{
            "cutoffs": {"lower": 98.0, "upper": 99.9},
            "super_user_groups": ["lymphotrack_admin"]
        }"#;
        let config: CllConfig = serde_json::from_str(data).unwrap();
        assert_eq!(config.cutoffs.lower, 98.0);
        assert_eq!(config.cutoffs.upper, 99.9);
        assert!(config.cutoffs.validate().is_ok());
        assert_eq!(config.super_user_groups, vec!["lymphotrack_admin"]);
    }

    #[test]
    fn test_inverted_cutoffs_rejected() {
        assert!(HypermutationCutoffs::new(99.0, 97.0).is_err());
        assert!(HypermutationCutoffs::new(97.0, 97.0).is_ok());
    }
}
