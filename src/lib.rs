//! IGHV mutation-status analysis for CLL diagnostics.
//!
//! Parses IMGT/V-QUEST excel-export flat files and Lymphotrack instrument
//! exports, classifies somatic hypermutation status per sequence and per
//! sample, resolves CLL subset membership, and composes the Swedish
//! clinical report text.

pub mod classify;
pub mod config;
pub mod error;
pub mod lymphotrack;
pub mod report;
pub mod submission;
pub mod subset;
pub mod utils;
pub mod vquest;
