//! Scoring and report-decision engine for clinical site evaluations.
//!
//! Sites submit questionnaire answers, the scoring engine turns them into
//! weighted category scores gated by knock-out and minimum-threshold checks,
//! and the reporting pipeline freezes the active rule/template/mapping
//! configuration into a versioned, hash-anchored report that can be
//! acknowledged exactly once.

pub mod config;
pub mod error;
pub mod reporting;
pub mod scoring;
pub mod telemetry;
