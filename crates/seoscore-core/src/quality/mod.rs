//! Weighted, pluggable quality gates over AI-generated analysis payloads.

pub mod checks;
pub mod enforcer;
pub mod gate;

pub use enforcer::QualityGateEnforcer;
pub use gate::{CheckOutcome, CheckResult, CheckStatus, CompositeQualityReport, QualityCheck, QualityGate};
