//! Gate definitions and the result records produced by running them.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{validate_threshold, validate_weight};
use crate::errors::ScoringResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed,
    Warning,
    Skipped,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Passed => "passed",
            CheckStatus::Failed => "failed",
            CheckStatus::Warning => "warning",
            CheckStatus::Skipped => "skipped",
        }
    }
}

/// Raw outcome of a check before the enforcer applies threshold and weight.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckOutcome {
    /// 0–1, or `None` when the check had nothing to evaluate.
    pub score: Option<f64>,
    pub message: String,
    pub details: Value,
}

impl CheckOutcome {
    pub fn scored(score: f64, message: impl Into<String>) -> Self {
        Self {
            score: Some(score),
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn not_applicable(message: impl Into<String>) -> Self {
        Self {
            score: None,
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Missing section: {0}")]
    MissingSection(String),

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("{0}")]
    Failed(String),
}

/// One independently evaluable quality criterion over an analysis payload.
pub trait QualityCheck: Send + Sync {
    fn evaluate(&self, payload: &Value, context: &Value) -> Result<CheckOutcome, CheckError>;
}

/// A named, weighted gate wrapping a check.
#[derive(Clone)]
pub struct QualityGate {
    pub name: String,
    pub description: String,
    /// Minimum passing score, on the check's 0–1 scale.
    pub threshold: f64,
    pub weight: f64,
    /// A failed required gate fails the whole report.
    pub required: bool,
    pub enabled: bool,
    check: Arc<dyn QualityCheck>,
}

impl QualityGate {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        threshold: f64,
        weight: f64,
        required: bool,
        check: impl QualityCheck + 'static,
    ) -> ScoringResult<Self> {
        let name = name.into();
        validate_threshold(&name, threshold)?;
        validate_weight(&name, weight)?;
        Ok(Self {
            name,
            description: description.into(),
            threshold,
            weight,
            required,
            enabled: true,
            check: Arc::new(check),
        })
    }

    pub fn check(&self) -> &dyn QualityCheck {
        self.check.as_ref()
    }
}

impl fmt::Debug for QualityGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QualityGate")
            .field("name", &self.name)
            .field("threshold", &self.threshold)
            .field("weight", &self.weight)
            .field("required", &self.required)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub gate: String,
    pub status: CheckStatus,
    pub score: Option<f64>,
    pub threshold: f64,
    pub weight: f64,
    pub required: bool,
    pub message: String,
    pub details: Value,
    pub timestamp: DateTime<Utc>,
}

impl CheckResult {
    pub fn is_failed(&self) -> bool {
        self.status == CheckStatus::Failed
    }
}

/// Aggregate verdict over every registered gate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeQualityReport {
    pub results: Vec<CheckResult>,
    /// Weight-normalized score on 0–10.
    pub composite_score: f64,
    pub minimum_score: f64,
    pub required_gates_failed: Vec<String>,
    pub warnings: Vec<String>,
    pub passed: bool,
    pub evaluated_at: DateTime<Utc>,
}

impl CompositeQualityReport {
    pub fn result(&self, gate: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.gate == gate)
    }

    /// One-line rendering for logs.
    pub fn summary(&self) -> String {
        let verdict = if self.passed { "PASSED" } else { "FAILED" };
        let mut line = format!(
            "{verdict}: composite {:.2}/10 (minimum {:.2}), {} gates",
            self.composite_score,
            self.minimum_score,
            self.results.len()
        );
        if !self.required_gates_failed.is_empty() {
            line.push_str(&format!(
                "; required gates failed: {}",
                self.required_gates_failed.join(", ")
            ));
        }
        if !self.warnings.is_empty() {
            line.push_str(&format!("; warnings: {}", self.warnings.join(", ")));
        }
        line
    }
}
