//! Scoring model entry points for the Python host.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use pyo3::prelude::*;

use crate::bindings::{from_py, from_py_opt, to_py};
use crate::config::ScoringConfig;
use crate::errors::ScoringError;
use crate::models::{ContentPerformance, DomainProfile, KeywordMetrics, SerpContext};
use crate::scoring::curves::{self, VolumeMethod};
use crate::scoring::{decay, difficulty, opportunity};

fn scoring_config(config: Option<&Bound<'_, PyAny>>) -> PyResult<ScoringConfig> {
    let config = from_py_opt::<ScoringConfig>(config)?.unwrap_or_else(ScoringConfig::from_env);
    config.validate()?;
    Ok(config)
}

/// `YYYY-MM-DD`, or today (UTC) when omitted.
fn reference_date(as_of: Option<&str>) -> PyResult<NaiveDate> {
    match as_of {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| ScoringError::invalid("as_of", e.to_string()).into()),
        None => Ok(Utc::now().date_naive()),
    }
}

// ---------------------------------------------------------------------------
// Curve helpers
// ---------------------------------------------------------------------------

#[pyfunction]
#[pyo3(signature = (volume, max_volume, method="logarithmic"))]
pub fn normalize_volume(volume: f64, max_volume: f64, method: &str) -> PyResult<f64> {
    let method = match method.trim().to_lowercase().as_str() {
        "logarithmic" | "log" => VolumeMethod::Logarithmic,
        "linear" => VolumeMethod::Linear,
        "square_root" | "sqrt" => VolumeMethod::SquareRoot,
        other => {
            return Err(ScoringError::invalid("method", format!("unknown volume method {other:?}")).into())
        }
    };
    Ok(curves::normalize_volume(volume, max_volume, method))
}

#[pyfunction]
#[pyo3(signature = (position=None))]
pub fn get_ctr_for_position(position: Option<u32>) -> f64 {
    curves::get_ctr_for_position(position)
}

#[pyfunction]
pub fn get_intent_weight(intent: &str) -> f64 {
    curves::intent_weight_for_label(intent)
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[pyfunction]
#[pyo3(signature = (keyword, domain, serp=None))]
pub fn calculate_personalized_difficulty(
    py: Python<'_>,
    keyword: &Bound<'_, PyAny>,
    domain: &Bound<'_, PyAny>,
    serp: Option<&Bound<'_, PyAny>>,
) -> PyResult<PyObject> {
    let keyword: KeywordMetrics = from_py(keyword)?;
    let domain: DomainProfile = from_py(domain)?;
    let serp: Option<SerpContext> = from_py_opt(serp)?;
    let analysis = difficulty::calculate_personalized_difficulty(&keyword, &domain, serp.as_ref())?;
    to_py(py, &analysis)
}

#[pyfunction]
#[pyo3(signature = (keyword, domain, max_volume, serp=None, config=None))]
pub fn calculate_opportunity_score(
    py: Python<'_>,
    keyword: &Bound<'_, PyAny>,
    domain: &Bound<'_, PyAny>,
    max_volume: u64,
    serp: Option<&Bound<'_, PyAny>>,
    config: Option<&Bound<'_, PyAny>>,
) -> PyResult<PyObject> {
    let keyword: KeywordMetrics = from_py(keyword)?;
    let domain: DomainProfile = from_py(domain)?;
    let serp: Option<SerpContext> = from_py_opt(serp)?;
    let config = scoring_config(config)?;
    let analysis =
        opportunity::calculate_opportunity_score(&keyword, &domain, max_volume, serp.as_ref(), &config)?;
    to_py(py, &analysis)
}

/// Returns `{"results": [...], "failures": [...]}`; results are ranked.
#[pyfunction]
#[pyo3(signature = (keywords, domain, serp_by_keyword=None, config=None))]
pub fn calculate_batch_opportunities(
    py: Python<'_>,
    keywords: &Bound<'_, PyAny>,
    domain: &Bound<'_, PyAny>,
    serp_by_keyword: Option<&Bound<'_, PyAny>>,
    config: Option<&Bound<'_, PyAny>>,
) -> PyResult<PyObject> {
    let keywords: Vec<KeywordMetrics> = from_py(keywords)?;
    let domain: DomainProfile = from_py(domain)?;
    let serp_by_keyword: HashMap<String, SerpContext> =
        from_py_opt(serp_by_keyword)?.unwrap_or_default();
    let config = scoring_config(config)?;
    let outcome = py.allow_threads(|| {
        opportunity::calculate_batch_opportunities(&keywords, &domain, &serp_by_keyword, &config)
    });
    to_py(py, &outcome)
}

#[pyfunction]
#[pyo3(signature = (page, as_of=None, config=None))]
pub fn calculate_decay_score(
    py: Python<'_>,
    page: &Bound<'_, PyAny>,
    as_of: Option<&str>,
    config: Option<&Bound<'_, PyAny>>,
) -> PyResult<PyObject> {
    let page: ContentPerformance = from_py(page)?;
    let as_of = reference_date(as_of)?;
    let config = scoring_config(config)?;
    let analysis = decay::calculate_decay_score(&page, as_of, &config)?;
    to_py(py, &analysis)
}

/// Returns `{"results": [...], "failures": [...]}`, most decayed first.
#[pyfunction]
#[pyo3(signature = (pages, as_of=None, config=None))]
pub fn calculate_batch_decay(
    py: Python<'_>,
    pages: &Bound<'_, PyAny>,
    as_of: Option<&str>,
    config: Option<&Bound<'_, PyAny>>,
) -> PyResult<PyObject> {
    let pages: Vec<ContentPerformance> = from_py(pages)?;
    let as_of = reference_date(as_of)?;
    let config = scoring_config(config)?;
    let outcome = py.allow_threads(|| decay::calculate_batch_decay(&pages, as_of, &config));
    to_py(py, &outcome)
}
