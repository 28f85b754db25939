//! seoscore core library: the scoring and quality-gate engine behind the SEO
//! analysis pipeline.
//!
//! The crate turns raw keyword, domain, and content metrics into
//! domain-relative difficulty, ranked opportunities, and content decay
//! verdicts, and gates AI-generated analysis through a weighted set of quality
//! checks before it is allowed to ship.  With the `python` feature it is built
//! as the `_seoscore_core` extension module via PyO3.

pub mod config;
pub mod errors;
pub mod models;
pub mod quality;
pub mod scoring;

#[cfg(feature = "python")]
mod bindings;

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::wrap_pyfunction;

// ---------------------------------------------------------------------------
// Top-level Python module: _seoscore_core
// ---------------------------------------------------------------------------

#[cfg(feature = "python")]
#[pymodule]
fn _seoscore_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // -- Constants ----------------------------------------------------------
    m.add("MINIMUM_QUALITY_SCORE", config::MINIMUM_QUALITY_SCORE)?;
    m.add(
        "STRICT_MINIMUM_QUALITY_SCORE",
        config::STRICT_MINIMUM_QUALITY_SCORE,
    )?;
    m.add("DEFAULT_TARGET_POSITION", config::DEFAULT_TARGET_POSITION)?;
    m.add("DEFAULT_GATE_NAMES", quality::checks::DEFAULT_GATE_NAMES.to_vec())?;

    // -- Curve helpers ------------------------------------------------------
    m.add_function(wrap_pyfunction!(bindings::scoring::normalize_volume, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::scoring::get_ctr_for_position, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::scoring::get_intent_weight, m)?)?;

    // -- Scoring models -----------------------------------------------------
    m.add_function(wrap_pyfunction!(
        bindings::scoring::calculate_personalized_difficulty,
        m
    )?)?;
    m.add_function(wrap_pyfunction!(
        bindings::scoring::calculate_opportunity_score,
        m
    )?)?;
    m.add_function(wrap_pyfunction!(
        bindings::scoring::calculate_batch_opportunities,
        m
    )?)?;
    m.add_function(wrap_pyfunction!(bindings::scoring::calculate_decay_score, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::scoring::calculate_batch_decay, m)?)?;

    // -- Quality gates ------------------------------------------------------
    m.add_class::<bindings::quality::PyQualityGateEnforcer>()?;

    Ok(())
}
