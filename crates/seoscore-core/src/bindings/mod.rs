//! Python bindings. Records cross the boundary as dicts through a JSON
//! round-trip, so the Rust models stay free of pyo3 types.

pub mod quality;
pub mod scoring;

use pyo3::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::ScoringError;

/// Python object -> Rust record via `json.dumps`.
pub(crate) fn from_py<T: DeserializeOwned>(obj: &Bound<'_, PyAny>) -> PyResult<T> {
    let py = obj.py();
    let dumped = py.import("json")?.call_method1("dumps", (obj,))?;
    let json_str: String = dumped.extract()?;
    Ok(serde_json::from_str(&json_str).map_err(ScoringError::from)?)
}

pub(crate) fn from_py_opt<T: DeserializeOwned>(obj: Option<&Bound<'_, PyAny>>) -> PyResult<Option<T>> {
    obj.filter(|o| !o.is_none()).map(from_py).transpose()
}

/// Rust record -> Python object via `json.loads`.
pub(crate) fn to_py<T: Serialize>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let json_str = serde_json::to_string(value).map_err(ScoringError::from)?;
    let json_module = py.import("json")?;
    json_module
        .call_method1("loads", (json_str,))
        .map(|o| o.into())
}
