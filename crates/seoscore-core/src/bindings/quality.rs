//! Quality gate enforcer exposed as a Python class.

use parking_lot::Mutex;
use pyo3::prelude::*;
use serde_json::Value;

use crate::bindings::{from_py, from_py_opt, to_py};
use crate::config::{GateOverride, QualityConfig};
use crate::quality::QualityGateEnforcer;

#[pyclass(name = "QualityGateEnforcer")]
pub struct PyQualityGateEnforcer {
    inner: Mutex<QualityGateEnforcer>,
}

#[pymethods]
impl PyQualityGateEnforcer {
    /// `config` is a `QualityConfig` dict; when omitted the bar comes from the
    /// environment.
    #[new]
    #[pyo3(signature = (config=None, register_defaults=true))]
    fn new(config: Option<&Bound<'_, PyAny>>, register_defaults: bool) -> PyResult<Self> {
        let config: QualityConfig = from_py_opt(config)?.unwrap_or_else(QualityConfig::from_env);
        let enforcer = if register_defaults {
            QualityGateEnforcer::with_config(&config)?
        } else {
            config.validate()?;
            QualityGateEnforcer::new(config.minimum_quality_score)?
        };
        Ok(Self {
            inner: Mutex::new(enforcer),
        })
    }

    #[getter]
    fn minimum_score(&self) -> f64 {
        self.inner.lock().minimum_score()
    }

    fn register_default_gates(&self) -> PyResult<()> {
        self.inner.lock().register_default_gates()?;
        Ok(())
    }

    /// Adjust a registered gate's threshold, weight, required or enabled flag.
    #[pyo3(signature = (name, threshold=None, weight=None, required=None, enabled=None))]
    fn set_gate(
        &self,
        name: &str,
        threshold: Option<f64>,
        weight: Option<f64>,
        required: Option<bool>,
        enabled: Option<bool>,
    ) -> PyResult<()> {
        let gate_override = GateOverride {
            threshold,
            weight,
            required,
            enabled,
        };
        self.inner.lock().override_gate(name, &gate_override)?;
        Ok(())
    }

    fn gate_names(&self) -> Vec<String> {
        self.inner.lock().gate_names()
    }

    #[pyo3(signature = (name, payload, context=None))]
    fn run_gate(
        &self,
        py: Python<'_>,
        name: &str,
        payload: &Bound<'_, PyAny>,
        context: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<PyObject> {
        let payload: Value = from_py(payload)?;
        let context: Option<Value> = from_py_opt(context)?;
        let result = self.inner.lock().run_gate(name, &payload, context.as_ref())?;
        to_py(py, &result)
    }

    #[pyo3(signature = (payload, context=None))]
    fn run_all_gates(
        &self,
        py: Python<'_>,
        payload: &Bound<'_, PyAny>,
        context: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<PyObject> {
        let payload: Value = from_py(payload)?;
        let context: Option<Value> = from_py_opt(context)?;
        let report = self.inner.lock().run_all_gates(&payload, context.as_ref());
        to_py(py, &report)
    }

    fn __len__(&self) -> usize {
        self.inner.lock().len()
    }
}
