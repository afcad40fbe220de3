//! Conversions between Python objects and core types

use pyo3::prelude::*;
use pyo3::types::PyTuple;

use crate::models::{Outcome, UtilityError, UtilityFunction, Value};

/// Utility function backed by a Python callable taking an outcome tuple.
///
/// Python exceptions and non-float results become [`UtilityError`]s, which
/// the orchestrator turns into safe fallbacks.
pub struct PyUtility {
    callable: PyObject,
}

impl PyUtility {
    pub fn new(callable: PyObject) -> Self {
        Self { callable }
    }
}

impl UtilityFunction for PyUtility {
    fn utility(&self, outcome: &Outcome) -> Result<f64, UtilityError> {
        Python::with_gil(|py| {
            let args = outcome_to_py(py, outcome);
            self.callable
                .call1(py, (args,))
                .and_then(|value| value.extract::<f64>(py))
                .map_err(|e| UtilityError::Evaluation {
                    outcome: outcome.to_string(),
                    message: e.to_string(),
                })
        })
    }
}

/// Convert an outcome to a Python tuple of ints / strings.
pub fn outcome_to_py(py: Python<'_>, outcome: &Outcome) -> Py<PyTuple> {
    let items: Vec<PyObject> = outcome
        .values()
        .iter()
        .map(|value| match value {
            Value::Int(i) => (*i).into_py(py),
            Value::Text(s) => s.as_str().into_py(py),
        })
        .collect();
    PyTuple::new_bound(py, items).unbind()
}

/// Parse a Python sequence of ints / strings into an outcome.
///
/// # Errors
///
/// Raises TypeError if an element is neither an int nor a string.
pub fn outcome_from_py(obj: &Bound<'_, PyAny>) -> PyResult<Outcome> {
    let mut values = Vec::new();
    for item in obj.iter()? {
        let item = item?;
        if let Ok(i) = item.extract::<i64>() {
            values.push(Value::Int(i));
        } else if let Ok(s) = item.extract::<String>() {
            values.push(Value::Text(s));
        } else {
            return Err(PyErr::new::<pyo3::exceptions::PyTypeError, _>(format!(
                "Outcome values must be int or str, got {}",
                item.get_type().name()?
            )));
        }
    }
    Ok(Outcome::new(values))
}
