//! PyO3 wrapper for the orchestrator
//!
//! Exposes the decision core to Python hosts as a `Negotiator` class.

use pyo3::prelude::*;
use pyo3::types::{PyList, PyTuple};

use super::types::{outcome_from_py, outcome_to_py, PyUtility};
use crate::orchestrator::{AgentConfig, Orchestrator};

/// Python wrapper for the negotiation orchestrator
///
/// # Example (from Python)
///
/// ```python
/// from negotiation_core_rs import Negotiator
///
/// outcomes = [(a, b) for a in range(5) for b in range(3)]
/// agent = Negotiator.new('{"rng_seed": 7}', outcomes, lambda o: (o[0] + o[1]) / 6)
/// if not agent.respond((1, 1), 0.2, 1):
///     counter = agent.propose(0.2, 1)
/// ```
#[pyclass(name = "Negotiator")]
pub struct PyNegotiator {
    inner: Orchestrator<PyUtility>,
}

#[pymethods]
impl PyNegotiator {
    /// Create a negotiator
    ///
    /// # Arguments
    ///
    /// * `config_json` - JSON object with any subset of the agent parameters
    /// * `outcomes` - List of outcome tuples (ints / strings)
    /// * `utility` - Callable mapping an outcome tuple to a float in [0, 1]
    /// * `reservation` - Optional walk-away value
    ///
    /// # Errors
    ///
    /// Raises ValueError if the config is invalid, the outcome list is empty,
    /// or the utility fails on every outcome.
    #[staticmethod]
    #[pyo3(signature = (config_json, outcomes, utility, reservation=None))]
    fn new(
        config_json: &str,
        outcomes: &Bound<'_, PyList>,
        utility: PyObject,
        reservation: Option<f64>,
    ) -> PyResult<Self> {
        let config = AgentConfig::from_json(config_json)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;
        let outcomes = outcomes
            .iter()
            .map(|o| outcome_from_py(&o))
            .collect::<PyResult<Vec<_>>>()?;

        let inner = Orchestrator::new(config, PyUtility::new(utility), reservation, outcomes).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Failed to create negotiator: {}", e))
        })?;
        Ok(PyNegotiator { inner })
    }

    /// Decide on the opponent's offer; `None` on our opening turn.
    ///
    /// Returns True to accept.
    #[pyo3(signature = (offer, time, round))]
    fn respond(&mut self, offer: Option<&Bound<'_, PyAny>>, time: f64, round: usize) -> PyResult<bool> {
        let offer = offer.map(outcome_from_py).transpose()?;
        Ok(self.inner.respond(offer.as_ref(), time, round).is_accept())
    }

    /// Counter-offer for this round as an outcome tuple
    fn propose(&mut self, py: Python<'_>, time: f64, round: usize) -> Py<PyTuple> {
        let outcome = self.inner.propose(time, round);
        outcome_to_py(py, &outcome)
    }

    /// Revise the reservation value mid-negotiation
    fn update_reservation(&mut self, value: f64) {
        self.inner.update_reservation(value);
    }

    /// Hard utility floor currently in force
    fn min_util(&self) -> f64 {
        self.inner.bounds().min_util
    }

    /// Number of events logged so far
    fn event_count(&self) -> usize {
        self.inner.event_log().len()
    }

    /// SHA-256 digest of the event log
    fn event_digest(&self) -> String {
        self.inner.event_log().digest()
    }

    /// Event log as a JSON array
    fn events_json(&self) -> PyResult<String> {
        serde_json::to_string(self.inner.event_log().events())
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()))
    }
}
