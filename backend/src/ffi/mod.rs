//! Python bindings (feature `pyo3`)

pub mod negotiator;
pub mod types;

pub use negotiator::PyNegotiator;
