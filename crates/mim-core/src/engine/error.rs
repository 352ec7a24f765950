use super::config::ConfigError;
use crate::core::fragment::FragmentError;
use crate::core::methods::MethodError;
use crate::core::models::ids::AtomId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fragmentation failed: {0}")]
    Fragmentation(#[from] FragmentError),

    #[error("Atom {atom} of subsystem '{subsystem}' is not part of the whole system")]
    Mapping { atom: AtomId, subsystem: String },

    #[error(
        "Derivative of subsystem '{subsystem}' has {found} values; {expected} were expected"
    )]
    DerivativeLength {
        subsystem: String,
        expected: usize,
        found: usize,
    },

    #[error("Task {index} ('{method}' on subsystem '{subsystem}') failed: {source}")]
    Method {
        index: usize,
        subsystem: String,
        method: String,
        #[source]
        source: MethodError,
    },

    #[error("Failed to resolve method '{key}': {source}")]
    MethodResolution {
        key: String,
        #[source]
        source: MethodError,
    },

    #[error("Scheduler failure: {0}")]
    Scheduler(String),

    #[error("Failed to render the result report: {0}")]
    Report(#[from] std::io::Error),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
