use crate::core::methods::derivative_length;
use thiserror::Error;

pub const DEFAULT_BASIS_SET: &str = "primary";
pub const DEFAULT_FRAGMENTIZER: &str = "null";

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Parameter {0} must not be empty")]
    Empty(&'static str),

    #[error(
        "{tasks} tasks requested but METHODS, BASIS_SETS and the subsystems are all singletons; nothing varies per task"
    )]
    AmbiguousTasks { tasks: usize },

    #[error("{option} has {found} entries; expected 1 or {tasks} (one per task)")]
    LengthMismatch {
        option: &'static str,
        found: usize,
        tasks: usize,
    },

    #[error("Invalid value for {option}: {reason}")]
    InvalidValue { option: &'static str, reason: String },
}

/// Checks that an `order`-th derivative over `atoms` atoms can be held, returning its length.
pub fn derivative_size(atoms: usize, order: usize) -> Result<usize, ConfigError> {
    derivative_length(atoms, order).ok_or_else(|| ConfigError::InvalidValue {
        option: "ORDER",
        reason: format!("a derivative of order {order} over {atoms} atoms is too large to hold"),
    })
}

/// Options of one MIM computation.
///
/// `weights` defines the task count. `methods` and `basis_sets` each hold either a
/// single entry shared by every task or exactly one entry per task.
#[derive(Debug, Clone, PartialEq)]
pub struct MimConfig {
    pub methods: Vec<String>,
    pub basis_sets: Vec<String>,
    pub weights: Vec<f64>,
    pub fragmentizer: String,
    /// Upper bound on concurrently running tasks; `None` uses every available core.
    pub max_workers: Option<usize>,
}

impl MimConfig {
    pub fn task_count(&self) -> usize {
        self.weights.len()
    }
}

#[derive(Default)]
pub struct MimConfigBuilder {
    methods: Option<Vec<String>>,
    basis_sets: Option<Vec<String>>,
    weights: Option<Vec<f64>>,
    fragmentizer: Option<String>,
    max_workers: Option<usize>,
}

impl MimConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }
    pub fn basis_sets<I, S>(mut self, basis_sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.basis_sets = Some(basis_sets.into_iter().map(Into::into).collect());
        self
    }
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }
    pub fn fragmentizer(mut self, key: impl Into<String>) -> Self {
        self.fragmentizer = Some(key.into());
        self
    }
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    pub fn build(self) -> Result<MimConfig, ConfigError> {
        let methods = self
            .methods
            .ok_or(ConfigError::MissingParameter("METHODS"))?;
        let weights = self
            .weights
            .ok_or(ConfigError::MissingParameter("WEIGHTS"))?;
        let basis_sets = self
            .basis_sets
            .unwrap_or_else(|| vec![DEFAULT_BASIS_SET.to_string()]);
        let fragmentizer = self
            .fragmentizer
            .unwrap_or_else(|| DEFAULT_FRAGMENTIZER.to_string());

        if weights.is_empty() {
            return Err(ConfigError::Empty("WEIGHTS"));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite()) {
            return Err(ConfigError::InvalidValue {
                option: "WEIGHTS",
                reason: format!("{bad} is not a finite number"),
            });
        }
        let tasks = weights.len();
        check_list("METHODS", &methods, tasks)?;
        check_list("BASIS_SETS", &basis_sets, tasks)?;
        if fragmentizer.trim().is_empty() {
            return Err(ConfigError::Empty("FRAGMENTIZER"));
        }
        check_workers(self.max_workers)?;

        Ok(MimConfig {
            methods,
            basis_sets,
            weights,
            fragmentizer,
            max_workers: self.max_workers,
        })
    }
}

/// Options of an MBE truncation, which generates its own fragments and weights.
#[derive(Debug, Clone, PartialEq)]
pub struct MbeConfig {
    pub methods: Vec<String>,
    pub basis_sets: Vec<String>,
    /// Monomer scheme key, without an `@n` suffix.
    pub base_fragmentizer: String,
    pub truncation: usize,
    pub max_workers: Option<usize>,
}

#[derive(Default)]
pub struct MbeConfigBuilder {
    methods: Option<Vec<String>>,
    basis_sets: Option<Vec<String>>,
    base_fragmentizer: Option<String>,
    truncation: Option<usize>,
    max_workers: Option<usize>,
}

impl MbeConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }
    pub fn basis_sets<I, S>(mut self, basis_sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.basis_sets = Some(basis_sets.into_iter().map(Into::into).collect());
        self
    }
    pub fn base_fragmentizer(mut self, key: impl Into<String>) -> Self {
        self.base_fragmentizer = Some(key.into());
        self
    }
    pub fn truncation(mut self, order: usize) -> Self {
        self.truncation = Some(order);
        self
    }
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    pub fn build(self) -> Result<MbeConfig, ConfigError> {
        let methods = self
            .methods
            .ok_or(ConfigError::MissingParameter("METHODS"))?;
        let truncation = self
            .truncation
            .ok_or(ConfigError::MissingParameter("TRUNCATION"))?;
        let basis_sets = self
            .basis_sets
            .unwrap_or_else(|| vec![DEFAULT_BASIS_SET.to_string()]);
        let base_fragmentizer = self
            .base_fragmentizer
            .ok_or(ConfigError::MissingParameter("FRAGMENTIZER"))?;

        if methods.is_empty() {
            return Err(ConfigError::Empty("METHODS"));
        }
        if basis_sets.is_empty() {
            return Err(ConfigError::Empty("BASIS_SETS"));
        }
        if truncation == 0 {
            return Err(ConfigError::InvalidValue {
                option: "TRUNCATION",
                reason: "the expansion order must be at least 1".to_string(),
            });
        }
        if base_fragmentizer.contains('@') {
            return Err(ConfigError::InvalidValue {
                option: "FRAGMENTIZER",
                reason: format!(
                    "'{base_fragmentizer}' already carries a truncation; give the monomer scheme only"
                ),
            });
        }
        check_workers(self.max_workers)?;

        Ok(MbeConfig {
            methods,
            basis_sets,
            base_fragmentizer,
            truncation,
            max_workers: self.max_workers,
        })
    }
}

fn check_list(option: &'static str, list: &[String], tasks: usize) -> Result<(), ConfigError> {
    if list.is_empty() {
        return Err(ConfigError::Empty(option));
    }
    if list.len() != 1 && list.len() != tasks {
        return Err(ConfigError::LengthMismatch {
            option,
            found: list.len(),
            tasks,
        });
    }
    Ok(())
}

fn check_workers(workers: Option<usize>) -> Result<(), ConfigError> {
    if workers == Some(0) {
        return Err(ConfigError::InvalidValue {
            option: "MAX_WORKERS",
            reason: "at least one worker is required".to_string(),
        });
    }
    Ok(())
}
