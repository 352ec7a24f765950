use super::config::{ConfigError, MimConfig};
use super::error::EngineError;
use crate::core::methods::{DerivativeMethod, MethodError, MethodProvider, derivative_length};
use crate::core::models::system::MolecularSystem;
use crate::core::models::system_map::SystemMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Which entry of each option list a task draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSlot {
    pub method: usize,
    pub basis: usize,
    pub system: usize,
}

/// One independent `(method, basis, subsystem, coefficient)` computation.
///
/// A task owns everything it needs: the resolved method and the subsystem are shared
/// through `Arc`, so a task can run on any worker without borrowing from the caller.
#[derive(Clone)]
pub struct Task {
    pub index: usize,
    pub method_key: String,
    pub method: Arc<dyn DerivativeMethod>,
    pub basis: String,
    pub subsystem_name: String,
    pub subsystem: Arc<MolecularSystem>,
    pub coefficient: f64,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("index", &self.index)
            .field("method", &self.method_key)
            .field("basis", &self.basis)
            .field("subsystem", &self.subsystem_name)
            .field("atoms", &self.subsystem.len())
            .field("coefficient", &self.coefficient)
            .finish()
    }
}

impl Task {
    /// Runs the method and checks the derivative against the length contract.
    pub fn execute(&self, order: usize) -> Result<Vec<f64>, MethodError> {
        let values = self.method.deriv(&self.subsystem, &self.basis, order)?;
        let expected = derivative_length(self.subsystem.len(), order).ok_or_else(|| {
            MethodError::UnsupportedOrder {
                method: self.method_key.clone(),
                order,
            }
        })?;
        if values.len() != expected {
            return Err(MethodError::WrongLength {
                order,
                atoms: self.subsystem.len(),
                expected,
                found: values.len(),
            });
        }
        Ok(values)
    }
}

/// Applies the broadcast rule to the list lengths of a batch.
///
/// A list of length 1 is shared by every task; any other list is indexed by task
/// position. The subsystem cursor walks the map one step per task unless there is
/// exactly one subsystem.
///
/// # Errors
///
/// - [`ConfigError::Empty`] if there are no tasks.
/// - [`ConfigError::AmbiguousTasks`] if more than one task is requested while all three
///   lists are singletons.
/// - [`ConfigError::LengthMismatch`] if the method or basis list neither broadcasts nor
///   matches the task count, or if there are fewer subsystems than tasks.
pub fn plan(
    tasks: usize,
    methods: usize,
    bases: usize,
    systems: usize,
) -> Result<Vec<TaskSlot>, ConfigError> {
    if tasks == 0 {
        return Err(ConfigError::Empty("WEIGHTS"));
    }
    if tasks > 1 && methods == 1 && bases == 1 && systems == 1 {
        return Err(ConfigError::AmbiguousTasks { tasks });
    }
    for (option, len) in [("METHODS", methods), ("BASIS_SETS", bases)] {
        if len != 1 && len != tasks {
            return Err(ConfigError::LengthMismatch {
                option,
                found: len,
                tasks,
            });
        }
    }
    if systems != 1 && systems < tasks {
        return Err(ConfigError::LengthMismatch {
            option: "FRAGMENTIZER",
            found: systems,
            tasks,
        });
    }
    if systems > tasks {
        warn!(
            subsystems = systems,
            tasks, "More subsystems than weights; the trailing subsystems are not computed."
        );
    }

    let pick = |len: usize, i: usize| if len == 1 { 0 } else { i };
    Ok((0..tasks)
        .map(|i| TaskSlot {
            method: pick(methods, i),
            basis: pick(bases, i),
            system: pick(systems, i),
        })
        .collect())
}

/// Builds the task batch of a computation.
///
/// Each distinct method key is resolved once through `methods` and shared among the
/// tasks that use it.
pub fn generate(
    config: &MimConfig,
    systems: &SystemMap,
    methods: &dyn MethodProvider,
) -> Result<Vec<Task>, EngineError> {
    let slots = plan(
        config.task_count(),
        config.methods.len(),
        config.basis_sets.len(),
        systems.len(),
    )?;

    let mut resolved: HashMap<&str, Arc<dyn DerivativeMethod>> = HashMap::new();
    let mut tasks = Vec::with_capacity(slots.len());
    for (index, slot) in slots.into_iter().enumerate() {
        let key = config.methods[slot.method].as_str();
        let method = match resolved.get(key).cloned() {
            Some(method) => method,
            None => {
                let method =
                    methods
                        .resolve(key)
                        .map_err(|source| EngineError::MethodResolution {
                            key: key.to_string(),
                            source,
                        })?;
                resolved.insert(key, Arc::clone(&method));
                method
            }
        };
        let (name, subsystem) = systems.get_index(slot.system).ok_or_else(|| {
            EngineError::Internal(format!("no subsystem at position {}", slot.system))
        })?;

        tasks.push(Task {
            index,
            method_key: key.to_string(),
            method,
            basis: config.basis_sets[slot.basis].clone(),
            subsystem_name: name.clone(),
            subsystem: Arc::clone(subsystem),
            coefficient: config.weights[index],
        });
    }

    debug!(
        tasks = tasks.len(),
        methods = resolved.len(),
        "Generated task batch."
    );
    Ok(tasks)
}
