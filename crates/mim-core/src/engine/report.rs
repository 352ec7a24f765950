use super::task::Task;
use crate::core::models::system_map::SystemMap;
use indexmap::IndexMap;
use std::io;

/// Raw, unweighted derivative of each subsystem, keyed by subsystem name in submission
/// order. When several tasks share a subsystem the last one's result is kept.
pub type DerivMap = IndexMap<String, Vec<f64>>;

/// Renders the per-subsystem breakdown of a computation.
///
/// Values are each fragment's own derivative, not its weighted contribution.
pub trait ResultReporter {
    fn render_energy_table(&self, rows: &[String], derivs: &DerivMap) -> io::Result<()>;

    fn render_gradient_table(
        &self,
        rows: &[String],
        derivs: &DerivMap,
        systems: &SystemMap,
    ) -> io::Result<()>;
}

/// A reporter that renders nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ResultReporter for NullReporter {
    fn render_energy_table(&self, _rows: &[String], _derivs: &DerivMap) -> io::Result<()> {
        Ok(())
    }

    fn render_gradient_table(
        &self,
        _rows: &[String],
        _derivs: &DerivMap,
        _systems: &SystemMap,
    ) -> io::Result<()> {
        Ok(())
    }
}

/// Subsystem names in task submission order, each listed once.
pub fn report_rows(tasks: &[Task]) -> Vec<String> {
    let mut rows: Vec<String> = Vec::new();
    for task in tasks {
        if !rows.contains(&task.subsystem_name) {
            rows.push(task.subsystem_name.clone());
        }
    }
    rows
}

/// Pairs every task's result with its subsystem name.
pub fn collect_derivs(tasks: &[Task], results: &[Vec<f64>]) -> DerivMap {
    let mut derivs = DerivMap::with_capacity(tasks.len());
    for (task, values) in tasks.iter().zip(results) {
        derivs.insert(task.subsystem_name.clone(), values.clone());
    }
    derivs
}

/// Dispatches to the table matching the derivative order. Orders above 1 have no table.
pub fn render(
    reporter: &dyn ResultReporter,
    order: usize,
    rows: &[String],
    derivs: &DerivMap,
    systems: &SystemMap,
) -> io::Result<()> {
    match order {
        0 => reporter.render_energy_table(rows, derivs),
        1 => reporter.render_gradient_table(rows, derivs, systems),
        _ => {
            tracing::debug!(order, "No tabular report for this derivative order.");
            Ok(())
        }
    }
}
