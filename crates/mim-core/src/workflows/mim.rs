use crate::core::fragment::{FragmentError, FragmenterProvider};
use crate::core::methods::MethodProvider;
use crate::core::models::system::MolecularSystem;
use crate::core::models::system_map::SystemMap;
use crate::engine::accumulator::DerivativeAccumulator;
use crate::engine::atom_map::AtomIndexMap;
use crate::engine::config::{MimConfig, derivative_size};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::report::{self, DerivMap, ResultReporter};
use crate::engine::scheduler::TaskScheduler;
use crate::engine::task::{self, Task};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Collaborators of a computation.
#[derive(Clone, Copy)]
pub struct MimContext<'a> {
    pub methods: &'a dyn MethodProvider,
    pub fragmenters: &'a dyn FragmenterProvider,
    pub reporter: &'a dyn ResultReporter,
    pub progress: &'a ProgressReporter<'a>,
}

impl<'a> MimContext<'a> {
    pub fn new(
        methods: &'a dyn MethodProvider,
        fragmenters: &'a dyn FragmenterProvider,
        reporter: &'a dyn ResultReporter,
        progress: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            methods,
            fragmenters,
            reporter,
            progress,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MimResult {
    pub order: usize,
    /// The accumulated whole-system derivative, `(3·N)^order` values.
    pub derivative: Vec<f64>,
    /// Report rows: subsystem names in submission order.
    pub rows: Vec<String>,
    pub derivs: DerivMap,
    pub systems: SystemMap,
}

/// Computes the `order`-th derivative of `system` as a weighted sum over fragments.
#[instrument(skip_all, name = "mim_workflow", fields(order = order))]
pub fn run(
    system: &MolecularSystem,
    config: &MimConfig,
    order: usize,
    context: &MimContext,
) -> Result<MimResult, EngineError> {
    // === Phase 1: Fragmentation ===
    context.progress.report(Progress::PhaseStart {
        name: "Fragmentation",
    });
    let fragmenter = context.fragmenters.resolve(&config.fragmentizer)?;
    let systems = fragmenter.fragmentize(system)?;
    if systems.is_empty() {
        return Err(FragmentError::Empty {
            policy: fragmenter.name(),
        }
        .into());
    }
    info!(
        policy = %fragmenter.name(),
        subsystems = systems.len(),
        "System fragmented."
    );
    context.progress.report(Progress::PhaseFinish);

    let largest = systems
        .iter()
        .map(|(_, sub)| sub.len())
        .fold(system.len(), usize::max);
    derivative_size(largest, order)?;

    // === Phase 2: Task generation and execution ===
    let tasks = task::generate(config, &systems, context.methods)?;
    context.progress.report(Progress::PhaseStart { name: "Execution" });
    let scheduler = TaskScheduler::new(config.max_workers, tasks.len())?;
    info!(
        tasks = tasks.len(),
        workers = scheduler.workers(),
        "Running task batch."
    );
    let results = scheduler.run_all(&tasks, order, context.progress)?;
    drop(scheduler);
    context.progress.report(Progress::PhaseFinish);

    // === Phase 3: Accumulation ===
    context.progress.report(Progress::PhaseStart {
        name: "Accumulation",
    });
    let derivative = accumulate(system, &tasks, &results, order)?;
    context.progress.report(Progress::PhaseFinish);

    // === Phase 4: Reporting ===
    let rows = report::report_rows(&tasks);
    let derivs = report::collect_derivs(&tasks, &results);
    report::render(context.reporter, order, &rows, &derivs, &systems)?;

    info!(values = derivative.len(), "MIM computation complete.");
    Ok(MimResult {
        order,
        derivative,
        rows,
        derivs,
        systems,
    })
}

fn accumulate(
    system: &MolecularSystem,
    tasks: &[Task],
    results: &[Vec<f64>],
    order: usize,
) -> Result<Vec<f64>, EngineError> {
    let whole_map = AtomIndexMap::for_system(system);
    let mut sub_maps: HashMap<&str, AtomIndexMap> = HashMap::new();
    let mut accumulator = DerivativeAccumulator::new(system.len(), order)?;

    for (task, local) in tasks.iter().zip(results) {
        let sub_map = sub_maps
            .entry(task.subsystem_name.as_str())
            .or_insert_with(|| AtomIndexMap::for_system(&task.subsystem));
        accumulator.accumulate(
            local,
            task.coefficient,
            &task.subsystem_name,
            &task.subsystem,
            &whole_map,
            sub_map,
        )?;
    }
    Ok(accumulator.into_values())
}
