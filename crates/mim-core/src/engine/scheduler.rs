use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::task::Task;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use crate::core::methods::MethodError;
#[cfg(feature = "parallel")]
use std::any::Any;
#[cfg(feature = "parallel")]
use std::sync::mpsc;
#[cfg(feature = "parallel")]
use tracing::error;

#[cfg(feature = "parallel")]
type TaskOutcome = Result<Vec<f64>, MethodError>;

/// Runs the tasks of one computation on a dedicated, fixed-size worker pool.
///
/// The pool holds `min(workers, tasks)` threads and lives exactly as long as the
/// scheduler; nothing is shared with other computations or with rayon's global pool.
/// Without the `parallel` feature, tasks run on the calling thread when waited on.
pub struct TaskScheduler {
    workers: usize,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

/// A submitted task whose result can be waited for.
pub struct TaskHandle {
    index: usize,
    subsystem: String,
    method: String,
    state: HandleState,
}

enum HandleState {
    #[cfg(feature = "parallel")]
    Pending(mpsc::Receiver<TaskOutcome>),
    #[cfg(not(feature = "parallel"))]
    Deferred(Box<Task>, usize),
}

impl TaskScheduler {
    /// Creates a scheduler sized for a batch of `tasks` tasks.
    ///
    /// `max_workers` caps the pool; by default every available core is used. The pool
    /// always has at least one thread.
    pub fn new(max_workers: Option<usize>, tasks: usize) -> Result<Self, EngineError> {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let workers = max_workers.unwrap_or(available).min(tasks).max(1);

        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("mim-worker-{i}"))
            .panic_handler(|payload| error!("A task panicked: {}", panic_message(&*payload)))
            .build()
            .map_err(|e| EngineError::Scheduler(e.to_string()))?;

        #[cfg(not(feature = "parallel"))]
        let workers = 1;

        debug!(workers, tasks, "Task scheduler created.");
        Ok(Self {
            workers,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Enqueues a task without blocking.
    pub fn submit(&self, task: Task, order: usize) -> TaskHandle {
        let index = task.index;
        let subsystem = task.subsystem_name.clone();
        let method = task.method_key.clone();

        #[cfg(feature = "parallel")]
        let state = {
            let (sender, receiver) = mpsc::sync_channel(1);
            self.pool.spawn(move || {
                // The receiver is gone only if the batch was already abandoned.
                let _ = sender.send(task.execute(order));
            });
            HandleState::Pending(receiver)
        };

        #[cfg(not(feature = "parallel"))]
        let state = HandleState::Deferred(Box::new(task), order);

        TaskHandle {
            index,
            subsystem,
            method,
            state,
        }
    }

    /// Submits the whole batch, then collects every result in submission order.
    ///
    /// The first failing task (in submission order) aborts the batch.
    #[instrument(skip_all, name = "task_batch", fields(tasks = tasks.len(), workers = self.workers))]
    pub fn run_all(
        &self,
        tasks: &[Task],
        order: usize,
        reporter: &ProgressReporter,
    ) -> Result<Vec<Vec<f64>>, EngineError> {
        reporter.report(Progress::TaskStart {
            total_steps: tasks.len() as u64,
        });

        let handles: Vec<TaskHandle> = tasks
            .iter()
            .map(|task| self.submit(task.clone(), order))
            .collect();
        debug!("Submitted {} tasks.", handles.len());

        let mut results = Vec::with_capacity(handles.len());
        let mut failure = None;
        for handle in handles {
            match handle.wait() {
                Ok(values) => {
                    reporter.report(Progress::TaskIncrement);
                    results.push(values);
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        reporter.report(Progress::TaskFinish);
        match failure {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }
}

impl TaskHandle {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Blocks until the task has finished.
    pub fn wait(self) -> Result<Vec<f64>, EngineError> {
        let TaskHandle {
            index,
            subsystem,
            method,
            state,
        } = self;

        let outcome = match state {
            #[cfg(feature = "parallel")]
            HandleState::Pending(receiver) => match receiver.recv() {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(EngineError::Scheduler(format!(
                        "worker for task {index} ('{method}' on subsystem '{subsystem}') stopped without delivering a result"
                    )));
                }
            },
            #[cfg(not(feature = "parallel"))]
            HandleState::Deferred(task, order) => task.execute(order),
        };

        outcome.map_err(|source| EngineError::Method {
            index,
            subsystem,
            method,
            source,
        })
    }
}

#[cfg(feature = "parallel")]
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::methods::{Capability, DerivativeMethod, MethodError};
    use crate::core::models::element::Element;
    use crate::core::models::system::MolecularSystem;
    use nalgebra::Point3;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    /// Sleeps for the number of milliseconds named by the basis, then returns it.
    struct Sleepy;

    impl DerivativeMethod for Sleepy {
        fn name(&self) -> &str {
            "sleepy"
        }
        fn capabilities(&self) -> &[Capability] {
            &[Capability::Energy]
        }
        fn deriv(
            &self,
            _system: &MolecularSystem,
            basis: &str,
            _order: usize,
        ) -> Result<Vec<f64>, MethodError> {
            match basis {
                "fail" => Err(MethodError::Failed("SCF did not converge".to_string())),
                "panic" => panic!("backend crashed"),
                delay => {
                    let ms: u64 = delay.parse().map_err(|_| MethodError::UnknownBasis {
                        method: "sleepy".to_string(),
                        basis: delay.to_string(),
                    })?;
                    thread::sleep(Duration::from_millis(ms));
                    Ok(vec![ms as f64])
                }
            }
        }
    }

    fn task(index: usize, basis: &str) -> Task {
        let mut system = MolecularSystem::new();
        system.add_atom(Element::from_symbol("He").unwrap(), Point3::origin());
        Task {
            index,
            method_key: "sleepy".to_string(),
            method: Arc::new(Sleepy),
            basis: basis.to_string(),
            subsystem_name: format!("({index})"),
            subsystem: Arc::new(system),
            coefficient: 1.0,
        }
    }

    #[test]
    fn pool_size_is_bounded_by_task_count() {
        assert_eq!(TaskScheduler::new(None, 0).unwrap().workers(), 1);
        assert_eq!(TaskScheduler::new(Some(1), 10).unwrap().workers(), 1);
        #[cfg(feature = "parallel")]
        assert_eq!(TaskScheduler::new(Some(8), 3).unwrap().workers(), 3);
    }

    #[test]
    fn results_follow_submission_order_despite_reversed_latency() {
        let delays = [80, 60, 40, 20, 0];
        let tasks: Vec<Task> = delays
            .iter()
            .enumerate()
            .map(|(i, ms)| task(i, &ms.to_string()))
            .collect();
        let scheduler = TaskScheduler::new(Some(delays.len()), tasks.len()).unwrap();
        let results = scheduler
            .run_all(&tasks, 0, &ProgressReporter::new())
            .unwrap();
        let expected: Vec<Vec<f64>> = delays.iter().map(|&ms| vec![ms as f64]).collect();
        assert_eq!(results, expected);
    }

    #[test]
    fn submitted_handle_waits_for_its_own_task() {
        let scheduler = TaskScheduler::new(Some(2), 2).unwrap();
        let slow = scheduler.submit(task(0, "30"), 0);
        let fast = scheduler.submit(task(1, "1"), 0);
        assert_eq!(fast.index(), 1);
        assert_eq!(fast.wait().unwrap(), vec![1.0]);
        assert_eq!(slow.wait().unwrap(), vec![30.0]);
    }

    #[test]
    fn first_failure_in_submission_order_aborts_the_batch() {
        let tasks = vec![task(0, "5"), task(1, "fail"), task(2, "bogus")];
        let scheduler = TaskScheduler::new(Some(3), 3).unwrap();
        let err = scheduler
            .run_all(&tasks, 0, &ProgressReporter::new())
            .unwrap_err();
        match err {
            EngineError::Method {
                index,
                subsystem,
                method,
                source,
            } => {
                assert_eq!(index, 1);
                assert_eq!(subsystem, "(1)");
                assert_eq!(method, "sleepy");
                assert!(matches!(source, MethodError::Failed(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn panicking_task_is_reported_as_scheduler_failure() {
        let tasks = vec![task(0, "0"), task(1, "panic")];
        let scheduler = TaskScheduler::new(Some(2), 2).unwrap();
        let err = scheduler
            .run_all(&tasks, 0, &ProgressReporter::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::Scheduler(_)));
    }

    #[test]
    fn progress_reports_one_increment_per_result() {
        use std::sync::Mutex;
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let tasks = vec![task(0, "0"), task(1, "0")];
        TaskScheduler::new(None, 2)
            .unwrap()
            .run_all(&tasks, 0, &reporter)
            .unwrap();
        drop(reporter);
        assert_eq!(
            events.into_inner().unwrap(),
            vec![
                Progress::TaskStart { total_steps: 2 },
                Progress::TaskIncrement,
                Progress::TaskIncrement,
                Progress::TaskFinish
            ]
        );
    }
}
