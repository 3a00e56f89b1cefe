//! The offloading executor.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lazy_static::lazy_static;
use offthread_core::{Computation, Facility, FacilityMode, Spawner, ThreadSpawner};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::{
    ComputeError, Deferred, ExecutorConfig, Outcome, bootstrap::Bootstrap, options::DebugOptions,
    stopwatch::Stopwatch,
};

#[cfg(feature = "metrics")]
use crate::metrics::{COMPUTE_DURATION, DISPATCHED_COUNTER, SPAWN_FAILURE_COUNTER};

lazy_static! {
    static ref DEFAULT_EXECUTOR: Executor = Executor::detect();
}

/// Runs `computation` on a fresh worker thread if this target has threads,
/// otherwise on the calling thread.
///
/// Uses a process-wide executor built from [`ExecutorConfig::default`]. See
/// [`Executor::compute`] for the full contract.
///
/// ```
/// use offthread::{Computation, DebugOptions, compute};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), offthread::ComputeError> {
/// let greeting = compute(Computation::nullary(|| "hi"), None, DebugOptions::default())?.await?;
/// assert_eq!(greeting, "hi");
/// # Ok(())
/// # }
/// ```
pub fn compute<T>(
    computation: Computation<T>,
    input: Option<T>,
    options: DebugOptions,
) -> Result<Outcome<T>, ComputeError>
where
    T: Send + 'static,
{
    DEFAULT_EXECUTOR.compute(computation, input, options)
}

/// Internal state shared across clones.
#[derive(Debug)]
struct ExecutorInner {
    config: ExecutorConfig,
    spawner: Option<Arc<dyn Spawner>>,
    worker_counter: AtomicU64,
}

/// Offloads computations to one ephemeral worker per call.
///
/// Cloning is cheap and clones share the worker-name counter. Calls are
/// otherwise fully independent: every call owns its worker and releases it
/// itself.
#[derive(Clone, Debug)]
pub struct Executor {
    inner: Arc<ExecutorInner>,
}

impl Executor {
    /// Create a new Executor with the given configuration.
    pub fn new(config: ExecutorConfig) -> Self {
        let spawner = match config.facility.resolve() {
            Facility::Background => {
                let mut spawner = ThreadSpawner::new();
                if let Some(bytes) = config.stack_size {
                    spawner = spawner.stack_size(bytes);
                }
                Some(Arc::new(spawner) as Arc<dyn Spawner>)
            }
            Facility::Inline => None,
        };
        Self::from_parts(config, spawner)
    }

    /// Create an Executor that probes the target for thread support.
    pub fn detect() -> Self {
        Self::new(ExecutorConfig::default())
    }

    /// Create an Executor that always runs computations on the caller's thread.
    pub fn inline() -> Self {
        Self::new(
            ExecutorConfig::builder()
                .facility(FacilityMode::Inline)
                .build(),
        )
    }

    /// Create an Executor that always offloads to a worker thread.
    pub fn threaded() -> Self {
        Self::new(
            ExecutorConfig::builder()
                .facility(FacilityMode::Background)
                .build(),
        )
    }

    /// Create an Executor that builds contexts with a custom spawner.
    pub fn with_spawner(spawner: impl Spawner + 'static) -> Self {
        let config = ExecutorConfig::builder()
            .facility(FacilityMode::Background)
            .build();
        Self::from_parts(config, Some(Arc::new(spawner)))
    }

    fn from_parts(config: ExecutorConfig, spawner: Option<Arc<dyn Spawner>>) -> Self {
        Self {
            inner: Arc::new(ExecutorInner {
                config,
                spawner,
                worker_counter: AtomicU64::new(0),
            }),
        }
    }

    /// The facility this executor dispatches to.
    pub fn facility(&self) -> Facility {
        if self.inner.spawner.is_some() {
            Facility::Background
        } else {
            Facility::Inline
        }
    }

    /// The configuration this executor was built from.
    pub fn config(&self) -> &ExecutorConfig {
        &self.inner.config
    }

    fn next_worker_name(&self) -> String {
        let id = self.inner.worker_counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.inner.config.thread_name_prefix, id)
    }

    /// Runs `computation` on `input`.
    ///
    /// # Paths
    ///
    /// - **Background**: a worker is spawned, `input` is sent to it, and a
    ///   [`Deferred`] is returned that resolves to the worker's single reply.
    ///   If the worker cannot be spawned the `Deferred` resolves to
    ///   [`ComputeError::Spawn`] and `input` is dropped unsent. A panic in
    ///   the computation resolves to [`ComputeError::Panicked`].
    /// - **Inline**: the labeled timer (if any) is stopped, then the
    ///   computation runs on the caller's thread and its value is returned
    ///   as [`Outcome::Immediate`]. Panics propagate to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::MissingInput`] before doing anything else if
    /// a unary computation is given no input.
    ///
    /// # Debug options
    ///
    /// With a label, one `timer started` and one `timer ended` event are
    /// emitted per call on either path. With `print_script`, the worker's
    /// [`Bootstrap`] line is emitted once before the worker is spawned; it is
    /// never emitted on the inline path.
    pub fn compute<T>(
        &self,
        computation: Computation<T>,
        input: Option<T>,
        options: DebugOptions,
    ) -> Result<Outcome<T>, ComputeError>
    where
        T: Send + 'static,
    {
        computation.check_input(input.as_ref())?;

        let stopwatch = options.label().cloned().map(Stopwatch::start);

        let Some(spawner) = self.inner.spawner.as_deref() else {
            debug!(
                target: "offthread::executor",
                shape = %computation.shape(),
                "no background facility, running inline"
            );
            if let Some(stopwatch) = stopwatch {
                stopwatch.stop();
            }
            #[cfg(feature = "metrics")]
            let started = std::time::Instant::now();
            #[cfg(feature = "metrics")]
            metrics::counter!(*DISPATCHED_COUNTER, "path" => "inline").increment(1);

            let value = computation.apply(input)?;

            #[cfg(feature = "metrics")]
            metrics::histogram!(*COMPUTE_DURATION, "path" => "inline")
                .record(started.elapsed().as_secs_f64());
            return Ok(Outcome::Immediate(value));
        };

        let bootstrap = Bootstrap::new(self.next_worker_name(), computation);
        let worker = bootstrap.worker().to_owned();
        if options.print_script() {
            info!(target: "offthread::bootstrap", worker = %worker, script = %bootstrap, "bootstrap");
        }

        let (inbound_tx, inbound_rx) = oneshot::channel();
        let (reply_tx, reply_rx) = oneshot::channel();
        let dispatch = tracing::dispatcher::get_default(Clone::clone);
        let job = bootstrap.into_job(inbound_rx, reply_tx, dispatch);

        match spawner.spawn(&worker, job) {
            Ok(context) => {
                #[cfg(feature = "metrics")]
                metrics::counter!(*DISPATCHED_COUNTER, "path" => "background").increment(1);
                debug!(
                    target: "offthread::executor",
                    worker = %worker,
                    shape = %computation.shape(),
                    "dispatched to worker"
                );
                if inbound_tx.send(input).is_err() {
                    // The worker is gone before reading; the reply channel is
                    // closed too, so the deferred resolves to Disconnected.
                    debug!(target: "offthread::executor", worker = %worker, "worker exited before receiving input");
                }
                Ok(Outcome::Deferred(Deferred::waiting(reply_rx, context, stopwatch)))
            }
            Err(source) => {
                warn!(target: "offthread::executor", worker = %worker, error = %source, "failed to spawn worker");
                #[cfg(feature = "metrics")]
                metrics::counter!(*SPAWN_FAILURE_COUNTER).increment(1);
                Ok(Outcome::Deferred(Deferred::rejected(
                    ComputeError::Spawn { worker, source },
                    stopwatch,
                )))
            }
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::detect()
    }
}
