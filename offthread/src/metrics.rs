//! Metrics declaration and initialization.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of computations dispatched, labeled by path.
    pub static ref DISPATCHED_COUNTER: &'static str = {
        metrics::describe_counter!(
            "offthread_dispatched_total",
            "Total number of computations dispatched."
        );
        "offthread_dispatched_total"
    };
    /// Track number of workers that could not be spawned.
    pub static ref SPAWN_FAILURE_COUNTER: &'static str = {
        metrics::describe_counter!(
            "offthread_spawn_failures_total",
            "Total number of failed worker spawns."
        );
        "offthread_spawn_failures_total"
    };
    /// Track number of computations that panicked on a worker.
    pub static ref WORKER_PANIC_COUNTER: &'static str = {
        metrics::describe_counter!(
            "offthread_worker_panics_total",
            "Total number of computations that panicked on a worker."
        );
        "offthread_worker_panics_total"
    };
    /// Histogram of time from dispatch to settlement.
    pub static ref COMPUTE_DURATION: &'static str = {
        metrics::describe_histogram!(
            "offthread_compute_duration_seconds",
            metrics::Unit::Seconds,
            "Time from dispatch to settlement in seconds."
        );
        "offthread_compute_duration_seconds"
    };
}
