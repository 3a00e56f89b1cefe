use std::io;

use offthread_core::MissingInput;
use thiserror::Error;

/// Errors surfaced by [`Executor::compute`](crate::Executor::compute) and
/// by awaiting a [`Deferred`](crate::Deferred) value.
#[derive(Debug, Error)]
pub enum ComputeError {
    /// The background context could not be constructed.
    ///
    /// The input value was never sent.
    #[error("failed to spawn worker `{worker}`: {source}")]
    Spawn {
        /// Name the worker would have had.
        worker: String,
        /// Error returned by the spawner.
        #[source]
        source: io::Error,
    },

    /// The computation panicked on the worker thread.
    #[error("computation panicked on worker: {0}")]
    Panicked(String),

    /// The worker went away without sending its reply.
    #[error("worker exited without replying")]
    Disconnected,

    /// A unary computation was called without an input value.
    #[error(transparent)]
    MissingInput(#[from] MissingInput),
}
