#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Worker bootstrap programs.
///
/// A [`Bootstrap`](bootstrap::Bootstrap) is what a worker runs: wait for one
/// input, apply the computation, reply once. Its `Display` form is the line
/// printed when [`DebugOptions::print_script`] is set.
pub mod bootstrap;

/// Executor configuration.
///
/// Provides [`ExecutorConfig`] and its builder, including the
/// [`FacilityMode`] selection and worker thread naming.
pub mod config;

mod deferred;
mod error;
mod executor;

/// Metrics collection.
///
/// When the `metrics` feature is enabled, this module provides counters
/// and histograms for:
/// - Dispatches per path (background, inline)
/// - Worker spawn failures and panics
/// - Time from dispatch to settlement
pub mod metrics;

/// Per-call debug options.
pub mod options;

mod outcome;

/// Labeled start/end timing.
pub mod stopwatch;

pub use config::{ExecutorConfig, ExecutorConfigBuilder};
pub use deferred::Deferred;
pub use error::ComputeError;
pub use executor::{Executor, compute};
pub use options::{DebugOptions, DebugOptionsBuilder};
pub use outcome::{Outcome, OutcomeFuture};

pub use offthread_core::{
    Computation, ContextHandle, Facility, FacilityMode, Job, MissingInput, Shape, Spawner,
    ThreadSpawner,
};

/// The `offthread` prelude.
///
/// ```rust
/// use offthread::prelude::*;
/// ```
///
/// This imports [`compute`], [`Computation`], [`DebugOptions`], [`Outcome`]
/// and [`ComputeError`].
pub mod prelude {
    pub use crate::{ComputeError, Computation, DebugOptions, Outcome, compute};
}
