//! Labeled wall-clock timing.
//!
//! Emits one `timer started` event on creation and one `timer ended` event
//! when stopped, both under the `offthread::timer` target and carrying the
//! label. A stopwatch that is dropped without being stopped emits nothing.

use std::time::{Duration, Instant};

use smol_str::SmolStr;
use tracing::{debug, info};

/// Paired start/end timer.
#[derive(Debug)]
#[must_use = "a stopwatch only reports when stopped"]
pub struct Stopwatch {
    label: SmolStr,
    started: Instant,
}

impl Stopwatch {
    /// Starts timing under `label`.
    pub fn start(label: impl Into<SmolStr>) -> Self {
        let label = label.into();
        debug!(target: "offthread::timer", label = %label, "timer started");
        Self {
            label,
            started: Instant::now(),
        }
    }

    /// Label the stopwatch reports under.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Time since the stopwatch started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stops timing and reports the elapsed interval.
    pub fn stop(self) -> Duration {
        let elapsed = self.started.elapsed();
        info!(
            target: "offthread::timer",
            label = %self.label,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "timer ended"
        );
        elapsed
    }
}
