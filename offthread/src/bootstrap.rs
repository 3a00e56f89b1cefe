//! The one-shot program a worker runs.
//!
//! A [`Bootstrap`] pairs a worker name with a [`Computation`]. Turned into a
//! [`Job`], it waits for exactly one inbound message, applies the
//! computation, and sends exactly one reply. Panics are caught and sent back
//! as [`ComputeError::Panicked`] so the caller never waits on a reply that
//! cannot come.
//!
//! Its `Display` form is the single-line description printed when
//! [`DebugOptions::print_script`](crate::DebugOptions::print_script) is set:
//!
//! ```text
//! offthread-worker-0: on_message(|data: i32| post_message((fn(i32) -> i32)(data)))
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use offthread_core::{Computation, Job};
use tokio::sync::oneshot;
use tracing::{Dispatch, debug, info_span, warn};

use crate::ComputeError;

/// Message sent back from a worker.
pub(crate) type Reply<T> = Result<T, ComputeError>;

/// Worker program for a single computation.
pub struct Bootstrap<T> {
    worker: String,
    computation: Computation<T>,
}

impl<T> Bootstrap<T> {
    pub(crate) fn new(worker: String, computation: Computation<T>) -> Self {
        Self {
            worker,
            computation,
        }
    }

    /// Name of the worker that will run this program.
    pub fn worker(&self) -> &str {
        &self.worker
    }

    /// The computation the worker applies.
    pub fn computation(&self) -> Computation<T> {
        self.computation
    }
}

impl<T> Bootstrap<T>
where
    T: Send + 'static,
{
    /// Builds the job handed to the spawner.
    ///
    /// `dispatch` is installed as the worker's default subscriber so its
    /// events land where the caller's do.
    pub(crate) fn into_job(
        self,
        inbound: oneshot::Receiver<Option<T>>,
        reply: oneshot::Sender<Reply<T>>,
        dispatch: Dispatch,
    ) -> Job {
        let Self {
            worker,
            computation,
        } = self;

        Box::new(move || {
            tracing::dispatcher::with_default(&dispatch, || {
                let span = info_span!("offthread.worker", worker = %worker);
                let _entered = span.enter();

                let Ok(input) = inbound.blocking_recv() else {
                    debug!(target: "offthread::executor", "inbound channel closed before any message");
                    return;
                };

                let result = match panic::catch_unwind(AssertUnwindSafe(|| computation.apply(input)))
                {
                    Ok(applied) => applied.map_err(ComputeError::from),
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        warn!(target: "offthread::executor", panic = %message, "computation panicked");
                        Err(ComputeError::Panicked(message))
                    }
                };

                if reply.send(result).is_err() {
                    debug!(target: "offthread::executor", "reply dropped, caller no longer waiting");
                }
            })
        })
    }
}

impl<T> fmt::Display for Bootstrap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: on_message(|data: {}| post_message(({})(data)))",
            self.worker,
            type_name::<T>(),
            self.computation.signature(),
        )
    }
}

impl<T> fmt::Debug for Bootstrap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrap")
            .field("worker", &self.worker)
            .field("computation", &self.computation)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("Box<dyn Any>")
    }
}
