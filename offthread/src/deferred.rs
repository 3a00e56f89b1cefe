use std::{
    future::Future,
    pin::Pin,
    task::{self, Poll},
};

#[cfg(feature = "metrics")]
use std::time::Instant;

use futures::ready;
use offthread_core::ContextHandle;
use pin_project::{pin_project, pinned_drop};
use tokio::sync::oneshot;
use tracing::debug;

use crate::{ComputeError, bootstrap::Reply, stopwatch::Stopwatch};

#[cfg(feature = "metrics")]
use crate::metrics::{COMPUTE_DURATION, WORKER_PANIC_COUNTER};

const POLL_AFTER_READY_ERROR: &str = "Deferred can't be polled after settling";

#[pin_project(project = StateProj)]
enum State<T> {
    Waiting {
        #[pin]
        reply: oneshot::Receiver<Reply<T>>,
        context: Option<ContextHandle>,
    },
    Rejected {
        error: Option<ComputeError>,
    },
    Settled,
}

/// Result of a computation running on a worker.
///
/// Resolves exactly once, to the worker's reply or to the error that kept
/// the worker from replying. On settlement the labeled timer (if any) is
/// stopped first, then the worker is released.
///
/// `Deferred` does not need a particular async runtime.
#[pin_project(PinnedDrop)]
pub struct Deferred<T> {
    #[pin]
    state: State<T>,
    stopwatch: Option<Stopwatch>,
    #[cfg(feature = "metrics")]
    dispatched: Instant,
}

impl<T> Deferred<T> {
    pub(crate) fn waiting(
        reply: oneshot::Receiver<Reply<T>>,
        context: ContextHandle,
        stopwatch: Option<Stopwatch>,
    ) -> Self {
        Self {
            state: State::Waiting {
                reply,
                context: Some(context),
            },
            stopwatch,
            #[cfg(feature = "metrics")]
            dispatched: Instant::now(),
        }
    }

    pub(crate) fn rejected(error: ComputeError, stopwatch: Option<Stopwatch>) -> Self {
        Self {
            state: State::Rejected { error: Some(error) },
            stopwatch,
            #[cfg(feature = "metrics")]
            dispatched: Instant::now(),
        }
    }

    /// Returns `true` once the value has been yielded.
    ///
    /// `.await` consumes the `Deferred`, so this is only observable on a
    /// value polled through a pinned reference (e.g. `pin!(deferred)` awaited
    /// via `as_mut()`).
    pub fn is_settled(&self) -> bool {
        matches!(self.state, State::Settled)
    }

    /// Returns `true` if construction failed and this value will resolve to
    /// an error without involving a worker.
    pub fn is_rejected(&self) -> bool {
        matches!(self.state, State::Rejected { .. })
    }

    /// Name of the worker computing this value, while it is still running.
    pub fn worker(&self) -> Option<&str> {
        match &self.state {
            State::Waiting {
                context: Some(context),
                ..
            } => Some(context.name()),
            _ => None,
        }
    }
}

impl<T> Future for Deferred<T> {
    type Output = Result<T, ComputeError>;

    fn poll(self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        let (result, context, rejected) = match this.state.as_mut().project() {
            StateProj::Waiting { reply, context } => {
                let reply = ready!(reply.poll(cx));
                let result = match reply {
                    Ok(result) => result,
                    Err(_) => Err(ComputeError::Disconnected),
                };
                (result, context.take(), false)
            }
            StateProj::Rejected { error } => (
                Err(error.take().expect(POLL_AFTER_READY_ERROR)),
                None,
                true,
            ),
            StateProj::Settled => panic!("{}", POLL_AFTER_READY_ERROR),
        };
        this.state.set(State::Settled);

        if let Some(stopwatch) = this.stopwatch.take() {
            stopwatch.stop();
        }

        // A rejected value never reached a worker, so it is not timed.
        #[cfg(feature = "metrics")]
        if !rejected {
            if matches!(result, Err(ComputeError::Panicked(_))) {
                metrics::counter!(*WORKER_PANIC_COUNTER).increment(1);
            }
            metrics::histogram!(*COMPUTE_DURATION, "path" => "background")
                .record(this.dispatched.elapsed().as_secs_f64());
        }
        #[cfg(not(feature = "metrics"))]
        let _ = rejected;

        if let Some(context) = context {
            let worker = context.name().to_owned();
            let joined = context.release();
            debug!(target: "offthread::executor", worker = %worker, joined, "worker released");
        }

        Poll::Ready(result)
    }
}

#[pinned_drop]
impl<T> PinnedDrop for Deferred<T> {
    fn drop(self: Pin<&mut Self>) {
        if let State::Waiting {
            context: Some(context),
            ..
        } = &self.state
        {
            debug!(
                target: "offthread::executor",
                worker = context.name(),
                "deferred dropped before reply, worker detached"
            );
        }
    }
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            State::Waiting { .. } => "waiting",
            State::Rejected { .. } => "rejected",
            State::Settled => "settled",
        };
        f.debug_struct("Deferred")
            .field("state", &state)
            .field("worker", &self.worker())
            .finish()
    }
}
