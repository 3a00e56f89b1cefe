use std::{
    fmt,
    future::{Future, IntoFuture},
    pin::Pin,
    task::{self, Poll},
};

use offthread_core::Facility;
use pin_project::pin_project;

use crate::{ComputeError, Deferred};

/// Value returned by [`compute`](crate::compute).
///
/// The shape tells which path was taken: [`Outcome::Immediate`] when the
/// computation already ran on the caller's thread, [`Outcome::Deferred`]
/// when it was handed to a worker. Callers that don't care can `.await` the
/// outcome either way:
///
/// ```
/// use offthread::{Computation, DebugOptions, Executor};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), offthread::ComputeError> {
/// for executor in [Executor::inline(), Executor::threaded()] {
///     let value = executor
///         .compute(Computation::unary(|x: i32| x * 2), Some(21), DebugOptions::default())?
///         .await?;
///     assert_eq!(value, 42);
/// }
/// # Ok(())
/// # }
/// ```
pub enum Outcome<T> {
    /// Computed synchronously.
    Immediate(T),
    /// Computing on a worker.
    Deferred(Deferred<T>),
}

impl<T> Outcome<T> {
    /// Returns `true` if the value is still being computed elsewhere.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Returns `true` if the value is already available.
    pub fn is_immediate(&self) -> bool {
        matches!(self, Self::Immediate(_))
    }

    /// Which facility produced this outcome.
    pub fn facility(&self) -> Facility {
        match self {
            Self::Immediate(_) => Facility::Inline,
            Self::Deferred(_) => Facility::Background,
        }
    }

    /// Returns the value if it was computed synchronously.
    pub fn into_immediate(self) -> Option<T> {
        match self {
            Self::Immediate(value) => Some(value),
            Self::Deferred(_) => None,
        }
    }

    /// Returns the pending value if it was handed to a worker.
    pub fn into_deferred(self) -> Option<Deferred<T>> {
        match self {
            Self::Immediate(_) => None,
            Self::Deferred(deferred) => Some(deferred),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate(value) => f.debug_tuple("Immediate").field(value).finish(),
            Self::Deferred(deferred) => f.debug_tuple("Deferred").field(deferred).finish(),
        }
    }
}

impl<T> IntoFuture for Outcome<T> {
    type Output = Result<T, ComputeError>;
    type IntoFuture = OutcomeFuture<T>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Immediate(value) => OutcomeFuture::Ready(Some(value)),
            Self::Deferred(deferred) => OutcomeFuture::Deferred(deferred),
        }
    }
}

/// Future returned by awaiting an [`Outcome`].
#[pin_project(project = OutcomeFutureProj)]
pub enum OutcomeFuture<T> {
    /// Value already computed.
    Ready(Option<T>),
    /// Waiting on a worker.
    Deferred(#[pin] Deferred<T>),
}

impl<T> Future for OutcomeFuture<T> {
    type Output = Result<T, ComputeError>;

    fn poll(self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            OutcomeFutureProj::Ready(value) => Poll::Ready(Ok(value
                .take()
                .expect("OutcomeFuture can't be polled after finishing"))),
            OutcomeFutureProj::Deferred(deferred) => deferred.poll(cx),
        }
    }
}
