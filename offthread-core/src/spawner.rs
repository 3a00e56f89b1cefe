//! Construction of background execution contexts.
//!
//! A [`Spawner`] turns a job into a running, isolated context and hands back
//! a [`ContextHandle`] the executor releases once the context has replied.
//! [`ThreadSpawner`] is the standard implementation; tests and embedders can
//! supply their own (for example a spawner that always fails, to exercise
//! the rejection path).

use std::fmt;
use std::io;
use std::thread::{self, JoinHandle};

/// Work executed inside a background context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Trait for constructing background execution contexts.
///
/// # Contract
///
/// `spawn` either starts exactly one context running `job` and returns its
/// handle, or returns an error without ever running `job`. Implementations
/// must not run `job` on the calling thread.
pub trait Spawner: Send + Sync + fmt::Debug {
    /// Starts a context named `name` that runs `job` once.
    fn spawn(&self, name: &str, job: Job) -> io::Result<ContextHandle>;
}

/// Spawns one named OS thread per context.
#[derive(Debug, Clone, Default)]
pub struct ThreadSpawner {
    stack_size: Option<usize>,
}

impl ThreadSpawner {
    /// Creates a spawner using the platform's default stack size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stack size of spawned threads, in bytes.
    pub fn stack_size(self, bytes: usize) -> Self {
        Self {
            stack_size: Some(bytes),
        }
    }
}

impl Spawner for ThreadSpawner {
    fn spawn(&self, name: &str, job: Job) -> io::Result<ContextHandle> {
        let mut builder = thread::Builder::new().name(name.to_owned());
        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }
        let handle = builder.spawn(job)?;
        Ok(ContextHandle::thread(name, handle))
    }
}

/// Handle to a running background context.
pub struct ContextHandle {
    name: String,
    thread: Option<JoinHandle<()>>,
}

impl ContextHandle {
    /// Wraps a spawned thread.
    pub fn thread(name: impl Into<String>, handle: JoinHandle<()>) -> Self {
        Self {
            name: name.into(),
            thread: Some(handle),
        }
    }

    /// A handle for contexts that cannot be joined (e.g. pooled or foreign
    /// threads). Releasing it is a no-op.
    pub fn detached(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            thread: None,
        }
    }

    /// Name the context was spawned with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the context has run to completion.
    ///
    /// Detached contexts always report `true`.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Releases the context.
    ///
    /// A finished thread is joined; one still unwinding its last frame after
    /// replying is detached and exits on its own. Never blocks on a thread
    /// that has not finished. Returns `true` if the thread was joined.
    pub fn release(mut self) -> bool {
        match self.thread.take() {
            Some(handle) if handle.is_finished() => handle.join().is_ok(),
            _ => false,
        }
    }
}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextHandle")
            .field("name", &self.name)
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn thread_spawner_names_the_thread() {
        let (tx, rx) = mpsc::channel();
        let handle = ThreadSpawner::new()
            .spawn(
                "offthread-test-0",
                Box::new(move || {
                    let name = thread::current().name().map(String::from);
                    tx.send(name).unwrap();
                }),
            )
            .unwrap();

        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("offthread-test-0"));
        assert_eq!(handle.name(), "offthread-test-0");

        while !handle.is_finished() {
            thread::yield_now();
        }
        assert!(handle.release());
    }

    #[test]
    fn release_does_not_block_on_running_thread() {
        let (tx, rx) = mpsc::channel::<()>();
        let handle = ThreadSpawner::new()
            .spawn(
                "offthread-test-1",
                Box::new(move || {
                    let _ = rx.recv();
                }),
            )
            .unwrap();

        assert!(!handle.is_finished());
        assert!(!handle.release());
        tx.send(()).unwrap();
    }

    #[test]
    fn detached_handle_is_always_finished() {
        let handle = ContextHandle::detached("foreign");
        assert!(handle.is_finished());
        assert!(!handle.release());
    }
}
