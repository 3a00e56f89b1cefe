//! Tracing utilities for asserting on emitted diagnostics.
//!
//! Captures every event under an `offthread` target so tests can check the
//! timer and bootstrap events and their order.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use offthread::{ContextHandle, Job, Spawner, ThreadSpawner};
use tracing::Dispatch;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// Captured event information.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    /// The event target (e.g. "offthread::timer")
    pub target: String,
    /// The event level
    pub level: tracing::Level,
    /// The formatted message
    pub message: String,
    /// Name of the thread that emitted the event
    pub thread: Option<String>,
    /// Captured field values as strings, message excluded
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    /// Look up a field value by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .push((field.name().to_string(), value.to_string()));
        }
    }
}

/// A tracing layer that captures offthread events.
pub struct EventCaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for EventCaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("offthread") {
            return;
        }

        let mut visitor = FieldVisitor {
            message: String::new(),
            fields: Vec::new(),
        };
        event.record(&mut visitor);

        self.events.lock().unwrap().push(CapturedEvent {
            target: metadata.target().to_string(),
            level: *metadata.level(),
            message: visitor.message,
            thread: std::thread::current().name().map(String::from),
            fields: visitor.fields,
        });
    }
}

/// Collector for captured events.
#[derive(Clone)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    dispatch: Dispatch,
}

/// Create a new event collector with its associated dispatch.
pub fn create_event_collector() -> EventCollector {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCaptureLayer {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(layer);
    EventCollector {
        events,
        dispatch: Dispatch::new(subscriber),
    }
}

impl EventCollector {
    /// Get the dispatch to install with `tracing::dispatcher::set_default`.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Get all captured events.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Get captured events for one target, in order.
    pub fn by_target(&self, target: &str) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.target == target)
            .cloned()
            .collect()
    }

    /// Get `(message, label)` pairs of timer events, in order.
    pub fn timer_events(&self) -> Vec<(String, String)> {
        self.by_target("offthread::timer")
            .into_iter()
            .map(|e| {
                let label = e.field("label").unwrap_or_default().to_string();
                (e.message, label)
            })
            .collect()
    }
}

/// Spawner that records how many bootstrap events had been emitted each
/// time it was asked to build a context, then delegates to threads.
#[derive(Debug, Clone)]
pub struct ObservingSpawner {
    collector_events: Arc<Mutex<Vec<CapturedEvent>>>,
    pub scripts_seen_at_spawn: Arc<Mutex<Vec<usize>>>,
}

impl ObservingSpawner {
    pub fn new(collector: &EventCollector) -> Self {
        Self {
            collector_events: collector.events.clone(),
            scripts_seen_at_spawn: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Spawner for ObservingSpawner {
    fn spawn(&self, name: &str, job: Job) -> std::io::Result<ContextHandle> {
        let seen = self
            .collector_events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.target == "offthread::bootstrap")
            .count();
        self.scripts_seen_at_spawn.lock().unwrap().push(seen);
        ThreadSpawner::new().spawn(name, job)
    }
}

/// Spawner that never builds a context.
#[derive(Debug, Clone)]
pub struct FailingSpawner {
    pub message: &'static str,
}

impl Spawner for FailingSpawner {
    fn spawn(&self, _name: &str, _job: Job) -> std::io::Result<ContextHandle> {
        Err(std::io::Error::other(self.message))
    }
}

/// Spawner that accepts every call but throws the job away, so no reply is
/// ever sent.
#[derive(Debug, Clone)]
pub struct DroppingSpawner;

impl Spawner for DroppingSpawner {
    fn spawn(&self, name: &str, job: Job) -> std::io::Result<ContextHandle> {
        drop(job);
        Ok(ContextHandle::detached(name))
    }
}
