//! Executor configuration.

use offthread_core::FacilityMode;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

const DEFAULT_THREAD_NAME_PREFIX: &str = "offthread-worker";

/// Configuration for the [`Executor`](crate::Executor).
///
/// Deserializable with every field optional:
///
/// ```
/// use offthread::ExecutorConfig;
/// use offthread::FacilityMode;
///
/// let config: ExecutorConfig = serde_json::from_str(r#"{"facility":"inline"}"#).unwrap();
/// assert_eq!(config.facility, FacilityMode::Inline);
/// assert_eq!(config.thread_name_prefix, "offthread-worker");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// How the background facility is chosen.
    pub facility: FacilityMode,
    /// Worker threads are named `<prefix>-<n>`.
    pub thread_name_prefix: SmolStr,
    /// Stack size for worker threads in bytes.
    /// None means the platform default.
    pub stack_size: Option<usize>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            facility: FacilityMode::Auto,
            thread_name_prefix: SmolStr::new_static(DEFAULT_THREAD_NAME_PREFIX),
            stack_size: None,
        }
    }
}

impl ExecutorConfig {
    /// Create a new builder for ExecutorConfig.
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::default()
    }
}

/// Builder for ExecutorConfig.
#[derive(Debug, Clone)]
pub struct ExecutorConfigBuilder {
    facility: FacilityMode,
    thread_name_prefix: SmolStr,
    stack_size: Option<usize>,
}

impl Default for ExecutorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutorConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            facility: FacilityMode::Auto,
            thread_name_prefix: SmolStr::new_static(DEFAULT_THREAD_NAME_PREFIX),
            stack_size: None,
        }
    }

    /// Set the facility mode.
    pub fn facility(self, facility: FacilityMode) -> Self {
        Self { facility, ..self }
    }

    /// Set the worker thread name prefix.
    pub fn thread_name_prefix(self, prefix: impl Into<SmolStr>) -> Self {
        Self {
            thread_name_prefix: prefix.into(),
            ..self
        }
    }

    /// Set the worker stack size in bytes.
    pub fn stack_size(self, bytes: usize) -> Self {
        Self {
            stack_size: Some(bytes),
            ..self
        }
    }

    /// Build the ExecutorConfig.
    pub fn build(self) -> ExecutorConfig {
        ExecutorConfig {
            facility: self.facility,
            thread_name_prefix: self.thread_name_prefix,
            stack_size: self.stack_size,
        }
    }
}
