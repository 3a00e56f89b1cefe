//! Per-call debug options.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Debug instrumentation for a single [`compute`](crate::compute) call.
///
/// Both switches are independent and off by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugOptions {
    /// Emit a paired `timer started` / `timer ended` event under this label.
    pub label: Option<SmolStr>,
    /// Emit the generated worker bootstrap before the worker is spawned.
    pub print_script: bool,
}

impl DebugOptions {
    /// Create a new builder for DebugOptions.
    pub fn builder() -> DebugOptionsBuilder {
        DebugOptionsBuilder::default()
    }

    /// Options with only a timing label set.
    pub fn labeled(label: impl Into<SmolStr>) -> Self {
        Self {
            label: Some(label.into()),
            print_script: false,
        }
    }

    /// Returns the timing label, if any.
    pub fn label(&self) -> Option<&SmolStr> {
        self.label.as_ref()
    }

    /// Returns `true` if the bootstrap should be printed.
    pub fn print_script(&self) -> bool {
        self.print_script
    }
}

/// Builder for DebugOptions.
#[derive(Debug, Clone, Default)]
pub struct DebugOptionsBuilder {
    label: Option<SmolStr>,
    print_script: bool,
}

impl DebugOptionsBuilder {
    /// Set the timing label.
    pub fn label(self, label: impl Into<SmolStr>) -> Self {
        Self {
            label: Some(label.into()),
            ..self
        }
    }

    /// Enable or disable printing of the worker bootstrap.
    pub fn print_script(self, enabled: bool) -> Self {
        Self {
            print_script: enabled,
            ..self
        }
    }

    /// Build the DebugOptions.
    pub fn build(self) -> DebugOptions {
        DebugOptions {
            label: self.label,
            print_script: self.print_script,
        }
    }
}
