//! Background execution capability.

use serde::{Deserialize, Serialize};

/// Whether work can leave the caller's thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facility {
    /// Worker threads can be spawned.
    Background,
    /// No worker threads; computations run on the caller's thread.
    Inline,
}

impl Facility {
    /// Probes the current target for thread support.
    ///
    /// `wasm` builds without the `atomics` target feature lack threads, and
    /// so does `wasm32-unknown-unknown` even with it (std cannot spawn there).
    /// Everything else reports [`Facility::Background`].
    pub fn detect() -> Self {
        if cfg!(all(
            target_family = "wasm",
            any(not(target_feature = "atomics"), target_os = "unknown")
        )) {
            Self::Inline
        } else {
            Self::Background
        }
    }

    /// Returns `true` for [`Facility::Background`].
    pub fn is_background(&self) -> bool {
        matches!(self, Self::Background)
    }

    /// Returns a short name used in logs and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Inline => "inline",
        }
    }
}

/// Configured facility selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityMode {
    /// Use [`Facility::detect`].
    #[default]
    Auto,
    /// Always offload to a worker thread.
    Background,
    /// Always run on the caller's thread.
    Inline,
}

impl FacilityMode {
    /// Resolves the mode to a concrete facility.
    pub fn resolve(self) -> Facility {
        match self {
            Self::Auto => Facility::detect(),
            Self::Background => Facility::Background,
            Self::Inline => Facility::Inline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_modes_resolve_verbatim() {
        assert_eq!(FacilityMode::Background.resolve(), Facility::Background);
        assert_eq!(FacilityMode::Inline.resolve(), Facility::Inline);
    }

    #[cfg(not(target_family = "wasm"))]
    #[test]
    fn native_targets_have_threads() {
        assert!(Facility::detect().is_background());
        assert_eq!(FacilityMode::Auto.resolve(), Facility::Background);
    }

    #[test]
    fn mode_deserializes_from_snake_case() {
        let mode: FacilityMode = serde_json::from_str("\"inline\"").unwrap();
        assert_eq!(mode, FacilityMode::Inline);
        let mode: FacilityMode = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(mode, FacilityMode::Auto);
    }
}
