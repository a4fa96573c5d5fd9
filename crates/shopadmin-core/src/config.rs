//! View-model options

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Behaviour knobs shared by every collection view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Quiet period before a typed search is applied
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Abort the in-flight fetch when a newer one is dispatched
    #[serde(default = "default_cancel_superseded")]
    pub cancel_superseded: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            cancel_superseded: default_cancel_superseded(),
        }
    }
}

impl ViewOptions {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_cancel_superseded() -> bool {
    true
}
