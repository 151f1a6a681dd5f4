//! Reader configuration.

use serde::{Deserialize, Serialize};

/// Tuning knobs for [`super::MessageReader`].
///
/// Missing fields deserialize to their defaults, so a provider can embed
/// this in its own configuration file and set only what it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Route simple id/correlation-id/lookup-id selectors to direct lookups.
    pub fast_paths: bool,
    /// Convert message bodies only after the headers matched.
    pub defer_body_conversion: bool,
    /// Give up a receive after this many lost races. `None` retries forever.
    pub max_race_retries: Option<u32>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fast_paths: true,
            defer_body_conversion: true,
            max_race_retries: None,
        }
    }
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fast_paths(mut self, enabled: bool) -> Self {
        self.fast_paths = enabled;
        self
    }

    pub fn with_deferred_body_conversion(mut self, enabled: bool) -> Self {
        self.defer_body_conversion = enabled;
        self
    }

    pub fn with_max_race_retries(mut self, retries: u32) -> Self {
        self.max_race_retries = Some(retries);
        self
    }
}
