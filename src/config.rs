use std::time::Duration;

use serde::Deserialize;

/// Tick period used when nothing else is configured.
pub const DEFAULT_TICK_MS: u64 = 16;
/// Ramp duration used when nothing else is configured.
pub const DEFAULT_RAMP_MS: u64 = 1000;
/// Longest accepted tick period (one hour).
pub const MAX_TICK_MS: u64 = 3_600_000;

/// Playback timing. Both values are clamped to at least 1 ms when applied;
/// the tick period is also capped at [`MAX_TICK_MS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Fixed scheduler period.
    pub tick_ms: u64,
    /// Time to move from one row to the next.
    pub ramp_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            ramp_ms: DEFAULT_RAMP_MS,
        }
    }
}

impl PlayerConfig {
    /// Defaults overridden by `RAMP_TICK_MS` / `RAMP_MS` when they parse.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("RAMP_TICK_MS").and_then(|s| s.trim().parse().ok()) {
            self.tick_ms = v;
        }
        if let Some(v) = lookup("RAMP_MS").and_then(|s| s.trim().parse().ok()) {
            self.ramp_ms = v;
        }
        self
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.clamp(1, MAX_TICK_MS))
    }
}
