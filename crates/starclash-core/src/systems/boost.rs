//! Boost skill and combo streak timers.
//!
//! The boost is a cooldown-gated, timed multiplier on player production.
//! The combo counts player conquests that follow each other within a
//! wall-clock window.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{BoostConfig, ComboConfig};

/// Player production boost
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoostState {
    pub active: bool,
    /// Seconds until the boost can be used again
    pub cooldown: f32,
    /// Seconds of boost remaining while active
    pub time_left: f32,
}

impl BoostState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    /// Start the boost. Returns false and changes nothing while cooling down.
    pub fn activate(&mut self, config: &BoostConfig) -> bool {
        if !config.enabled || !self.is_ready() {
            return false;
        }
        self.active = config.duration_secs > 0.0;
        self.time_left = config.duration_secs;
        self.cooldown = config.cooldown_secs;
        true
    }

    /// Count both timers down. Returns true on the tick the boost runs out.
    pub fn update(&mut self, delta_seconds: f32) -> bool {
        let mut expired = false;
        if self.active {
            self.time_left -= delta_seconds;
            if self.time_left <= 0.0 {
                self.active = false;
                self.time_left = 0.0;
                expired = true;
            }
        }
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - delta_seconds).max(0.0);
        }
        expired
    }

    /// Production multiplier for player planets right now
    pub fn multiplier(&self, config: &BoostConfig) -> f32 {
        if self.active {
            config.multiplier
        } else {
            1.0
        }
    }
}

/// Conquest streak and tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboTracker {
    pub combo: u32,
    /// Total player conquests this session
    pub conquered: u32,
    last_conquest: Option<Duration>,
}

impl ComboTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a player conquest at wall-clock time `now`
    pub fn record_conquest(&mut self, now: Duration, config: &ComboConfig) {
        self.conquered += 1;
        if config.enabled {
            self.combo += 1;
            self.last_conquest = Some(now);
        }
    }

    /// Drop the streak when the window since the last conquest has passed.
    /// Returns true if a non-zero streak was reset.
    pub fn decay(&mut self, now: Duration, config: &ComboConfig) -> bool {
        let expired = match self.last_conquest {
            Some(at) => now.saturating_sub(at).as_secs_f32() > config.window_secs,
            None => true,
        };
        if !expired {
            return false;
        }
        let had_streak = self.combo > 0;
        self.combo = 0;
        had_streak
    }
}
