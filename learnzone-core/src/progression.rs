//! Progression tracker: levels and experience.
//!
//! Invariant after every update: `0 <= xp < xp_to_next_level`. Awards that
//! cross several thresholds roll over into several level-ups, and the
//! threshold grows by a fixed increment after each one.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ProgressionConfig;

/// Level / XP counters for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    /// Current level (starts at 1 by default).
    pub level: u32,
    /// Experience accumulated toward the next level.
    pub xp: u32,
    /// Experience needed to reach the next level.
    pub xp_to_next_level: u32,
    #[serde(default = "default_increment")]
    threshold_increment: u32,
}

/// Result of an [`ProgressionState::award`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwardOutcome {
    /// XP that was awarded.
    pub awarded: u32,
    /// How many levels were gained.
    pub levels_gained: u32,
    /// Level after the award.
    pub level: u32,
}

impl ProgressionState {
    /// Fresh progression from configuration.
    ///
    /// A zero threshold would make the level-up loop unbounded, so it is
    /// raised to 1.
    #[must_use]
    pub fn new(config: &ProgressionConfig) -> Self {
        Self {
            level: config.initial_level,
            xp: 0,
            xp_to_next_level: config.initial_threshold.max(1),
            threshold_increment: config.threshold_increment,
        }
    }

    /// Add experience, rolling overflow into level-ups.
    pub fn award(&mut self, xp: u32) -> AwardOutcome {
        let start_level = self.level;
        let mut pool = u64::from(self.xp) + u64::from(xp);

        if self.threshold_increment == 0 {
            let threshold = u64::from(self.xp_to_next_level);
            let gained = u32::try_from(pool / threshold).unwrap_or(u32::MAX);
            self.level = self.level.saturating_add(gained);
            pool %= threshold;
        }
        while pool >= u64::from(self.xp_to_next_level) {
            pool -= u64::from(self.xp_to_next_level);
            self.level = self.level.saturating_add(1);
            self.xp_to_next_level = self
                .xp_to_next_level
                .saturating_add(self.threshold_increment);
        }
        // pool < xp_to_next_level <= u32::MAX here.
        self.xp = u32::try_from(pool).unwrap_or(u32::MAX);

        let levels_gained = self.level - start_level;
        if levels_gained > 0 {
            info!(
                level = self.level,
                levels_gained,
                xp = self.xp,
                next = self.xp_to_next_level,
                "Level up"
            );
        }

        AwardOutcome {
            awarded: xp,
            levels_gained,
            level: self.level,
        }
    }

    /// Fraction of the way to the next level, in `[0, 1)`.
    #[must_use]
    pub fn progress_fraction(&self) -> f64 {
        f64::from(self.xp) / f64::from(self.xp_to_next_level)
    }

    /// Whether a zone gated at `unlock_level` is open at the current level.
    #[must_use]
    pub fn has_reached(&self, unlock_level: u32) -> bool {
        self.level >= unlock_level
    }
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self::new(&ProgressionConfig::default())
    }
}

fn default_increment() -> u32 { 50 }
