//! Configuration for the learnzone simulator.
//!
//! Maps directly to `learnzone.toml`. Every field has a default, so an
//! empty file yields the stock tuning.

use serde::{Deserialize, Serialize};

use crate::zone::{ZoneDefinition, ZoneRegistry};

/// Top-level learnzone configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LearnZoneConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Player movement tuning.
    #[serde(default)]
    pub movement: MovementConfig,
    /// Interaction radius.
    #[serde(default)]
    pub proximity: ProximityConfig,
    /// Level / XP thresholds.
    #[serde(default)]
    pub progression: ProgressionConfig,
    /// Challenge engine behavior.
    #[serde(default)]
    pub challenge: ChallengeConfig,
    /// Local account store settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Optional zone registry override. Empty means the built-in zones.
    #[serde(default)]
    pub zones: Vec<ZoneDefinition>,
}

impl LearnZoneConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `LearnZoneError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::LearnZoneError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Build the zone registry this configuration describes.
    ///
    /// # Errors
    /// Returns `LearnZoneError::Config` if the zone definitions are invalid.
    pub fn zone_registry(&self) -> crate::error::Result<ZoneRegistry> {
        if self.zones.is_empty() {
            Ok(ZoneRegistry::builtin())
        } else {
            ZoneRegistry::from_definitions(self.zones.clone())
        }
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    ///
    /// The crate only emits `tracing` events; the host applies this level
    /// when it installs its subscriber.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl GeneralConfig {
    /// The configured level, parsed for a subscriber filter.
    ///
    /// # Errors
    /// Returns `LearnZoneError::Config` for an unknown level name.
    pub fn tracing_level(&self) -> crate::error::Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| crate::LearnZoneError::Config(format!("unknown log level: {}", self.log_level)))
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Discrete movement steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Distance covered by one forward/backward step.
    #[serde(default = "default_step_distance")]
    pub step_distance: f64,
    /// Degrees turned by one left/right step.
    #[serde(default = "default_rotation_step")]
    pub rotation_step_degrees: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            step_distance: 40.0,
            rotation_step_degrees: 20.0,
        }
    }
}

/// Proximity resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityConfig {
    /// Zones strictly closer than this (ground plane) can be interacted with.
    #[serde(default = "default_interaction_radius")]
    pub interaction_radius: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            interaction_radius: 100.0,
        }
    }
}

/// Level / XP thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Level a new session starts at.
    #[serde(default = "default_initial_level")]
    pub initial_level: u32,
    /// XP needed for the first level-up.
    #[serde(default = "default_initial_threshold")]
    pub initial_threshold: u32,
    /// How much the threshold grows after each level-up.
    #[serde(default = "default_threshold_increment")]
    pub threshold_increment: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            initial_level: 1,
            initial_threshold: 100,
            threshold_increment: 50,
        }
    }
}

/// Challenge engine behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Delay before a solved challenge dismisses itself.
    #[serde(default = "default_auto_close_ms")]
    pub auto_close_ms: u64,
    /// Reject items whose type is not in the open challenge's toolbox.
    #[serde(default)]
    pub reject_foreign_items: bool,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            auto_close_ms: 3000,
            reject_foreign_items: false,
        }
    }
}

/// Local account store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Use WAL mode for the SQLite file.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { wal_mode: true }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_step_distance() -> f64 { 40.0 }
fn default_rotation_step() -> f64 { 20.0 }
fn default_interaction_radius() -> f64 { 100.0 }
fn default_initial_level() -> u32 { 1 }
fn default_initial_threshold() -> u32 { 100 }
fn default_threshold_increment() -> u32 { 50 }
fn default_auto_close_ms() -> u64 { 3000 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = LearnZoneConfig::from_toml("").expect("empty config parses");
        assert!((config.movement.step_distance - 40.0).abs() < f64::EPSILON);
        assert!((config.proximity.interaction_radius - 100.0).abs() < f64::EPSILON);
        assert_eq!(config.progression.initial_threshold, 100);
        assert_eq!(config.challenge.auto_close_ms, 3000);
        assert!(!config.challenge.reject_foreign_items);
        assert_eq!(config.zone_registry().expect("builtin").len(), 2);
    }

    #[test]
    fn log_level_parses_for_the_host_subscriber() {
        let config = LearnZoneConfig::default();
        assert_eq!(config.general.tracing_level().expect("default"), tracing::Level::INFO);

        let config = LearnZoneConfig::from_toml("[general]\nlog_level = \"debug\"\n").expect("parses");
        assert_eq!(config.general.tracing_level().expect("debug"), tracing::Level::DEBUG);

        let config = LearnZoneConfig::from_toml("[general]\nlog_level = \"loud\"\n").expect("parses");
        assert!(matches!(
            config.general.tracing_level(),
            Err(crate::LearnZoneError::Config(_))
        ));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = LearnZoneConfig::from_toml(
            r"
[movement]
step_distance = 10.0

[challenge]
reject_foreign_items = true
",
        )
        .expect("parses");
        assert!((config.movement.step_distance - 10.0).abs() < f64::EPSILON);
        assert!((config.movement.rotation_step_degrees - 20.0).abs() < f64::EPSILON);
        assert!(config.challenge.reject_foreign_items);
        assert_eq!(config.challenge.auto_close_ms, 3000);
    }

    #[test]
    fn zones_override_builtin_registry() {
        let config = LearnZoneConfig::from_toml(
            r#"
[[zones]]
id = "loop_lab"
name = "Loop Lab"
position = { x = 10.0, z = -50.0 }
is_locked = true
unlock_level = 3

[zones.challenge]
id = "loops_1"
title = "Repeat it"
description = "Use the Repeat block"
reward_xp = 75
toolbox = [
    { id = "block_repeat", type = "Repeat", content = "Repeat(3)" },
    { id = "block_speak", type = "Speak", content = "Speak(...)" },
]
solution = { item_type = "Repeat", value = "Again and again!" }

[[zones]]
id = "fountain"
name = "Fountain"
position = { x = 0.0, y = 0.0, z = 0.0 }
"#,
        )
        .expect("parses");

        let registry = config.zone_registry().expect("valid zones");
        assert_eq!(registry.len(), 2);
        let lab = registry.iter().next().expect("first zone");
        assert_eq!(lab.id().as_str(), "loop_lab");
        assert!(!lab.is_unlocked_for(2));
        assert!(lab.is_unlocked_for(3));
        assert_eq!(lab.challenge().map(|c| c.reward_xp), Some(75));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = LearnZoneConfig::from_toml("[movement\nstep_distance = ").expect_err("truncated toml");
        assert!(matches!(err, crate::LearnZoneError::Config(_)));
    }
}
