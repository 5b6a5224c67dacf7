//! Simulator session: all per-student state behind one owner.
//!
//! One [`SimulatorSession`] exists per student visit to the learning zone.
//! It owns the player, the progression counters and the challenge engine,
//! and recomputes the interaction target after every movement command.
//! Nothing here is global; tests can run any number of sessions in-process.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::challenge::{ChallengeEngine, ChallengeSession, Solved};
use crate::config::LearnZoneConfig;
use crate::error::{LearnZoneError, Result};
use crate::movement::{Direction, PlayerState};
use crate::progression::ProgressionState;
use crate::proximity;
use crate::types::{SessionId, ZoneId};
use crate::zone::{Item, Zone, ZoneRegistry};

/// Serializable view of a session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub session_id: SessionId,
    /// Player position and heading.
    pub player: PlayerState,
    /// Current level.
    pub level: u32,
    /// XP toward the next level.
    pub xp: u32,
    /// XP needed for the next level.
    pub xp_to_next_level: u32,
    /// `xp / xp_to_next_level`.
    pub progress: f64,
    /// Zone currently in reach.
    pub interaction_target: Option<ZoneId>,
    /// Whether the zone in reach is still locked.
    pub target_locked: bool,
    /// The open challenge, if any.
    pub challenge: Option<ChallengeSession>,
}

/// Per-student simulator state.
#[derive(Debug, Clone)]
pub struct SimulatorSession {
    id: SessionId,
    config: LearnZoneConfig,
    registry: Arc<ZoneRegistry>,
    player: PlayerState,
    progression: ProgressionState,
    challenge: ChallengeEngine,
    target: Option<ZoneId>,
}

impl SimulatorSession {
    /// Start a session at the origin with fresh progression.
    #[must_use]
    pub fn new(config: LearnZoneConfig, registry: Arc<ZoneRegistry>) -> Self {
        let progression = ProgressionState::new(&config.progression);
        let mut session = Self {
            id: SessionId::new(),
            config,
            registry,
            player: PlayerState::origin(),
            progression,
            challenge: ChallengeEngine::new(),
            target: None,
        };
        session.refresh_target();
        session
    }

    /// Build a session from configuration alone, including its zone registry.
    ///
    /// # Errors
    /// Returns `LearnZoneError::Config` if the configured zones are invalid.
    pub fn from_config(config: LearnZoneConfig) -> Result<Self> {
        let registry = Arc::new(config.zone_registry()?);
        Ok(Self::new(config, registry))
    }

    // ------------------------------------------------------------------
    // Movement & proximity
    // ------------------------------------------------------------------

    /// Apply a movement command and recompute the interaction target.
    ///
    /// Returns the new interaction target.
    pub fn move_player(&mut self, direction: Direction) -> Option<&ZoneId> {
        self.player = self.player.step(direction, &self.config.movement);
        self.refresh_target();
        self.target.as_ref()
    }

    /// The zone currently in reach.
    #[must_use]
    pub fn interaction_target(&self) -> Option<&Zone> {
        self.target.as_ref().and_then(|id| self.registry.get(id))
    }

    fn refresh_target(&mut self) {
        let next = proximity::nearest_zone(
            &self.player,
            &self.registry,
            self.config.proximity.interaction_radius,
        )
        .map(|hit| hit.zone.id().clone());

        if next != self.target {
            debug!(
                session = %self.id,
                from = ?self.target.as_ref().map(ZoneId::as_str),
                to = ?next.as_ref().map(ZoneId::as_str),
                "Interaction target changed"
            );
            self.target = next;
        }
    }

    // ------------------------------------------------------------------
    // Challenges
    // ------------------------------------------------------------------

    /// Open the challenge of the zone currently in reach.
    ///
    /// # Errors
    /// `InvalidInput` if no zone is in reach, otherwise as
    /// [`ChallengeEngine::open`].
    pub fn interact(&mut self) -> Result<()> {
        let zone_id = self
            .target
            .clone()
            .ok_or_else(|| LearnZoneError::InvalidInput("no zone in reach".into()))?;
        self.open_challenge(&zone_id)
    }

    /// Open the challenge of a specific zone.
    ///
    /// # Errors
    /// `UnknownZone`, or as [`ChallengeEngine::open`].
    pub fn open_challenge(&mut self, zone_id: &ZoneId) -> Result<()> {
        let zone = self
            .registry
            .get(zone_id)
            .ok_or_else(|| LearnZoneError::UnknownZone(zone_id.clone()))?;
        self.challenge.open(zone, &self.progression)
    }

    /// Drop an item into the workspace slot.
    ///
    /// # Errors
    /// As [`ChallengeEngine::place_item`].
    pub fn place_item(&mut self, item: Item) -> Result<()> {
        self.challenge
            .place_item(item, self.config.challenge.reject_foreign_items)
    }

    /// Run the placed item against the open challenge.
    ///
    /// # Errors
    /// As [`ChallengeEngine::run`].
    pub fn run(&mut self) -> Result<Solved> {
        self.challenge.run(&mut self.progression)
    }

    /// Cancel the open challenge.
    pub fn close_challenge(&mut self) -> Option<ZoneId> {
        self.challenge.close()
    }

    /// Complete the deferred dismissal of a solved challenge.
    pub fn finish_auto_close(&mut self) -> Option<ZoneId> {
        self.challenge.finish_auto_close()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Player state.
    #[must_use]
    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    /// Progression counters.
    #[must_use]
    pub fn progression(&self) -> &ProgressionState {
        &self.progression
    }

    /// The open challenge, if any.
    #[must_use]
    pub fn challenge(&self) -> Option<&ChallengeSession> {
        self.challenge.session()
    }

    /// The zone registry.
    #[must_use]
    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    /// Configuration this session runs with.
    #[must_use]
    pub fn config(&self) -> &LearnZoneConfig {
        &self.config
    }

    /// Serializable view for rendering.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let target = self.interaction_target();
        SessionSnapshot {
            session_id: self.id,
            player: self.player,
            level: self.progression.level,
            xp: self.progression.xp,
            xp_to_next_level: self.progression.xp_to_next_level,
            progress: self.progression.progress_fraction(),
            interaction_target: target.map(|z| z.id().clone()),
            target_locked: target.is_some_and(|z| !z.is_unlocked_for(self.progression.level)),
            challenge: self.challenge.session().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::ChallengePhase;

    fn session() -> SimulatorSession {
        SimulatorSession::from_config(LearnZoneConfig::default()).expect("builtin config")
    }

    #[test]
    fn starts_at_origin_without_target() {
        let s = session();
        assert_eq!(*s.player(), PlayerState::origin());
        assert!(s.interaction_target().is_none());
        assert_eq!(s.progression().level, 1);
    }

    #[test]
    fn interact_without_target_is_invalid_input() {
        let mut s = session();
        assert!(matches!(s.interact(), Err(LearnZoneError::InvalidInput(_))));
        assert!(s.challenge().is_none());
    }

    #[test]
    fn walking_forward_reaches_the_camp() {
        let mut s = session();
        for _ in 0..3 {
            s.move_player(Direction::Forward);
        }
        // z = -120, 80 from the camp.
        assert_eq!(
            s.interaction_target().map(|z| z.id().as_str()),
            Some("programming_camp")
        );
        s.move_player(Direction::Backward);
        // z = -80, 120 from the camp.
        assert!(s.interaction_target().is_none());
    }

    #[test]
    fn unknown_zone_rejected() {
        let mut s = session();
        assert!(matches!(
            s.open_challenge(&ZoneId::from("nowhere")),
            Err(LearnZoneError::UnknownZone(_))
        ));
    }

    #[test]
    fn snapshot_reflects_challenge_state() {
        let mut s = session();
        for _ in 0..4 {
            s.move_player(Direction::Forward);
        }
        s.interact().expect("camp opens");
        s.place_item(Item::new("block_speak", "Speak", "Speak(...)"))
            .expect("placed");
        s.run().expect("solved");

        let snap = s.snapshot();
        assert_eq!(snap.xp, 50);
        assert!((snap.progress - 0.5).abs() < 1e-12);
        assert_eq!(snap.interaction_target, Some(ZoneId::from("programming_camp")));
        assert!(!snap.target_locked);
        let challenge = snap.challenge.expect("closing challenge visible");
        assert_eq!(challenge.phase, ChallengePhase::Closing);

        let json = serde_json::to_string(&s.snapshot()).expect("serializes");
        assert!(json.contains("programming_camp"));
    }

    #[test]
    fn separate_sessions_do_not_share_state() {
        let mut a = session();
        let b = session();
        a.move_player(Direction::Forward);
        assert_ne!(a.player(), b.player());
        assert_ne!(a.id(), b.id());
    }
}
