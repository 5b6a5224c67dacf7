//! Challenge engine: the state machine for one open challenge.
//!
//! ```text
//!            open(zone)              run() ok
//! Closed ───────────────► Open ───────────────► Closing ──(auto close)──► Closed
//!   ▲                      │  ▲                    │
//!   │        close()       │  └── run() wrong ─────┘ (stays Open)
//!   └──────────────────────┘        close() from Closing dismisses early
//! ```
//!
//! The workspace has a single slot: placing an item replaces the previous
//! one. A solved challenge stays inspectable (feedback, character speech)
//! while closing, but every mutation is refused with
//! [`LearnZoneError::ChallengeClosing`], so a second `run()` can never
//! award experience twice.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LearnZoneError, Result};
use crate::progression::{AwardOutcome, ProgressionState};
use crate::types::{Feedback, ZoneId};
use crate::zone::{Challenge, Item, Lock, Zone};

/// Message shown when `run()` is pressed with an empty workspace.
pub const NO_ITEM_MESSAGE: &str = "Drag a block into the workspace first!";
/// Message shown when the placed block is not the solution.
pub const WRONG_ITEM_MESSAGE: &str = "That's not the right block. Try again!";

/// Where an open challenge is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePhase {
    /// Accepting items and runs.
    Open,
    /// Solved; read-only until dismissed.
    Closing,
}

/// Transient state of the open challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeSession {
    /// Zone hosting the challenge.
    pub zone_id: ZoneId,
    /// Definition copied from the zone.
    pub challenge: Challenge,
    /// Item in the single workspace slot.
    pub placed_item: Option<Item>,
    /// Latest feedback, if any.
    pub feedback: Option<Feedback>,
    /// What the character says after a successful run.
    pub character_speech: Option<String>,
    /// Lifecycle phase.
    pub phase: ChallengePhase,
}

/// A successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solved {
    /// Zone whose challenge was solved.
    pub zone_id: ZoneId,
    /// Progression change caused by the reward.
    pub award: AwardOutcome,
    /// The solution text spoken by the character.
    pub speech: String,
}

/// Holds at most one open challenge.
#[derive(Debug, Clone, Default)]
pub struct ChallengeEngine {
    session: Option<ChallengeSession>,
}

impl ChallengeEngine {
    /// Engine with no open challenge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the challenge hosted by `zone`.
    ///
    /// # Errors
    /// - [`LearnZoneError::ChallengeAlreadyOpen`] if a challenge is open.
    /// - [`LearnZoneError::LockedZone`] if the player's level is too low.
    /// - [`LearnZoneError::NoChallenge`] if the zone is a landmark.
    pub fn open(&mut self, zone: &Zone, progression: &ProgressionState) -> Result<()> {
        if let Some(session) = &self.session {
            return Err(LearnZoneError::ChallengeAlreadyOpen(session.zone_id.clone()));
        }

        let required_level = match zone.object.lock {
            Lock::UntilLevel(level) if !progression.has_reached(level) => Some(level),
            _ => None,
        };
        if let Some(required_level) = required_level {
            debug!(
                zone = %zone.id(),
                required_level,
                current_level = progression.level,
                "Rejected locked zone"
            );
            return Err(LearnZoneError::LockedZone {
                zone: zone.id().clone(),
                required_level,
                current_level: progression.level,
            });
        }

        let challenge = zone
            .challenge()
            .ok_or_else(|| LearnZoneError::NoChallenge(zone.id().clone()))?;

        info!(zone = %zone.id(), challenge = %challenge.id, "Challenge opened");
        self.session = Some(ChallengeSession {
            zone_id: zone.id().clone(),
            challenge: challenge.clone(),
            placed_item: None,
            feedback: None,
            character_speech: None,
            phase: ChallengePhase::Open,
        });
        Ok(())
    }

    /// Put an item into the workspace slot, replacing any previous item.
    ///
    /// When `reject_foreign` is set, items whose type the open challenge's
    /// toolbox does not offer are refused.
    ///
    /// # Errors
    /// [`LearnZoneError::NoActiveChallenge`], [`LearnZoneError::ChallengeClosing`],
    /// or [`LearnZoneError::ForeignItem`].
    pub fn place_item(&mut self, item: Item, reject_foreign: bool) -> Result<()> {
        let session = self.open_session_mut()?;
        if reject_foreign && !session.challenge.offers(&item.item_type) {
            return Err(LearnZoneError::ForeignItem(item.item_type));
        }
        debug!(zone = %session.zone_id, item = %item.item_type, "Item placed");
        session.placed_item = Some(item);
        Ok(())
    }

    /// Evaluate the placed item.
    ///
    /// On success the reward goes to `progression`, the solution text
    /// becomes the character's speech and the challenge enters
    /// [`ChallengePhase::Closing`]. Failed runs record error feedback and
    /// leave the workspace untouched.
    ///
    /// # Errors
    /// - [`LearnZoneError::NoActiveChallenge`] / [`LearnZoneError::ChallengeClosing`].
    /// - [`LearnZoneError::NoItemPlaced`] or [`LearnZoneError::WrongItem`]; both
    ///   also set error feedback on the session.
    pub fn run(&mut self, progression: &mut ProgressionState) -> Result<Solved> {
        let session = self.open_session_mut()?;
        session.character_speech = None;
        session.feedback = None;

        let Some(item) = &session.placed_item else {
            session.feedback = Some(Feedback::error(NO_ITEM_MESSAGE));
            return Err(LearnZoneError::NoItemPlaced);
        };

        if !session.challenge.is_solved_by(item) {
            debug!(
                zone = %session.zone_id,
                expected = %session.challenge.solution.item_type,
                placed = %item.item_type,
                "Wrong item"
            );
            let err = LearnZoneError::WrongItem {
                expected: session.challenge.solution.item_type.clone(),
                placed: item.item_type.clone(),
            };
            session.feedback = Some(Feedback::error(WRONG_ITEM_MESSAGE));
            return Err(err);
        }

        let reward = session.challenge.reward_xp;
        let award = progression.award(reward);
        let speech = session.challenge.solution.value.clone();

        session.feedback = Some(Feedback::success(format!(
            "Great! You earned {reward} experience points."
        )));
        session.character_speech = Some(speech.clone());
        session.phase = ChallengePhase::Closing;

        info!(
            zone = %session.zone_id,
            challenge = %session.challenge.id,
            reward,
            level = award.level,
            "Challenge solved"
        );

        Ok(Solved {
            zone_id: session.zone_id.clone(),
            award,
            speech,
        })
    }

    /// Dismiss the open challenge without awarding anything.
    ///
    /// Returns the zone that was closed, or `None` if nothing was open.
    pub fn close(&mut self) -> Option<ZoneId> {
        let session = self.session.take()?;
        info!(zone = %session.zone_id, phase = ?session.phase, "Challenge closed");
        Some(session.zone_id)
    }

    /// Complete the deferred dismissal of a solved challenge.
    ///
    /// No-op unless the challenge is in [`ChallengePhase::Closing`].
    pub fn finish_auto_close(&mut self) -> Option<ZoneId> {
        let closing = self
            .session
            .as_ref()
            .is_some_and(|s| s.phase == ChallengePhase::Closing);
        if closing { self.close() } else { None }
    }

    /// The open challenge, if any.
    #[must_use]
    pub fn session(&self) -> Option<&ChallengeSession> {
        self.session.as_ref()
    }

    /// Whether a challenge is open (including closing).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    fn open_session_mut(&mut self) -> Result<&mut ChallengeSession> {
        let session = self
            .session
            .as_mut()
            .ok_or(LearnZoneError::NoActiveChallenge)?;
        if session.phase == ChallengePhase::Closing {
            return Err(LearnZoneError::ChallengeClosing);
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeedbackKind;
    use crate::zone::ZoneRegistry;

    fn camp() -> Zone {
        ZoneRegistry::builtin()
            .get(&ZoneId::from("programming_camp"))
            .cloned()
            .expect("builtin camp")
    }

    fn speak() -> Item {
        Item::new("block_speak", "Speak", "Speak(...)")
    }

    fn open_camp() -> (ChallengeEngine, ProgressionState) {
        let mut engine = ChallengeEngine::new();
        let progression = ProgressionState::default();
        engine.open(&camp(), &progression).expect("camp opens");
        (engine, progression)
    }

    #[test]
    fn open_starts_empty() {
        let (engine, _) = open_camp();
        let s = engine.session().expect("open");
        assert_eq!(s.phase, ChallengePhase::Open);
        assert!(s.placed_item.is_none());
        assert!(s.feedback.is_none());
    }

    #[test]
    fn locked_zone_rejected_without_session() {
        let reg = ZoneRegistry::builtin();
        let workshop = reg.get(&ZoneId::from("graphics_workshop")).expect("workshop");
        let mut engine = ChallengeEngine::new();
        let err = engine
            .open(workshop, &ProgressionState::default())
            .expect_err("locked");
        assert!(matches!(
            err,
            LearnZoneError::LockedZone { required_level: 2, current_level: 1, .. }
        ));
        assert!(!engine.is_open());
    }

    #[test]
    fn unlocked_landmark_has_no_challenge() {
        let reg = ZoneRegistry::builtin();
        let workshop = reg.get(&ZoneId::from("graphics_workshop")).expect("workshop");
        let mut progression = ProgressionState::default();
        progression.award(100);
        let mut engine = ChallengeEngine::new();
        assert!(matches!(
            engine.open(workshop, &progression),
            Err(LearnZoneError::NoChallenge(_))
        ));
        assert!(!engine.is_open());
    }

    #[test]
    fn second_open_rejected() {
        let (mut engine, progression) = open_camp();
        assert!(matches!(
            engine.open(&camp(), &progression),
            Err(LearnZoneError::ChallengeAlreadyOpen(_))
        ));
    }

    #[test]
    fn run_without_item_sets_error_feedback() {
        let (mut engine, mut progression) = open_camp();
        let err = engine.run(&mut progression).expect_err("no item");
        assert!(matches!(err, LearnZoneError::NoItemPlaced));
        let fb = engine.session().and_then(|s| s.feedback.clone()).expect("feedback");
        assert_eq!(fb.kind, FeedbackKind::Error);
        assert_eq!(fb.message, NO_ITEM_MESSAGE);
        assert_eq!(progression, ProgressionState::default());
    }

    #[test]
    fn wrong_item_is_repeatable_and_awards_nothing() {
        let (mut engine, mut progression) = open_camp();
        engine
            .place_item(Item::new("block_move", "Move", "Move(1)"), false)
            .expect("placed");

        for _ in 0..3 {
            let err = engine.run(&mut progression).expect_err("wrong");
            assert!(matches!(err, LearnZoneError::WrongItem { .. }));
            let s = engine.session().expect("still open");
            assert_eq!(s.phase, ChallengePhase::Open);
            assert_eq!(s.placed_item.as_ref().map(|i| i.item_type.as_str()), Some("Move"));
            assert_eq!(
                s.feedback.as_ref().map(|f| f.message.as_str()),
                Some(WRONG_ITEM_MESSAGE)
            );
        }
        assert_eq!(progression, ProgressionState::default());
    }

    #[test]
    fn last_placed_item_wins() {
        let (mut engine, mut progression) = open_camp();
        engine
            .place_item(Item::new("block_move", "Move", "Move(1)"), false)
            .expect("placed");
        engine.place_item(speak(), false).expect("placed");
        assert!(engine.run(&mut progression).is_ok());
    }

    #[test]
    fn success_awards_once_then_refuses() {
        let (mut engine, mut progression) = open_camp();
        engine.place_item(speak(), false).expect("placed");

        let solved = engine.run(&mut progression).expect("solved");
        assert_eq!(solved.award.awarded, 50);
        assert_eq!(solved.speech, "Hello, world!");
        assert_eq!(progression.xp, 50);

        let s = engine.session().expect("still inspectable");
        assert_eq!(s.phase, ChallengePhase::Closing);
        assert_eq!(s.character_speech.as_deref(), Some("Hello, world!"));
        assert_eq!(s.feedback.as_ref().map(|f| f.kind), Some(FeedbackKind::Success));

        assert!(matches!(
            engine.run(&mut progression),
            Err(LearnZoneError::ChallengeClosing)
        ));
        assert!(matches!(
            engine.place_item(speak(), false),
            Err(LearnZoneError::ChallengeClosing)
        ));
        assert_eq!(progression.xp, 50);
    }

    #[test]
    fn finish_auto_close_only_when_closing() {
        let (mut engine, mut progression) = open_camp();
        assert!(engine.finish_auto_close().is_none());
        assert!(engine.is_open());

        engine.place_item(speak(), false).expect("placed");
        engine.run(&mut progression).expect("solved");
        assert_eq!(
            engine.finish_auto_close(),
            Some(ZoneId::from("programming_camp"))
        );
        assert!(!engine.is_open());
    }

    #[test]
    fn close_discards_without_reward() {
        let (mut engine, progression) = open_camp();
        engine.place_item(speak(), false).expect("placed");
        assert!(engine.close().is_some());
        assert!(!engine.is_open());
        assert_eq!(progression.xp, 0);
        assert!(engine.close().is_none());
    }

    #[test]
    fn foreign_items_rejected_when_configured() {
        let (mut engine, _) = open_camp();
        let foreign = Item::new("block_move", "Move", "Move(1)");
        assert!(matches!(
            engine.place_item(foreign.clone(), true),
            Err(LearnZoneError::ForeignItem(t)) if t == "Move"
        ));
        assert!(engine.session().and_then(|s| s.placed_item.as_ref()).is_none());
        assert!(engine.place_item(foreign, false).is_ok());
    }

    #[test]
    fn operations_without_open_challenge() {
        let mut engine = ChallengeEngine::new();
        let mut progression = ProgressionState::default();
        assert!(matches!(
            engine.place_item(speak(), false),
            Err(LearnZoneError::NoActiveChallenge)
        ));
        assert!(matches!(
            engine.run(&mut progression),
            Err(LearnZoneError::NoActiveChallenge)
        ));
    }
}
