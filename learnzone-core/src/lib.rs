//! # LearnZone Core Library
//!
//! Headless simulator for a gamified programming-lesson world.
//!
//! A student steers a character across a flat ground plane. Walking close
//! to a [`Zone`] makes it the interaction target; interacting opens its
//! challenge, where the student drops a toolbox item into a single
//! workspace slot and runs it. A correct item awards experience, which
//! drives level-ups that unlock further zones.
//!
//! - [`movement`]: discrete steps and rotations on the ground plane
//! - [`proximity`]: nearest zone within the interaction radius
//! - [`progression`]: level / XP counters with rollover
//! - [`challenge`]: open → place → run → close state machine
//! - [`session`]: all per-student state behind one owner
//! - [`live`]: a session plus its deferred auto-close timer
//! - [`account`]: the locally stored student record
//!
//! Rendering, input mapping and audio are host concerns. The crate only
//! emits `tracing` events; installing a subscriber is up to the host.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod account;
pub mod challenge;
pub mod config;
pub mod error;
pub mod live;
pub mod movement;
pub mod progression;
pub mod proximity;
pub mod session;
pub mod types;
pub mod zone;

pub use account::{AccountStore, SubscriptionPlan, UserProfile, UserRole};
pub use challenge::{ChallengeEngine, ChallengePhase, ChallengeSession, Solved};
pub use config::LearnZoneConfig;
pub use error::{LearnZoneError, Result};
pub use live::LiveSession;
pub use movement::{Direction, PlayerState};
pub use progression::ProgressionState;
pub use session::{SessionSnapshot, SimulatorSession};
pub use types::*;
pub use zone::{Challenge, Item, Lock, Zone, ZoneRegistry};
