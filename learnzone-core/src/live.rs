//! Live session: a [`SimulatorSession`] plus its deferred auto-close timer.
//!
//! After a successful run the challenge stays visible for
//! `challenge.auto_close_ms` and then dismisses itself. The timer is a
//! tokio task whose handle lives on the [`LiveSession`]:
//!
//! - closing the challenge by hand aborts it,
//! - solving another challenge replaces it,
//! - tearing the session down (or dropping it) aborts it.
//!
//! The task only holds a `Weak` reference, so even an un-aborted timer
//! cannot reach a session that has been dropped. Each schedule or cancel
//! bumps a generation counter, and a timer only acts if its generation is
//! still current when it gets the lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::challenge::Solved;
use crate::config::LearnZoneConfig;
use crate::error::Result;
use crate::movement::Direction;
use crate::session::{SessionSnapshot, SimulatorSession};
use crate::types::{SessionId, ZoneId};
use crate::zone::Item;

/// Shared handle to the simulator state behind a [`LiveSession`].
pub type SharedSession = Arc<Mutex<SimulatorSession>>;

/// A simulator session tied to a host's lifetime.
pub struct LiveSession {
    inner: SharedSession,
    auto_close: Mutex<Option<JoinHandle<()>>>,
    auto_close_delay: Duration,
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for LiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSession")
            .field("session", &self.inner.lock().id())
            .field("auto_close_delay", &self.auto_close_delay)
            .field("auto_close_pending", &self.has_pending_auto_close())
            .finish()
    }
}

impl LiveSession {
    /// Wrap an existing simulator session.
    #[must_use]
    pub fn new(session: SimulatorSession) -> Self {
        let auto_close_delay = Duration::from_millis(session.config().challenge.auto_close_ms);
        Self {
            inner: Arc::new(Mutex::new(session)),
            auto_close: Mutex::new(None),
            auto_close_delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Build a live session from configuration.
    ///
    /// # Errors
    /// Returns `LearnZoneError::Config` if the configured zones are invalid.
    pub fn from_config(config: LearnZoneConfig) -> Result<Self> {
        Ok(Self::new(SimulatorSession::from_config(config)?))
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.inner.lock().id()
    }

    /// Apply a movement command; returns the new interaction target.
    pub fn move_player(&self, direction: Direction) -> Option<ZoneId> {
        self.inner.lock().move_player(direction).cloned()
    }

    /// Open the challenge of the zone in reach.
    ///
    /// # Errors
    /// As [`SimulatorSession::interact`].
    pub fn interact(&self) -> Result<()> {
        self.inner.lock().interact()
    }

    /// Open the challenge of a specific zone.
    ///
    /// # Errors
    /// As [`SimulatorSession::open_challenge`].
    pub fn open_challenge(&self, zone_id: &ZoneId) -> Result<()> {
        self.inner.lock().open_challenge(zone_id)
    }

    /// Drop an item into the workspace slot.
    ///
    /// # Errors
    /// As [`SimulatorSession::place_item`].
    pub fn place_item(&self, item: Item) -> Result<()> {
        self.inner.lock().place_item(item)
    }

    /// Run the placed item; on success, schedule the auto-close.
    ///
    /// Must be called from within a tokio runtime for the timer to be
    /// scheduled. Without one, the challenge stays in its closing phase
    /// until [`LiveSession::close_challenge`] is called.
    ///
    /// # Errors
    /// As [`SimulatorSession::run`].
    pub fn run(&self) -> Result<Solved> {
        let solved = self.inner.lock().run()?;
        self.schedule_auto_close();
        Ok(solved)
    }

    /// Cancel the open challenge and any pending auto-close.
    pub fn close_challenge(&self) -> Option<ZoneId> {
        self.cancel_auto_close();
        self.inner.lock().close_challenge()
    }

    /// Serializable view for rendering.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().snapshot()
    }

    /// Run a closure against the simulator state.
    pub fn with_session<R>(&self, f: impl FnOnce(&SimulatorSession) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Shared handle to the simulator state, for hosts rendering from
    /// another task. Holding it does not keep the auto-close timer alive.
    #[must_use]
    pub fn shared(&self) -> SharedSession {
        Arc::clone(&self.inner)
    }

    /// Whether an auto-close timer is scheduled and has not fired yet.
    #[must_use]
    pub fn has_pending_auto_close(&self) -> bool {
        self.auto_close
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Tear the session down, cancelling any pending timer.
    pub fn teardown(self) {
        drop(self);
    }

    fn schedule_auto_close(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(
                session = %self.id(),
                "No tokio runtime; solved challenge will not auto-close"
            );
            return;
        };

        let weak: Weak<Mutex<SimulatorSession>> = Arc::downgrade(&self.inner);
        let delay = self.auto_close_delay;
        let generation = Arc::clone(&self.generation);
        let mine = generation.fetch_add(1, Ordering::AcqRel) + 1;
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                let mut session = inner.lock();
                if generation.load(Ordering::Acquire) != mine {
                    return;
                }
                if let Some(zone) = session.finish_auto_close() {
                    debug!(session = %session.id(), zone = %zone, "Auto-closed solved challenge");
                }
            }
        });

        if let Some(previous) = self.auto_close.lock().replace(task) {
            previous.abort();
        }
    }

    fn cancel_auto_close(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(handle) = self.auto_close.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(handle) = self.auto_close.get_mut().take() {
            if !handle.is_finished() {
                debug!(session = %self.inner.lock().id(), "Cancelling pending auto-close on teardown");
            }
            handle.abort();
        }
    }
}
