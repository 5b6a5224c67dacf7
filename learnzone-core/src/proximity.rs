//! Proximity resolver: which zone, if any, the player can interact with.
//!
//! Distance is Euclidean in the ground (x/z) plane. The nearest zone wins
//! if it lies strictly inside the interaction radius. Ties go to the zone
//! that comes first in registry order.

use ordered_float::OrderedFloat;

use crate::movement::PlayerState;
use crate::zone::{Zone, ZoneRegistry};

/// The zone currently in reach, with its distance.
#[derive(Debug, Clone, Copy)]
pub struct ProximityHit<'a> {
    /// The nearest zone.
    pub zone: &'a Zone,
    /// Ground-plane distance from the player.
    pub distance: f64,
}

/// Find the nearest zone strictly within `radius` of the player.
///
/// Locked zones are reported too; gating happens when a challenge is opened.
#[must_use]
pub fn nearest_zone<'a>(
    player: &PlayerState,
    registry: &'a ZoneRegistry,
    radius: f64,
) -> Option<ProximityHit<'a>> {
    registry
        .iter()
        .map(|zone| ProximityHit {
            zone,
            distance: zone.position().ground_distance(player.x, player.z),
        })
        // `min_by_key` keeps the first of equal minima, giving registry-order tie-breaks.
        .min_by_key(|hit| OrderedFloat(hit.distance))
        .filter(|hit| hit.distance < radius)
}
