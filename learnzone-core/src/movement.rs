//! Player movement: discrete steps on the ground plane.
//!
//! Heading 0° faces negative Z. Forward moves "into" the heading:
//! `x -= sin(h) * step`, `z -= cos(h) * step`. Turning adds or removes a
//! fixed angular step and wraps into `[0, 360)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::MovementConfig;

/// A discrete movement command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Step along the heading.
    Forward,
    /// Step against the heading.
    Backward,
    /// Turn counter-clockwise.
    Left,
    /// Turn clockwise.
    Right,
}

impl Direction {
    /// All directions.
    #[must_use]
    pub fn all() -> &'static [Direction] {
        &[Self::Forward, Self::Backward, Self::Left, Self::Right]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Left => "left",
            Self::Right => "right",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Self::Forward),
            "backward" => Ok(Self::Backward),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(format!("unknown direction: '{s}'")),
        }
    }
}

/// Position and heading of the single local player.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerState {
    /// X coordinate.
    pub x: f64,
    /// Z coordinate.
    pub z: f64,
    /// Heading in degrees, always within `[0, 360)`.
    pub heading_degrees: f64,
}

impl PlayerState {
    /// Player at the origin facing negative Z.
    #[must_use]
    pub fn origin() -> Self {
        Self::default()
    }

    /// Apply one movement command, returning the new state.
    #[must_use]
    pub fn step(self, direction: Direction, config: &MovementConfig) -> Self {
        let mut next = self;
        match direction {
            Direction::Forward | Direction::Backward => {
                let (dx, dz) = Self::delta(self.heading_degrees, config.step_distance);
                let sign = if direction == Direction::Forward { 1.0 } else { -1.0 };
                next.x += sign * dx;
                next.z += sign * dz;
            }
            Direction::Left => {
                next.heading_degrees =
                    wrap_degrees(self.heading_degrees - config.rotation_step_degrees);
            }
            Direction::Right => {
                next.heading_degrees =
                    wrap_degrees(self.heading_degrees + config.rotation_step_degrees);
            }
        }
        next
    }

    /// Ground-plane displacement of one forward step at `heading_degrees`.
    #[must_use]
    pub fn delta(heading_degrees: f64, distance: f64) -> (f64, f64) {
        let rad = heading_degrees.to_radians();
        (-rad.sin() * distance, -rad.cos() * distance)
    }
}

/// Wrap an angle into `[0, 360)`.
#[must_use]
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
