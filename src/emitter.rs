//! The respawn emitter.
//!
//! There is exactly one emitter. Particles never spawn on demand: a slot
//! respawns when its life runs past 1, and at that moment it is placed on a
//! sphere of `radius` around the emitter and given a launch velocity.
//!
//! # Launch velocity
//!
//! | Term | Source |
//! |------|--------|
//! | `velocity * velocity_strength` | emitter motion (a moving wand leaves a wake) |
//! | `dir * initial_random_velocity` | same random direction as the placement |
//! | `initial_velocity` | constant launch vector |
//!
//! # Example
//!
//! ```ignore
//! let mut emitter = EmitterState::default();
//! let mut tracker = EmitterTracker::new(emitter.position);
//!
//! // Once per frame, before stepping:
//! tracker.update(&mut emitter, pointer_world_position, time.delta());
//! system.step(time.delta(), time.elapsed(), &emitter, &params);
//! ```

use glam::Vec3;
use log::warn;
use serde::{Deserialize, Serialize};

/// Emitter state, owned by the caller and refreshed once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterState {
    /// World-space center.
    pub position: Vec3,
    /// World-space velocity, usually derived by [`EmitterTracker`].
    pub velocity: Vec3,
    /// Radius of the spawn sphere.
    pub radius: f32,
    /// How much of the emitter velocity a respawned particle inherits.
    pub velocity_strength: f32,
    /// Constant launch vector added to every respawn.
    pub initial_velocity: Vec3,
    /// Magnitude of the random launch component.
    pub initial_random_velocity: f32,
}

impl Default for EmitterState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            radius: 0.01,
            velocity_strength: 0.4,
            initial_velocity: Vec3::ZERO,
            initial_random_velocity: 0.0,
        }
    }
}

impl EmitterState {
    /// Spawn position for a unit direction.
    #[inline]
    pub fn spawn_position(&self, dir: Vec3) -> Vec3 {
        self.position + dir * self.radius
    }

    /// Launch velocity for a unit direction.
    #[inline]
    pub fn spawn_velocity(&self, dir: Vec3) -> Vec3 {
        self.velocity * self.velocity_strength
            + dir * self.initial_random_velocity
            + self.initial_velocity
    }
}

/// Derives emitter velocity from successive positions.
#[derive(Debug, Clone, Copy)]
pub struct EmitterTracker {
    previous: Vec3,
}

impl EmitterTracker {
    /// Start tracking from `position`.
    pub fn new(position: Vec3) -> Self {
        Self { previous: position }
    }

    /// Last recorded position.
    pub fn previous(&self) -> Vec3 {
        self.previous
    }

    /// Move the emitter to `position` and set its velocity to the
    /// displacement over `delta_time`.
    ///
    /// A non-positive or non-finite `delta_time` (a paused clock, the very
    /// first frame) yields zero velocity.
    pub fn update(&mut self, emitter: &mut EmitterState, position: Vec3, delta_time: f32) {
        emitter.velocity = if delta_time > 0.0 && delta_time.is_finite() {
            (position - self.previous) / delta_time
        } else {
            if position != self.previous {
                warn!(
                    "emitter moved with delta_time {delta_time}; velocity set to zero"
                );
            }
            Vec3::ZERO
        };
        emitter.position = position;
        self.previous = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let e = EmitterState::default();
        assert_eq!(e.radius, 0.01);
        assert_eq!(e.velocity_strength, 0.4);
        assert_eq!(e.initial_random_velocity, 0.0);
    }

    #[test]
    fn test_spawn_on_sphere() {
        let e = EmitterState {
            position: Vec3::new(1.0, 2.0, 3.0),
            radius: 0.5,
            ..Default::default()
        };
        let p = e.spawn_position(Vec3::X);
        assert_eq!(p, Vec3::new(1.5, 2.0, 3.0));
    }

    #[test]
    fn test_spawn_velocity_terms() {
        let e = EmitterState {
            velocity: Vec3::new(10.0, 0.0, 0.0),
            velocity_strength: 0.5,
            initial_velocity: Vec3::new(0.0, 1.0, 0.0),
            initial_random_velocity: 2.0,
            ..Default::default()
        };
        let v = e.spawn_velocity(Vec3::Z);
        assert_eq!(v, Vec3::new(5.0, 1.0, 2.0));
    }

    #[test]
    fn test_tracker_velocity() {
        let mut e = EmitterState::default();
        let mut tracker = EmitterTracker::new(Vec3::ZERO);
        tracker.update(&mut e, Vec3::new(0.5, 0.0, 0.0), 0.5);
        assert_eq!(e.velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(e.position, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(tracker.previous(), e.position);
    }

    #[test]
    fn test_tracker_zero_dt() {
        let mut e = EmitterState::default();
        let mut tracker = EmitterTracker::new(Vec3::ZERO);
        tracker.update(&mut e, Vec3::ONE, 0.0);
        assert_eq!(e.velocity, Vec3::ZERO);
        assert_eq!(e.position, Vec3::ONE);

        tracker.update(&mut e, Vec3::ZERO, f32::NAN);
        assert_eq!(e.velocity, Vec3::ZERO);
    }
}
