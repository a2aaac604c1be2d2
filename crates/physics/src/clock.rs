//! Fixed-step driver: turns measured wall time into whole physics steps.

use serde::{Deserialize, Serialize};

use crate::PhysicsWorld;

/// Step rate and catch-up limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Fixed steps per second.
    pub step_frequency: f32,
    /// Most fixed steps taken in a single frame.
    pub max_sub_steps: u32,
    /// Gravity along Y.
    pub gravity: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            step_frequency: 60.0,
            max_sub_steps: 3,
            gravity: -9.82,
        }
    }
}

/// Tracks `last_call_time` and the time not yet consumed by whole steps.
#[derive(Debug, Clone)]
pub struct PhysicsClock {
    fixed_step: f32,
    max_sub_steps: u32,
    last_call_time: Option<f64>,
    accumulator: f32,
}

impl PhysicsClock {
    /// Create a clock from settings.
    pub fn new(settings: &PhysicsSettings) -> Self {
        Self {
            fixed_step: 1.0 / settings.step_frequency.max(1.0),
            max_sub_steps: settings.max_sub_steps.max(1),
            last_call_time: None,
            accumulator: 0.0,
        }
    }

    /// Size of one fixed step in seconds.
    pub fn fixed_step(&self) -> f32 {
        self.fixed_step
    }

    /// Step `world` for the wall time elapsed since the previous call.
    ///
    /// `now` is in seconds on any monotonic timeline. The first call only
    /// records the time. Returns the number of fixed steps taken.
    pub fn step(&mut self, world: &mut PhysicsWorld, now: f64) -> u32 {
        let elapsed = match self.last_call_time {
            Some(last) => (now - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last_call_time = Some(now);
        self.advance(world, elapsed)
    }

    /// Step `world` for `elapsed` seconds of simulated time.
    ///
    /// Whole fixed steps are taken, at most `max_sub_steps`; when that cap is
    /// hit the backlog is dropped down to less than one step so a slow frame
    /// cannot snowball into ever-longer catch-up.
    pub fn advance(&mut self, world: &mut PhysicsWorld, elapsed: f32) -> u32 {
        self.accumulator += elapsed;
        let mut taken = 0;
        while self.accumulator >= self.fixed_step && taken < self.max_sub_steps {
            world.step(self.fixed_step);
            self.accumulator -= self.fixed_step;
            taken += 1;
        }
        if taken == self.max_sub_steps && self.accumulator >= self.fixed_step {
            tracing::debug!(backlog = self.accumulator, "physics backlog dropped");
            self.accumulator %= self.fixed_step;
        }
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn clock() -> PhysicsClock {
        PhysicsClock::new(&PhysicsSettings::default())
    }

    #[test]
    fn first_call_only_records_time() {
        let mut world = PhysicsWorld::default();
        let mut clock = clock();
        assert_eq!(clock.step(&mut world, 10.0), 0);
        assert_eq!(world.steps_taken(), 0);
    }

    #[test]
    fn elapsed_time_becomes_whole_steps() {
        let mut world = PhysicsWorld::default();
        let mut clock = clock();
        clock.step(&mut world, 0.0);
        assert_eq!(clock.step(&mut world, 2.5 / 60.0), 2);
        // The leftover half step carries into the next frame.
        assert_eq!(clock.step(&mut world, 3.2 / 60.0), 1);
        assert_eq!(world.steps_taken(), 3);
    }

    #[test]
    fn long_frames_are_clamped_to_max_sub_steps() {
        let mut world = PhysicsWorld::default();
        let mut clock = clock();
        clock.step(&mut world, 0.0);
        assert_eq!(clock.step(&mut world, 5.0), 3);
        assert!(clock.accumulator < clock.fixed_step());
    }

    proptest! {
        #[test]
        fn never_exceeds_sub_step_cap(frames in proptest::collection::vec(0.0f32..1.0, 1..64)) {
            let mut world = PhysicsWorld::default();
            let mut clock = clock();
            for dt in frames {
                prop_assert!(clock.advance(&mut world, dt) <= 3);
            }
        }
    }
}
