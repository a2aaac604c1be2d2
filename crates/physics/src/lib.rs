#![warn(missing_docs)]
//! Physics world stub and the fixed-step clock that drives it.
//!
//! The world integrates gravity for dynamic boxes and resolves contact with a
//! single ground plane. It exists so the frame loop has a physics stage to
//! step; nothing in the scenes depends on rich collision response.

mod clock;

use glam::Vec3;

pub use clock::{PhysicsClock, PhysicsSettings};

/// Axis-aligned bounding box used for collisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB ensuring min <= max per axis.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(min.cmple(max).all());
        Self { min, max }
    }

    /// Box centred on `center` with the given half extents.
    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        Self::new(center - half, center + half)
    }

    /// Tests intersection with another AABB.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

/// Handle returned by [`PhysicsWorld::add_body`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(usize);

/// Box-shaped rigid body. A mass of zero makes the body static.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    /// Centre of mass in world space.
    pub position: Vec3,
    /// Linear velocity in units per second.
    pub velocity: Vec3,
    /// Half extents of the collision box.
    pub half_extents: Vec3,
    /// Mass in kilograms; zero means static.
    pub mass: f32,
}

impl RigidBody {
    /// Static box that never moves.
    pub fn fixed(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            half_extents,
            mass: 0.0,
        }
    }

    /// Dynamic box affected by gravity.
    pub fn dynamic(position: Vec3, half_extents: Vec3, mass: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            half_extents,
            mass,
        }
    }

    /// Whether the body is integrated.
    pub fn is_dynamic(&self) -> bool {
        self.mass > 0.0
    }

    /// Current collision box.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position, self.half_extents)
    }
}

/// Collection of bodies stepped with semi-implicit Euler.
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    /// Gravity acceleration.
    pub gravity: Vec3,
    /// Height of the infinite ground plane.
    pub ground_height: f32,
    bodies: Vec<RigidBody>,
    steps: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -9.82, 0.0))
    }
}

impl PhysicsWorld {
    /// Create an empty world.
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            ground_height: 0.0,
            bodies: Vec::new(),
            steps: 0,
        }
    }

    /// Add a body and return its handle.
    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        self.bodies.push(body);
        BodyHandle(self.bodies.len() - 1)
    }

    /// Look up a body.
    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.0)
    }

    /// Number of bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Total fixed steps taken since creation.
    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    /// Advance the simulation by exactly `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        for body in self.bodies.iter_mut().filter(|b| b.is_dynamic()) {
            body.velocity += self.gravity * dt;
            body.position += body.velocity * dt;

            let floor = self.ground_height + body.half_extents.y;
            if body.position.y < floor {
                body.position.y = floor;
                body.velocity.y = body.velocity.y.max(0.0);
            }
        }
        self.steps += 1;
    }
}
