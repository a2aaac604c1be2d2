//! Particle fountain: points rising from the edges of a rectangle.
//!
//! Particles live in the parent object's local space. Each update moves them
//! by `velocity * dt`; any particle that climbs above `height / 2 + reset_offset`
//! is respawned on a random point of one of the rectangle's four edges with a
//! fresh upward velocity.

use folio3d_core::{scoped_rng, ObjectId};
use glam::Vec3;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// Horizontal jitter applied to respawned particles.
const JITTER: f32 = 0.05;
/// Upward speed range for respawned particles.
const RISE_SPEED: (f32, f32) = (0.3, 0.5);

/// Creation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FountainConfig {
    /// Number of particles.
    pub particle_count: usize,
    /// Rectangle width along local X.
    pub width: f32,
    /// Rectangle height along local Y.
    pub height: f32,
    /// How far above the top edge particles may rise before respawning.
    /// Negative values are treated as zero.
    pub reset_offset: f32,
}

impl Default for FountainConfig {
    fn default() -> Self {
        Self {
            particle_count: 200,
            width: 1.0,
            height: 1.0,
            reset_offset: 0.5,
        }
    }
}

/// Geometric bounds used by [`advance_particles`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FountainBounds {
    /// Half of the rectangle width.
    pub half_width: f32,
    /// Half of the rectangle height.
    pub half_height: f32,
    /// Extra rise allowed above the top edge.
    pub reset_offset: f32,
}

impl FountainBounds {
    /// Height above which particles respawn.
    pub fn ceiling(&self) -> f32 {
        self.half_height + self.reset_offset
    }
}

impl From<&FountainConfig> for FountainBounds {
    fn from(config: &FountainConfig) -> Self {
        Self {
            half_width: config.width.abs() * 0.5,
            half_height: config.height.abs() * 0.5,
            // Respawns land on the top edge, so the ceiling may not sit below it.
            reset_offset: config.reset_offset.max(0.0),
        }
    }
}

/// One simulated point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Local-space position.
    pub position: Vec3,
    /// Local-space velocity in units per second.
    pub velocity: Vec3,
}

impl Particle {
    fn spawn<R: Rng>(bounds: &FountainBounds, rng: &mut R) -> Self {
        Self {
            position: random_edge_point(bounds, rng),
            velocity: Vec3::new(
                rng.gen_range(-JITTER..=JITTER),
                rng.gen_range(RISE_SPEED.0..=RISE_SPEED.1),
                0.0,
            ),
        }
    }
}

/// Uniform point on the perimeter of the rectangle, in the local XY plane.
fn random_edge_point<R: Rng>(bounds: &FountainBounds, rng: &mut R) -> Vec3 {
    let (hw, hh) = (bounds.half_width, bounds.half_height);
    let perimeter = 4.0 * (hw + hh);
    if perimeter <= 0.0 {
        return Vec3::ZERO;
    }
    // Walk the perimeter: bottom, right, top, left.
    let mut s = rng.gen_range(0.0..perimeter);
    let horizontal = 2.0 * hw;
    let vertical = 2.0 * hh;
    if s < horizontal {
        return Vec3::new(-hw + s, -hh, 0.0);
    }
    s -= horizontal;
    if s < vertical {
        return Vec3::new(hw, -hh + s, 0.0);
    }
    s -= vertical;
    if s < horizontal {
        return Vec3::new(hw - s, hh, 0.0);
    }
    s -= horizontal;
    Vec3::new(-hw, (hh - s).max(-hh), 0.0)
}

/// Advance `particles` by `dt` seconds, respawning any that exceed the ceiling.
pub fn advance_particles<R: Rng>(
    particles: &mut [Particle],
    bounds: &FountainBounds,
    dt: f32,
    rng: &mut R,
) {
    let ceiling = bounds.ceiling();
    for particle in particles.iter_mut() {
        particle.position += particle.velocity * dt;
        if particle.position.y > ceiling {
            *particle = Particle::spawn(bounds, rng);
        }
    }
}

/// Particle set attached to a parent object.
#[derive(Debug, Clone)]
pub struct Fountain {
    /// Object whose local space the particles live in.
    pub parent: ObjectId,
    /// Whether the frame loop should call [`Fountain::update`].
    pub active: bool,
    /// Whether the particles are drawn.
    pub visible: bool,
    bounds: FountainBounds,
    particles: Vec<Particle>,
    rng: StdRng,
}

impl Fountain {
    /// Create a fountain; particles start on random edge points.
    /// It starts inactive and hidden.
    pub fn new(parent: ObjectId, config: FountainConfig, seed: u64) -> Self {
        let bounds = FountainBounds::from(&config);
        let mut rng = scoped_rng(seed, u64::from(parent.0));
        let particles = (0..config.particle_count)
            .map(|_| Particle::spawn(&bounds, &mut rng))
            .collect();
        Self {
            parent,
            active: false,
            visible: false,
            bounds,
            particles,
            rng,
        }
    }

    /// Advance all particles by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        advance_particles(&mut self.particles, &self.bounds, dt, &mut self.rng);
    }

    /// Whether motion should be visible this frame.
    pub fn is_animating(&self) -> bool {
        self.active && self.visible
    }

    /// Current particles.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Bounds the particles are confined to.
    pub fn bounds(&self) -> &FountainBounds {
        &self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn config() -> FountainConfig {
        FountainConfig {
            particle_count: 64,
            width: 2.0,
            height: 1.0,
            reset_offset: 0.3,
        }
    }

    fn on_edge(p: Vec3, bounds: &FountainBounds) -> bool {
        let eps = 1e-4;
        let on_vertical = (p.x.abs() - bounds.half_width).abs() < eps && p.y.abs() <= bounds.half_height + eps;
        let on_horizontal = (p.y.abs() - bounds.half_height).abs() < eps && p.x.abs() <= bounds.half_width + eps;
        p.z == 0.0 && (on_vertical || on_horizontal)
    }

    #[test]
    fn new_fountain_starts_on_edges_inactive_and_hidden() {
        let fountain = Fountain::new(ObjectId(3), config(), 42);
        assert_eq!(fountain.particles().len(), 64);
        assert!(!fountain.active);
        assert!(!fountain.visible);
        for p in fountain.particles() {
            assert!(on_edge(p.position, fountain.bounds()), "{p:?}");
            assert!(p.velocity.x.abs() <= JITTER);
            assert!((RISE_SPEED.0..=RISE_SPEED.1).contains(&p.velocity.y));
            assert_eq!(p.velocity.z, 0.0);
        }
    }

    #[test]
    fn update_advects_by_velocity() {
        let bounds = FountainBounds::from(&config());
        let mut particles = [Particle {
            position: Vec3::new(0.0, -0.5, 0.0),
            velocity: Vec3::new(0.01, 0.4, 0.0),
        }];
        let mut rng = StdRng::seed_from_u64(1);
        advance_particles(&mut particles, &bounds, 0.5, &mut rng);
        assert!((particles[0].position - Vec3::new(0.005, -0.3, 0.0)).length() < 1e-6);
    }

    #[test]
    fn particle_above_ceiling_respawns_on_edge() {
        let bounds = FountainBounds::from(&config());
        let mut particles = [Particle {
            position: Vec3::new(0.0, 0.79, 0.0),
            velocity: Vec3::new(0.0, 0.5, 0.0),
        }];
        let mut rng = StdRng::seed_from_u64(9);
        advance_particles(&mut particles, &bounds, 0.1, &mut rng);
        assert!(on_edge(particles[0].position, &bounds));
        assert!(particles[0].velocity.y >= RISE_SPEED.0);
    }

    #[test]
    fn same_seed_same_motion() {
        let mut a = Fountain::new(ObjectId(1), config(), 7);
        let mut b = Fountain::new(ObjectId(1), config(), 7);
        for _ in 0..100 {
            a.update(0.05);
            b.update(0.05);
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn zero_size_rectangle_respawns_at_origin() {
        let bounds = FountainBounds { half_width: 0.0, half_height: 0.0, reset_offset: 0.0 };
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(random_edge_point(&bounds, &mut rng), Vec3::ZERO);
    }

    #[test]
    fn negative_reset_offset_keeps_respawns_under_the_ceiling() {
        let config = FountainConfig {
            particle_count: 64,
            width: 1.6,
            height: 1.0,
            reset_offset: -0.3,
        };
        let mut fountain = Fountain::new(ObjectId(2), config, 11);
        assert_eq!(fountain.bounds().reset_offset, 0.0);
        assert_eq!(fountain.bounds().ceiling(), 0.5);
        for _ in 0..120 {
            fountain.update(1.0 / 60.0);
            let worst = fountain
                .particles()
                .iter()
                .map(|p| p.position.y)
                .fold(f32::MIN, f32::max);
            assert!(worst <= fountain.bounds().ceiling(), "worst y {worst}");
        }
    }

    #[test]
    fn animating_requires_active_and_visible() {
        let mut fountain = Fountain::new(ObjectId(1), config(), 1);
        fountain.active = true;
        assert!(!fountain.is_animating());
        fountain.visible = true;
        assert!(fountain.is_animating());
    }

    proptest! {
        #[test]
        fn height_never_exceeds_ceiling_after_update(
            seed in any::<u64>(),
            width in 0.0f32..4.0,
            height in 0.0f32..4.0,
            reset_offset in -1.0f32..1.0,
            steps in proptest::collection::vec(0.0f32..2.0, 1..50),
        ) {
            let config = FountainConfig { particle_count: 32, width, height, reset_offset };
            let mut fountain = Fountain::new(ObjectId(0), config, seed);
            let ceiling = fountain.bounds().ceiling();
            for dt in steps {
                fountain.update(dt);
                for p in fountain.particles() {
                    prop_assert!(p.position.y <= ceiling + 1e-5);
                }
            }
        }
    }
}
