#![warn(missing_docs)]
//! Core primitives shared across the workspace.

mod clock;
mod transform;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

pub use clock::FrameClock;
pub use transform::Transform;

/// Handle to an object owned by the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Handle to a texture registered with the scene.
///
/// Hover swaps compare textures by handle identity, never by pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// Monotonic frame counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// First frame of any run.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` frames.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Helper to derive a reproducible RNG for one effect instance.
pub fn scoped_rng(scene_seed: u64, stream: u64) -> StdRng {
    let seed = scene_seed ^ stream.rotate_left(32);
    StdRng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn frame_index_advances() {
        assert_eq!(FrameIndex::ZERO.advance(3), FrameIndex(3));
    }

    #[test]
    fn scoped_rng_is_reproducible() {
        let a: u64 = scoped_rng(7, 1).gen();
        let b: u64 = scoped_rng(7, 1).gen();
        let c: u64 = scoped_rng(7, 2).gen();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
