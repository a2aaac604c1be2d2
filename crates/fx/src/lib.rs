#![warn(missing_docs)]
//! Decorative particle effects.

mod fountain;

pub use fountain::{advance_particles, Fountain, FountainBounds, FountainConfig, Particle};
