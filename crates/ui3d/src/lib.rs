//! Pointer interaction with objects in the 3D scene.
//!
//! Pointer pixels are mapped to normalized device coordinates, turned into a
//! world-space ray through the camera, and intersected with a caller-supplied
//! set of candidate objects. The [`InteractionRouter`] layers hover handling on
//! top: cursor style plus normal/hover texture swaps.

pub mod interaction;
pub mod router;

pub use interaction::{pointer_to_ndc, BoundingBox, Ray};
pub use router::{CursorStyle, HoverOutcome, InteractionRouter, PickHit};
