//! Ray construction and intersection tests.

mod raycaster;

pub use raycaster::{pointer_to_ndc, ray_obb, ray_sphere, BoundingBox, Ray};
