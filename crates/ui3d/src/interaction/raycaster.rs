//! Raycasting primitives.

use glam::{Mat4, Vec2, Vec3};

/// Determinants below this are treated as collapsed (zero-scale) transforms.
const MIN_DETERMINANT: f32 = 1e-12;

/// Convert a pointer position in pixels to normalized device coordinates.
///
/// `x` grows to the right and `y` grows upward, both in `[-1, 1]` across the
/// viewport. A zero-sized viewport maps everything to the centre.
pub fn pointer_to_ndc(pixel: Vec2, viewport: (u32, u32)) -> Vec2 {
    let (width, height) = viewport;
    if width == 0 || height == 0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        pixel.x / width as f32 * 2.0 - 1.0,
        -(pixel.y / height as f32) * 2.0 + 1.0,
    )
}

/// Half-line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Ray from `origin` along `direction` (normalised here).
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from the camera eye through an NDC point.
    pub fn from_camera(ndc: Vec2, view: &Mat4, projection: &Mat4) -> Self {
        let inv_view = view.inverse();
        let origin = inv_view.transform_point3(Vec3::ZERO);
        let inv_view_proj = (*projection * *view).inverse();
        let far = inv_view_proj.project_point3(ndc.extend(1.0));
        Self::new(origin, far - origin)
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner of the box
    pub min: Vec3,
    /// Maximum corner of the box
    pub max: Vec3,
}

impl BoundingBox {
    /// Create a new box from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box from center position and size
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half_size = size * 0.5;
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Slab test. Returns the ray parameter of the first intersection, or of
    /// the exit point when the origin is inside the box.
    ///
    /// `dir` need not be unit length; the result is in multiples of `dir`.
    pub fn ray_intersection(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let inv_dir = dir.recip();
        let t1 = (self.min - origin) * inv_dir;
        let t2 = (self.max - origin) * inv_dir;

        let tmin = t1.min(t2).max_element();
        let tmax = t1.max(t2).min_element();

        // Entire box behind the origin.
        if tmax < 0.0 || tmin > tmax {
            return None;
        }
        Some(if tmin < 0.0 { tmax } else { tmin })
    }
}

/// Intersect a ray with a sphere. Returns the nearest non-negative distance.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    if radius <= 0.0 {
        return None;
    }
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    let far = -b + sqrt_d;
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        Some(far)
    } else {
        None
    }
}

/// Intersect a ray with a box given in the local space of `model`.
///
/// The distance is measured in world units along the ray. Collapsed
/// transforms (zero scale on any axis) never report a hit.
pub fn ray_obb(ray: &Ray, model: &Mat4, local: &BoundingBox) -> Option<f32> {
    if model.determinant().abs() < MIN_DETERMINANT {
        return None;
    }
    let inv = model.inverse();
    let origin = inv.transform_point3(ray.origin);
    let dir = inv.transform_vector3(ray.direction);
    local.ray_intersection(origin, dir)
}
