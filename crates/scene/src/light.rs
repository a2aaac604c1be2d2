use glam::Vec3;

/// Uniform fill light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    /// Linear RGB colour.
    pub color: Vec3,
    /// Intensity multiplier.
    pub intensity: f32,
}

/// Light radiating from a point with linear falloff to `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// World-space position.
    pub position: Vec3,
    /// Linear RGB colour.
    pub color: Vec3,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Distance at which the contribution reaches zero; 0 means unbounded.
    pub range: f32,
}

/// Light shining from `position` toward the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Position the light appears to come from.
    pub position: Vec3,
    /// Linear RGB colour.
    pub color: Vec3,
    /// Intensity multiplier.
    pub intensity: f32,
}

impl DirectionalLight {
    /// Unit vector pointing from the surface toward the light.
    pub fn to_light(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

/// The three lights every scene carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    /// Ambient term.
    pub ambient: AmbientLight,
    /// Key point light.
    pub point: PointLight,
    /// Fill directional light.
    pub directional: DirectionalLight,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: Vec3::ONE,
                intensity: 0.4,
            },
            point: PointLight {
                position: Vec3::new(5.0, 5.0, 5.0),
                color: Vec3::ONE,
                intensity: 1.5,
                range: 100.0,
            },
            directional: DirectionalLight {
                position: Vec3::new(-5.0, 5.0, 5.0),
                color: Vec3::ONE,
                intensity: 1.0,
            },
        }
    }
}
