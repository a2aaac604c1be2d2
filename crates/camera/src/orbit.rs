//! Orbit controls: drag to rotate around a focus point, wheel to zoom,
//! optional inertial damping.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Camera;

const MIN_POLAR: f32 = 1e-4;

/// Tunables for [`OrbitControls`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    /// Apply inertia: rotation deltas decay over several frames.
    pub enable_damping: bool,
    /// Fraction of the pending rotation applied (and removed) per update.
    pub damping_factor: f32,
    /// Radians of rotation per pixel of drag, scaled by viewport height.
    pub rotate_speed: f32,
    /// Zoom multiplier per wheel notch.
    pub zoom_speed: f32,
    /// Closest allowed distance to the target.
    pub min_distance: f32,
    /// Farthest allowed distance to the target.
    pub max_distance: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.5,
            max_distance: 100.0,
        }
    }
}

/// Camera rig orbiting `camera.target`.
///
/// Input accumulates into pending spherical deltas; [`OrbitControls::update`]
/// applies them to the camera once per frame. The offset is re-read from the
/// camera on every update, so external moves (tweens) are respected.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Settings in effect.
    pub settings: OrbitSettings,
    /// When false, input is ignored but pending inertia still drains.
    pub enabled: bool,
    delta_theta: f32,
    delta_phi: f32,
    zoom_scale: f32,
}

impl OrbitControls {
    /// Create controls with the given settings.
    pub fn new(settings: OrbitSettings) -> Self {
        Self {
            settings,
            enabled: true,
            delta_theta: 0.0,
            delta_phi: 0.0,
            zoom_scale: 1.0,
        }
    }

    /// Feed a pointer drag of `(dx, dy)` pixels on a viewport `height` pixels tall.
    pub fn drag(&mut self, dx: f32, dy: f32, height: u32) {
        if !self.enabled || height == 0 {
            return;
        }
        let per_pixel = std::f32::consts::TAU / height as f32 * self.settings.rotate_speed;
        self.delta_theta -= dx * per_pixel;
        self.delta_phi -= dy * per_pixel;
    }

    /// Feed wheel notches; positive values zoom in.
    pub fn zoom(&mut self, notches: f32) {
        if !self.enabled || notches == 0.0 {
            return;
        }
        let step = 0.95f32.powf(self.settings.zoom_speed * notches.abs());
        if notches > 0.0 {
            self.zoom_scale *= step;
        } else {
            self.zoom_scale /= step;
        }
    }

    /// Whether rotation inertia is still pending.
    pub fn is_settling(&self) -> bool {
        self.delta_theta.abs() > 1e-6 || self.delta_phi.abs() > 1e-6
    }

    /// Apply pending rotation/zoom to `camera`.
    pub fn update(&mut self, camera: &mut Camera) {
        let offset = camera.position - camera.target;
        let mut radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let factor = if self.settings.enable_damping {
            self.settings.damping_factor
        } else {
            1.0
        };
        theta += self.delta_theta * factor;
        phi += self.delta_phi * factor;
        phi = phi.clamp(MIN_POLAR, std::f32::consts::PI - MIN_POLAR);

        radius = (radius * self.zoom_scale)
            .clamp(self.settings.min_distance, self.settings.max_distance);

        let sin_phi = phi.sin();
        let new_offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        camera.position = camera.target + new_offset;

        if self.settings.enable_damping {
            self.delta_theta *= 1.0 - self.settings.damping_factor;
            self.delta_phi *= 1.0 - self.settings.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.zoom_scale = 1.0;
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(OrbitSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_without_input_keeps_position() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::default();
        controls.update(&mut camera);
        assert!((camera.position - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn drag_preserves_distance_to_target() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::default();
        controls.drag(120.0, -40.0, 720);
        for _ in 0..30 {
            controls.update(&mut camera);
        }
        assert!((camera.position.length() - 5.0).abs() < 1e-3);
        assert!(camera.position.x.abs() > 0.01);
    }

    #[test]
    fn damping_decays_inertia() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::default();
        controls.drag(100.0, 0.0, 720);
        assert!(controls.is_settling());
        for _ in 0..600 {
            controls.update(&mut camera);
        }
        assert!(!controls.is_settling());
    }

    #[test]
    fn zoom_clamps_to_min_distance() {
        let mut camera = Camera::default();
        let mut controls = OrbitControls::default();
        controls.zoom(500.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - controls.settings.min_distance).abs() < 1e-4);
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let mut controls = OrbitControls::default();
        controls.enabled = false;
        controls.drag(50.0, 50.0, 720);
        assert!(!controls.is_settling());
    }
}
