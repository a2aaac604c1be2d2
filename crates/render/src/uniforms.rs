//! Uniform blocks shared with the WGSL shaders.

use folio3d_camera::Camera;
use folio3d_scene::{LightRig, Material};
use glam::{Mat4, Vec3};

/// Per-frame camera and lighting data (`group(0)`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Eye position (w unused).
    pub camera_pos: [f32; 4],
    /// Ambient colour premultiplied by intensity.
    pub ambient: [f32; 4],
    /// Point light position, w = range.
    pub point_pos: [f32; 4],
    /// Point light colour premultiplied by intensity.
    pub point_color: [f32; 4],
    /// Unit vector toward the directional light.
    pub dir_to_light: [f32; 4],
    /// Directional light colour premultiplied by intensity.
    pub dir_color: [f32; 4],
}

impl GlobalsUniform {
    /// Pack the camera and light rig.
    pub fn new(camera: &Camera, lights: &LightRig) -> Self {
        let premul = |c: Vec3, i: f32| (c * i).extend(1.0).to_array();
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            ambient: premul(lights.ambient.color, lights.ambient.intensity),
            point_pos: lights.point.position.extend(lights.point.range).to_array(),
            point_color: premul(lights.point.color, lights.point.intensity),
            dir_to_light: lights.directional.to_light().extend(0.0).to_array(),
            dir_color: premul(lights.directional.color, lights.directional.intensity),
        }
    }
}

/// Per-object transform and material (`group(1)`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    /// Local-to-world matrix.
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model` for normals.
    pub normal: [[f32; 4]; 4],
    /// Base colour, a = opacity.
    pub color: [f32; 4],
    /// x = metalness, y = roughness, z = unlit flag.
    pub params: [f32; 4],
}

impl ObjectUniform {
    /// Pack a world matrix and material.
    pub fn new(model: Mat4, material: &Material) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
            color: material.color.extend(material.opacity).to_array(),
            params: [
                material.metalness,
                material.roughness,
                if material.unlit { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}
