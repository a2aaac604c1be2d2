#![allow(dead_code)]

use folio3d::config::{SceneConfig, Variant};
use folio3d::frame;
use folio3d::notify::LogNotifier;
use folio3d::SceneController;
use folio3d_input::PointerEvent;
use folio3d_scene::assets::{AssetError, AssetSource};
use folio3d_scene::MeshData;
use glam::Vec3;
use image::RgbaImage;
use std::path::{Path, PathBuf};

pub const DT: f32 = 1.0 / 60.0;

/// In-memory assets: every image decodes to a 2x2 texture, every model to a
/// small box, except paths listed in `failing`.
#[derive(Default)]
pub struct FakeAssets {
    pub failing: Vec<PathBuf>,
    pub model_requests: Vec<PathBuf>,
}

impl AssetSource for FakeAssets {
    fn load_image(&mut self, path: &Path) -> Result<RgbaImage, AssetError> {
        if self.failing.iter().any(|p| p == path) {
            return Err(AssetError::UnsupportedFormat(path.to_path_buf()));
        }
        Ok(RgbaImage::new(2, 2))
    }

    fn load_model(&mut self, path: &Path) -> Result<MeshData, AssetError> {
        self.model_requests.push(path.to_path_buf());
        if self.failing.iter().any(|p| p == path) {
            return Err(AssetError::EmptyModel(path.to_path_buf()));
        }
        Ok(MeshData::cuboid(Vec3::new(1.2, 0.8, 0.6)))
    }
}

pub fn controller(variant: Variant) -> SceneController {
    controller_with(variant, &mut FakeAssets::default())
}

pub fn controller_with(variant: Variant, assets: &mut FakeAssets) -> SceneController {
    SceneController::new(
        variant,
        &SceneConfig::default(),
        assets,
        Box::new(LogNotifier),
    )
}

/// Pixel coordinates of a world-space point for the controller's camera.
pub fn pixel_of(controller: &SceneController, world: Vec3) -> (f64, f64) {
    let clip = controller.camera().view_projection_matrix() * world.extend(1.0);
    let ndc = clip.truncate() / clip.w;
    let (width, height) = controller.viewport();
    (
        f64::from((ndc.x + 1.0) * 0.5 * width as f32),
        f64::from((1.0 - ndc.y) * 0.5 * height as f32),
    )
}

/// World-space centre of a named object.
pub fn center_of(controller: &SceneController, name: &str) -> Vec3 {
    let id = controller.scene().find(name).expect("object exists");
    controller
        .scene()
        .world_matrix(id)
        .expect("object has a world matrix")
        .transform_point3(Vec3::ZERO)
}

pub fn click_at(controller: &mut SceneController, world: Vec3) {
    let (x, y) = pixel_of(controller, world);
    controller.pointer(PointerEvent::Click { x, y });
}

pub fn move_to(controller: &mut SceneController, world: Vec3) {
    let (x, y) = pixel_of(controller, world);
    controller.pointer(PointerEvent::Move { x, y });
}

/// Run frames of simulated time, returning how many were run.
pub fn run_for(controller: &mut SceneController, clock: &mut f64, seconds: f32) -> usize {
    let frames = (seconds / DT).ceil() as usize;
    for _ in 0..frames {
        *clock += f64::from(DT);
        frame::advance(controller, *clock, DT);
    }
    frames
}
