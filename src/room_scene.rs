//! Room scene: walls, sky dome, the desk models, and two picture panels that
//! appear (with their fountains) after the camera flies to the desk.

use std::path::Path;

use folio3d_anim::{Easing, Property, Sequencer, Stage, Tween};
use folio3d_core::{ObjectId, TextureId, Transform};
use folio3d_fx::{Fountain, FountainConfig};
use folio3d_scene::assets::AssetSource;
use folio3d_scene::{Material, MeshKind, Scene, SceneObject};
use glam::Vec3;
use serde::Serialize;
use tracing::{error, info};

use crate::config::SceneConfig;
use crate::menu_scene::configured_camera;
use crate::state::{SceneState, Target};

pub const DESK_NAME: &str = "desk";
pub const GAME_SYSTEM_NAME: &str = "game_system";
pub const SKY_NAME: &str = "sky";

pub const CAMERA_START: Vec3 = Vec3::new(0.0, 1.6, 6.0);
const CAMERA_START_FOCUS: Vec3 = Vec3::new(0.0, 1.0, 0.0);
const APPROACH_POSITION: Vec3 = Vec3::new(0.0, 1.8, 1.2);
const APPROACH_FOCUS: Vec3 = Vec3::new(0.0, 1.6, -3.0);
const APPROACH_SECONDS: f32 = 1.5;

const DESK_POSITION: Vec3 = Vec3::new(0.0, 0.0, -2.0);
const GAME_SYSTEM_OFFSET: Vec3 = Vec3::new(0.0, 0.8, 0.0);

const ROOM_HALF: f32 = 6.0;
const WALL_HEIGHT: f32 = 4.0;
const WALL_THICKNESS: f32 = 0.2;
const WALL_COLOR: Vec3 = Vec3::new(0.55, 0.52, 0.5);
const FLOOR_COLOR: Vec3 = Vec3::new(0.3, 0.26, 0.22);

const SKY_RADIUS: f32 = 60.0;
const SKY_FALLBACK: Vec3 = Vec3::new(0.02, 0.02, 0.08);

const PANEL_WIDTH: f32 = 1.6;
const PANEL_HEIGHT: f32 = 1.0;
const PANEL_Y: f32 = 2.2;
const BACK_WALL_Z: f32 = -4.0;
// Just in front of the back wall's inner face.
const PANEL_Z: f32 = BACK_WALL_Z + WALL_THICKNESS;
const PANEL_XS: [f32; 2] = [-1.8, 1.8];

const STAGE_APPROACH: &str = "approach";
const STAGE_REVEAL_PANELS: &str = "reveal_panels";

/// Where the room is in its single forward chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomPhase {
    #[default]
    Idle,
    Approaching,
    RevealingPanels,
    Open,
}

impl RoomPhase {
    /// Phase entered when the stage called `label` starts.
    pub fn for_stage(label: &str) -> Option<Self> {
        match label {
            STAGE_APPROACH => Some(RoomPhase::Approaching),
            STAGE_REVEAL_PANELS => Some(RoomPhase::RevealingPanels),
            _ => None,
        }
    }
}

/// A picture panel and the index of its fountain in [`RoomLayout::fountains`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub id: ObjectId,
    pub fountain: usize,
}

pub struct RoomLayout {
    pub state: SceneState,
    pub sky: ObjectId,
    /// `None` when the desk model failed to load.
    pub desk: Option<ObjectId>,
    /// `None` when the desk or the game system failed to load.
    pub game_system: Option<ObjectId>,
    pub panels: Vec<Panel>,
    pub fountains: Vec<Fountain>,
    pub chain: Sequencer<Target>,
}

fn load_texture(
    scene: &mut Scene,
    assets: &mut dyn AssetSource,
    label: &str,
    path: &Path,
) -> Option<TextureId> {
    match assets.load_image(path) {
        Ok(image) => Some(scene.add_texture(label, image)),
        Err(err) => {
            error!(%err, label, "texture failed to load");
            None
        }
    }
}

fn textured_or(texture: Option<TextureId>, fallback: Vec3) -> Material {
    match texture {
        Some(texture) => Material::textured(texture),
        None => Material::colored(fallback),
    }
}

/// Load the desk, and only once it is in the scene, the game system on top of it.
fn load_desk(
    scene: &mut Scene,
    config: &SceneConfig,
    assets: &mut dyn AssetSource,
) -> (Option<ObjectId>, Option<ObjectId>) {
    let desk_mesh = match assets.load_model(&config.assets.desk) {
        Ok(mesh) => mesh,
        Err(err) => {
            error!(%err, "desk model failed to load");
            return (None, None);
        }
    };
    let model = scene.add_model(desk_mesh);
    let desk = scene.add(
        SceneObject::new(MeshKind::Model(model))
            .named(DESK_NAME)
            .with_transform(Transform::from_position(DESK_POSITION)),
    );
    info!(?desk, "desk attached");

    let game_system = match assets.load_model(&config.assets.game_system) {
        Ok(mesh) => {
            let model = scene.add_model(mesh);
            let id = scene.add(
                SceneObject::new(MeshKind::Model(model))
                    .named(GAME_SYSTEM_NAME)
                    .with_parent(desk)
                    .with_transform(
                        Transform::from_position(GAME_SYSTEM_OFFSET).with_scale(Vec3::splat(0.5)),
                    ),
            );
            info!(?id, "game system attached");
            Some(id)
        }
        Err(err) => {
            error!(%err, "game system model failed to load");
            None
        }
    };
    (Some(desk), game_system)
}

fn add_shell(scene: &mut Scene) {
    scene.add(
        SceneObject::new(MeshKind::Plane {
            width: ROOM_HALF * 2.0,
            height: ROOM_HALF * 2.0,
        })
        .named("floor")
        .with_transform(
            Transform::default().with_rotation(Vec3::new(-std::f32::consts::FRAC_PI_2, 0.0, 0.0)),
        )
        .with_material(Material::colored(FLOOR_COLOR)),
    );

    let walls = [
        (
            "back_wall",
            Vec3::new(0.0, WALL_HEIGHT / 2.0, BACK_WALL_Z),
            Vec3::new(ROOM_HALF * 2.0, WALL_HEIGHT, WALL_THICKNESS),
        ),
        (
            "left_wall",
            Vec3::new(-ROOM_HALF, WALL_HEIGHT / 2.0, 0.0),
            Vec3::new(WALL_THICKNESS, WALL_HEIGHT, ROOM_HALF * 2.0),
        ),
        (
            "right_wall",
            Vec3::new(ROOM_HALF, WALL_HEIGHT / 2.0, 0.0),
            Vec3::new(WALL_THICKNESS, WALL_HEIGHT, ROOM_HALF * 2.0),
        ),
    ];
    for (name, position, size) in walls {
        scene.add(
            SceneObject::new(MeshKind::Cuboid { size })
                .named(name)
                .with_transform(Transform::from_position(position))
                .with_material(Material::colored(WALL_COLOR)),
        );
    }
}

/// Assemble the room. Asset failures are logged and leave the matching slot
/// empty; they never abort assembly.
pub fn build_room(config: &SceneConfig, assets: &mut dyn AssetSource) -> RoomLayout {
    let mut scene = Scene::new();

    let sky_texture = load_texture(&mut scene, assets, SKY_NAME, &config.assets.sky);
    let sky = scene.add(
        SceneObject::new(MeshKind::Sphere {
            radius: SKY_RADIUS,
            segments: 32,
        })
        .named(SKY_NAME)
        .with_material(Material {
            unlit: true,
            double_sided: true,
            ..textured_or(sky_texture, SKY_FALLBACK)
        }),
    );

    add_shell(&mut scene);
    let (desk, game_system) = load_desk(&mut scene, config, assets);

    let pictures = [
        ("portrait", &config.assets.portrait),
        ("art", &config.assets.art),
    ];
    let mut panels = Vec::with_capacity(pictures.len());
    let mut fountains = Vec::with_capacity(pictures.len());
    for ((label, path), x) in pictures.into_iter().zip(PANEL_XS) {
        let texture = load_texture(&mut scene, assets, label, path);
        let id = scene.add(
            SceneObject::new(MeshKind::Plane {
                width: PANEL_WIDTH,
                height: PANEL_HEIGHT,
            })
            .named(label)
            .with_transform(
                Transform::from_position(Vec3::new(x, PANEL_Y, PANEL_Z)).with_scale(Vec3::ZERO),
            )
            .with_material(Material {
                unlit: true,
                double_sided: true,
                ..textured_or(texture, WALL_COLOR * 0.5)
            }),
        );
        fountains.push(Fountain::new(
            id,
            FountainConfig {
                particle_count: config.fountain.particle_count,
                width: PANEL_WIDTH,
                height: PANEL_HEIGHT,
                reset_offset: config.fountain.reset_offset,
            },
            config.fountain.seed,
        ));
        panels.push(Panel {
            id,
            fountain: fountains.len() - 1,
        });
    }

    let panel_ids: Vec<_> = panels.iter().map(|panel| panel.id).collect();
    let chain = room_chain(&panel_ids);

    let mut camera = configured_camera(config, CAMERA_START);
    camera.look_at(CAMERA_START_FOCUS);

    RoomLayout {
        state: SceneState::new(scene, camera),
        sky,
        desk,
        game_system,
        panels,
        fountains,
        chain,
    }
}

/// Fly the camera to the desk, then grow the panels from nothing.
pub fn room_chain(panels: &[ObjectId]) -> Sequencer<Target> {
    let approach = Stage::new(STAGE_APPROACH)
        .tween(
            Tween::new(Target::Camera, Property::Position, APPROACH_POSITION, APPROACH_SECONDS)
                .with_easing(Easing::CubicInOut),
        )
        .tween(
            Tween::new(Target::CameraFocus, Property::Position, APPROACH_FOCUS, APPROACH_SECONDS)
                .with_easing(Easing::CubicInOut),
        );
    let reveal = panels.iter().fold(Stage::new(STAGE_REVEAL_PANELS), |stage, panel| {
        stage.tween(
            Tween::new(Target::Object(*panel), Property::Scale, Vec3::ONE, 0.8)
                .with_easing(Easing::BackOut),
        )
    });
    Sequencer::new("room", vec![approach, reveal])
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio3d_scene::assets::AssetError;
    use folio3d_scene::MeshData;
    use image::RgbaImage;
    use std::path::PathBuf;

    #[derive(Default)]
    struct FakeAssets {
        failing: Vec<PathBuf>,
        model_requests: Vec<PathBuf>,
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
            Ok(MeshData::cuboid(Vec3::ONE))
        }
    }

    #[test]
    fn desk_success_loads_game_system_as_child() {
        let config = SceneConfig::default();
        let mut assets = FakeAssets::default();
        let layout = build_room(&config, &mut assets);

        assert_eq!(
            assets.model_requests,
            vec![config.assets.desk.clone(), config.assets.game_system.clone()]
        );
        let desk = layout.desk.unwrap();
        let system = layout.game_system.unwrap();
        assert_eq!(layout.state.scene.object(system).unwrap().parent, Some(desk));
    }

    #[test]
    fn game_system_failure_keeps_desk() {
        let config = SceneConfig::default();
        let mut assets = FakeAssets {
            failing: vec![config.assets.game_system.clone()],
            ..FakeAssets::default()
        };
        let layout = build_room(&config, &mut assets);
        assert!(layout.desk.is_some());
        assert!(layout.game_system.is_none());
    }

    #[test]
    fn missing_pictures_fall_back_to_colour() {
        let config = SceneConfig::default();
        let mut assets = FakeAssets {
            failing: vec![config.assets.portrait.clone(), config.assets.sky.clone()],
            ..FakeAssets::default()
        };
        let layout = build_room(&config, &mut assets);
        let scene = &layout.state.scene;

        let portrait = scene.object(layout.panels[0].id).unwrap();
        assert_eq!(portrait.material.texture, None);
        let art = scene.object(layout.panels[1].id).unwrap();
        assert!(art.material.texture.is_some());
        assert_eq!(scene.object(layout.sky).unwrap().material.texture, None);
    }

    #[test]
    fn panels_start_collapsed_with_idle_fountains() {
        let layout = build_room(&SceneConfig::default(), &mut FakeAssets::default());
        assert_eq!(layout.panels.len(), 2);
        for panel in &layout.panels {
            let object = layout.state.scene.object(panel.id).unwrap();
            assert_eq!(object.transform.scale, Vec3::ZERO);
            let fountain = &layout.fountains[panel.fountain];
            assert_eq!(fountain.parent, panel.id);
            assert!(!fountain.active && !fountain.visible);
        }
        assert_eq!(layout.state.camera.position, CAMERA_START);
    }

    #[test]
    fn fountains_draw_from_distinct_streams() {
        let layout = build_room(&SceneConfig::default(), &mut FakeAssets::default());
        assert_ne!(
            layout.fountains[0].particles()[0],
            layout.fountains[1].particles()[0]
        );
    }
}
