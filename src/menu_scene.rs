//! Menu and pulse scenes: a labelled sphere and, for the menu, the panel of
//! navigation links its stage chain opens.

use std::f32::consts::TAU;

use folio3d_anim::{Easing, Property, Sequencer, Stage, Tween};
use folio3d_camera::Camera;
use folio3d_core::{ObjectId, Transform};
use folio3d_scene::assets::{text_texture, Font, TextStyle};
use folio3d_scene::{HoverTextures, Material, MeshKind, Scene, SceneObject};
use glam::Vec3;
use serde::Serialize;

use crate::config::SceneConfig;
use crate::state::{SceneState, Target};

pub const SPHERE_NAME: &str = "menu_sphere";
pub const PANEL_NAME: &str = "menu_panel";

const SPHERE_RADIUS: f32 = 3.0;
const SPHERE_SEGMENTS: u32 = 32;
const SPHERE_SHRUNK: f32 = 0.5;
const SPHERE_ASIDE: Vec3 = Vec3::new(-2.2, 0.0, 0.0);

const PANEL_SIZE: Vec3 = Vec3::new(3.0, 4.0, 0.1);
const PANEL_START: Vec3 = Vec3::new(0.0, 0.0, 2.0);
const PANEL_OPEN: Vec3 = Vec3::new(1.6, 0.0, 2.0);
const PANEL_COLOR: Vec3 = Vec3::new(0.08, 0.08, 0.1);

const LINK_WIDTH: f32 = 2.4;
const LINK_HEIGHT: f32 = 0.6;
const LINK_TOP: f32 = 1.2;
const LINK_SPACING: f32 = 0.8;
// In front of the panel face so the links win the depth test and the pick.
const LINK_DEPTH: f32 = 0.06;

const STAGE_SHRINK: &str = "shrink";
const STAGE_GROW: &str = "grow";
const STAGE_ROTATE: &str = "rotate";
const STAGE_SLIDE: &str = "slide";
const STAGE_REVEAL_LINKS: &str = "reveal_links";
const STAGE_SHRINK_BACK: &str = "shrink_back";

/// Where the menu is in its open/close cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuPhase {
    #[default]
    Closed,
    Shrinking,
    Growing,
    Rotating,
    Sliding,
    RevealingLinks,
    Open,
    ShrinkingBack,
}

impl MenuPhase {
    /// Phase entered when the stage called `label` starts.
    pub fn for_stage(label: &str) -> Option<Self> {
        match label {
            STAGE_SHRINK => Some(MenuPhase::Shrinking),
            STAGE_GROW => Some(MenuPhase::Growing),
            STAGE_ROTATE => Some(MenuPhase::Rotating),
            STAGE_SLIDE => Some(MenuPhase::Sliding),
            STAGE_REVEAL_LINKS => Some(MenuPhase::RevealingLinks),
            STAGE_SHRINK_BACK => Some(MenuPhase::ShrinkingBack),
            _ => None,
        }
    }

    /// Whether the links become visible at the start of this phase.
    pub fn shows_links(self) -> bool {
        self == MenuPhase::RevealingLinks
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    pub id: ObjectId,
    pub name: String,
}

pub struct MenuLayout {
    pub state: SceneState,
    pub sphere: ObjectId,
    pub panel: ObjectId,
    pub links: Vec<NavLink>,
    pub chain: Sequencer<Target>,
}

pub struct PulseLayout {
    pub state: SceneState,
    pub sphere: ObjectId,
}

/// Camera placed and configured from `config.camera`.
pub fn configured_camera(config: &SceneConfig, position: Vec3) -> Camera {
    Camera::new(position)
        .with_fov_degrees(config.camera.fov_degrees)
        .with_clip(config.camera.near, config.camera.far)
}

fn label_sphere(scene: &mut Scene, config: &SceneConfig, font: Option<&Font>) -> ObjectId {
    let label = text_texture(&config.menu.label, font, &TextStyle::default());
    let texture = scene.add_texture("menu_label", label);
    scene.add(
        SceneObject::new(MeshKind::Sphere {
            radius: SPHERE_RADIUS,
            segments: SPHERE_SEGMENTS,
        })
        .named(SPHERE_NAME)
        .with_material(Material {
            metalness: 0.3,
            roughness: 0.8,
            ..Material::textured(texture)
        }),
    )
}

/// Sphere, hidden panel and hidden links, plus the chain that opens them.
pub fn build_menu(config: &SceneConfig, font: Option<&Font>) -> MenuLayout {
    let mut scene = Scene::new();
    let sphere = label_sphere(&mut scene, config, font);

    let panel = scene.add(
        SceneObject::new(MeshKind::Cuboid { size: PANEL_SIZE })
            .named(PANEL_NAME)
            .with_transform(Transform::from_position(PANEL_START).with_scale(Vec3::ZERO))
            .with_material(Material::colored(PANEL_COLOR)),
    );

    let normal_style = TextStyle::default();
    let hover_style = TextStyle {
        background: normal_style.foreground,
        foreground: normal_style.background,
        ..normal_style
    };

    let mut links = Vec::with_capacity(config.menu.links.len());
    for (index, name) in config.menu.links.iter().enumerate() {
        let normal = scene.add_texture(
            format!("link:{name}"),
            text_texture(name, font, &normal_style),
        );
        let hover = scene.add_texture(
            format!("link:{name}:hover"),
            text_texture(name, font, &hover_style),
        );
        let position = Vec3::new(0.0, LINK_TOP - index as f32 * LINK_SPACING, LINK_DEPTH);
        let id = scene.add(
            SceneObject::new(MeshKind::Plane {
                width: LINK_WIDTH,
                height: LINK_HEIGHT,
            })
            .named(name.clone())
            .with_parent(panel)
            .with_transform(Transform::from_position(position))
            .with_material(Material {
                opacity: 0.0,
                unlit: true,
                ..Material::default()
            })
            .with_hover_textures(HoverTextures { normal, hover })
            .hidden(),
        );
        links.push(NavLink {
            id,
            name: name.clone(),
        });
    }

    let link_ids: Vec<_> = links.iter().map(|link| link.id).collect();
    let chain = menu_chain(sphere, panel, &link_ids);
    let camera = configured_camera(config, Vec3::from(config.camera.position));

    MenuLayout {
        state: SceneState::new(scene, camera),
        sphere,
        panel,
        links,
        chain,
    }
}

/// Just the labelled sphere.
pub fn build_pulse(config: &SceneConfig, font: Option<&Font>) -> PulseLayout {
    let mut scene = Scene::new();
    let sphere = label_sphere(&mut scene, config, font);
    let camera = configured_camera(config, Vec3::from(config.camera.position));
    PulseLayout {
        state: SceneState::new(scene, camera),
        sphere,
    }
}

/// Shrink the sphere, grow and spin the panel in, slide both apart, then fade
/// the links in. The reverse chain undoes all of it in one stage.
pub fn menu_chain(sphere: ObjectId, panel: ObjectId, links: &[ObjectId]) -> Sequencer<Target> {
    let sphere = Target::Object(sphere);
    let panel = Target::Object(panel);

    let reveal = links.iter().fold(Stage::new(STAGE_REVEAL_LINKS), |stage, link| {
        stage.tween(
            Tween::new(Target::Object(*link), Property::Opacity, 1.0, 0.4)
                .with_easing(Easing::QuadOut),
        )
    });
    let forward = vec![
        Stage::new(STAGE_SHRINK).tween(
            Tween::new(sphere, Property::Scale, Vec3::splat(SPHERE_SHRUNK), 0.5)
                .with_easing(Easing::QuadOut),
        ),
        Stage::new(STAGE_GROW).tween(
            Tween::new(panel, Property::Scale, Vec3::ONE, 0.6).with_easing(Easing::BackOut),
        ),
        Stage::new(STAGE_ROTATE).tween(
            Tween::new(panel, Property::Rotation, Vec3::new(0.0, TAU, 0.0), 0.6)
                .with_easing(Easing::CubicInOut),
        ),
        Stage::new(STAGE_SLIDE)
            .tween(
                Tween::new(panel, Property::Position, PANEL_OPEN, 0.5)
                    .with_easing(Easing::CubicOut),
            )
            .tween(
                Tween::new(sphere, Property::Position, SPHERE_ASIDE, 0.5)
                    .with_easing(Easing::CubicOut),
            ),
        reveal,
    ];

    let close = links.iter().fold(
        Stage::new(STAGE_SHRINK_BACK)
            .tween(Tween::new(panel, Property::Scale, Vec3::ZERO, 0.5).with_easing(Easing::QuadInOut))
            .tween(Tween::new(panel, Property::Rotation, Vec3::ZERO, 0.5))
            .tween(Tween::new(panel, Property::Position, PANEL_START, 0.5))
            .tween(Tween::new(sphere, Property::Scale, Vec3::ONE, 0.5).with_easing(Easing::QuadInOut))
            .tween(Tween::new(sphere, Property::Position, Vec3::ZERO, 0.5)),
        |stage, link| stage.tween(Tween::new(Target::Object(*link), Property::Opacity, 0.0, 0.3)),
    );

    Sequencer::new("menu", forward).with_reverse(vec![close])
}
