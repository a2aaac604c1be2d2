//! Hover and click routing.

use folio3d_camera::Camera;
use folio3d_core::{ObjectId, TextureId};
use folio3d_scene::{LocalBounds, Scene};
use glam::{Vec2, Vec3};
use tracing::trace;

use crate::interaction::{ray_obb, ray_sphere, BoundingBox, Ray};

/// Cursor icon requested by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    /// Regular arrow.
    #[default]
    Default,
    /// Hand shown over interactive objects.
    Pointer,
}

/// A ray hit on a candidate object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Object that was hit.
    pub object: ObjectId,
    /// Distance from the camera along the ray.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
}

/// Result of a hover update.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverOutcome {
    /// Nearest hit, if any.
    pub hit: Option<PickHit>,
    /// Cursor to show.
    pub cursor: CursorStyle,
    /// Objects whose texture changed, with the texture they now show.
    pub swapped: Vec<(ObjectId, TextureId)>,
}

/// Maps pointer positions to objects.
///
/// The only state kept between calls is the last normalized device
/// coordinate pair.
#[derive(Debug, Clone, Default)]
pub struct InteractionRouter {
    last_ndc: Option<Vec2>,
}

impl InteractionRouter {
    /// Router with no pointer history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last NDC pair passed to [`pick`](Self::pick) or [`hover`](Self::hover).
    pub fn last_ndc(&self) -> Option<Vec2> {
        self.last_ndc
    }

    /// Every candidate hit by the ray through `ndc`, nearest first.
    ///
    /// Hidden candidates (or candidates under a hidden parent) are skipped.
    pub fn pick_all(
        &mut self,
        ndc: Vec2,
        camera: &Camera,
        scene: &Scene,
        candidates: &[ObjectId],
    ) -> Vec<PickHit> {
        self.last_ndc = Some(ndc);
        let ray = Ray::from_camera(ndc, &camera.view_matrix(), &camera.projection_matrix());

        let mut hits: Vec<PickHit> = candidates
            .iter()
            .filter(|id| scene.is_visible_in_world(**id))
            .filter_map(|id| {
                intersect(&ray, scene, *id).map(|distance| PickHit {
                    object: *id,
                    distance,
                    point: ray.at(distance),
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Nearest candidate hit by the ray through `ndc`.
    pub fn pick(
        &mut self,
        ndc: Vec2,
        camera: &Camera,
        scene: &Scene,
        candidates: &[ObjectId],
    ) -> Option<PickHit> {
        let hit = self.pick_all(ndc, camera, scene, candidates).into_iter().next();
        trace!(?ndc, ?hit, "pick");
        hit
    }

    /// Pick, then show the hover texture on the hit candidate and the normal
    /// texture on every other candidate that has a hover pair.
    pub fn hover(
        &mut self,
        ndc: Vec2,
        camera: &Camera,
        scene: &mut Scene,
        candidates: &[ObjectId],
    ) -> HoverOutcome {
        let hit = self.pick(ndc, camera, scene, candidates);
        let hit_id = hit.map(|h| h.object);

        let mut swapped = Vec::new();
        for id in candidates {
            let Some(pair) = scene.object(*id).and_then(|o| o.hover_textures) else {
                continue;
            };
            let wanted = if Some(*id) == hit_id {
                pair.hover
            } else {
                pair.normal
            };
            if scene.texture_of(*id) != Some(wanted) {
                scene.set_texture(*id, wanted);
                swapped.push((*id, wanted));
            }
        }

        HoverOutcome {
            hit,
            cursor: if hit.is_some() {
                CursorStyle::Pointer
            } else {
                CursorStyle::Default
            },
            swapped,
        }
    }
}

fn intersect(ray: &Ray, scene: &Scene, id: ObjectId) -> Option<f32> {
    let world = scene.world_matrix(id)?;
    match scene.local_bounds(id)? {
        LocalBounds::Sphere { radius } => {
            let center = world.transform_point3(Vec3::ZERO);
            let scale = world
                .x_axis
                .truncate()
                .length()
                .max(world.y_axis.truncate().length())
                .max(world.z_axis.truncate().length());
            ray_sphere(ray, center, radius * scale)
        }
        LocalBounds::Box { min, max } => ray_obb(ray, &world, &BoundingBox::new(min, max)),
    }
}
