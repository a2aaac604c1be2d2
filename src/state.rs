//! Scene plus camera, addressed as one tween target space.

use folio3d_anim::{Property, PropertyStore, TweenValue};
use folio3d_camera::Camera;
use folio3d_core::ObjectId;
use folio3d_scene::Scene;
use tracing::debug;

/// What a tween drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// A scene object.
    Object(ObjectId),
    /// The camera eye; only `Position` applies.
    Camera,
    /// The point the camera looks at; only `Position` applies.
    CameraFocus,
}

/// Everything chains are allowed to touch.
#[derive(Debug, Default)]
pub struct SceneState {
    pub scene: Scene,
    pub camera: Camera,
}

impl SceneState {
    pub fn new(scene: Scene, camera: Camera) -> Self {
        Self { scene, camera }
    }
}

impl PropertyStore<Target> for SceneState {
    fn read(&self, target: &Target, property: Property) -> Option<TweenValue> {
        match (target, property) {
            (Target::Object(id), _) => self.scene.read(id, property),
            (Target::Camera, Property::Position) => Some(self.camera.position.into()),
            (Target::CameraFocus, Property::Position) => Some(self.camera.target.into()),
            _ => None,
        }
    }

    fn write(&mut self, target: &Target, property: Property, value: TweenValue) {
        match (target, property, value) {
            (Target::Object(id), _, _) => self.scene.write(id, property, value),
            (Target::Camera, Property::Position, TweenValue::Vec3(position)) => {
                self.camera.position = position;
            }
            (Target::CameraFocus, Property::Position, TweenValue::Vec3(focus)) => {
                self.camera.target = focus;
            }
            _ => debug!(?target, ?property, "ignored camera tween write"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio3d_scene::{MeshKind, SceneObject};
    use glam::Vec3;

    #[test]
    fn camera_targets_accept_position_only() {
        let mut state = SceneState::default();
        state.write(&Target::Camera, Property::Position, Vec3::new(1.0, 2.0, 3.0).into());
        state.write(&Target::CameraFocus, Property::Position, Vec3::Y.into());
        state.write(&Target::Camera, Property::Scale, Vec3::ZERO.into());

        assert_eq!(state.camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state.camera.target, Vec3::Y);
        assert_eq!(state.read(&Target::Camera, Property::Opacity), None);
    }

    #[test]
    fn object_targets_forward_to_scene() {
        let mut state = SceneState::default();
        let id = state.scene.add(SceneObject::new(MeshKind::Sphere {
            radius: 1.0,
            segments: 8,
        }));
        state.write(&Target::Object(id), Property::Scale, Vec3::splat(0.5).into());
        assert_eq!(
            state.read(&Target::Object(id), Property::Scale),
            Some(Vec3::splat(0.5).into())
        );
    }
}
