use folio3d_anim::{Property, PropertyStore, TweenValue};
use folio3d_core::{ObjectId, TextureId};
use glam::{Mat4, Vec3};
use image::RgbaImage;
use tracing::debug;

use crate::light::LightRig;
use crate::mesh::{MeshData, ModelId};
use crate::object::{MeshKind, SceneObject};
use crate::texture::TextureStore;

/// Deepest parent chain followed when composing transforms.
const MAX_DEPTH: usize = 32;
/// Thickness given to planes so they have a pickable volume.
const PLANE_THICKNESS: f32 = 1e-3;

/// Bounding volume in an object's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalBounds {
    /// Sphere around the local origin.
    Sphere {
        /// Local radius.
        radius: f32,
    },
    /// Axis-aligned box in local space.
    Box {
        /// Minimum corner.
        min: Vec3,
        /// Maximum corner.
        max: Vec3,
    },
}

/// Objects, models, textures and lights making up one scene.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    models: Vec<MeshData>,
    textures: TextureStore,
    /// Lights fed to the shader.
    pub lights: LightRig,
    /// Clear colour (linear RGB).
    pub background: Vec3,
}

impl Scene {
    /// Empty scene with the default light rig.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and return its id.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        debug!(?id, name = ?object.name, "scene object added");
        self.objects.push(object);
        id
    }

    /// Object by id.
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0 as usize)
    }

    /// Mutable object by id.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id.0 as usize)
    }

    /// All objects with their ids.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, object)| (ObjectId(i as u32), object))
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// First object with the given name.
    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.objects().find(|(_, o)| o.is_named(name)).map(|(id, _)| id)
    }

    /// Register model geometry.
    pub fn add_model(&mut self, mesh: MeshData) -> ModelId {
        self.models.push(mesh);
        ModelId(self.models.len() as u32 - 1)
    }

    /// Model geometry by id.
    pub fn model(&self, id: ModelId) -> Option<&MeshData> {
        self.models.get(id.0 as usize)
    }

    /// Register a texture.
    pub fn add_texture(&mut self, label: impl Into<String>, image: RgbaImage) -> TextureId {
        self.textures.insert(label, image)
    }

    /// Texture registry.
    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    /// Mutable texture registry.
    pub fn textures_mut(&mut self) -> &mut TextureStore {
        &mut self.textures
    }

    /// Point `id`'s material at `texture`. Returns false if `id` is unknown.
    pub fn set_texture(&mut self, id: ObjectId, texture: TextureId) -> bool {
        match self.object_mut(id) {
            Some(object) => {
                object.material.texture = Some(texture);
                true
            }
            None => false,
        }
    }

    /// Current texture of `id`.
    pub fn texture_of(&self, id: ObjectId) -> Option<TextureId> {
        self.object(id).and_then(|o| o.material.texture)
    }

    /// Local-to-world matrix composed through the parent chain.
    pub fn world_matrix(&self, id: ObjectId) -> Option<Mat4> {
        let mut matrix = self.object(id)?.transform.matrix();
        let mut current = self.object(id)?.parent;
        for _ in 0..MAX_DEPTH {
            let Some(parent_id) = current else {
                return Some(matrix);
            };
            let parent = self.object(parent_id)?;
            matrix = parent.transform.matrix() * matrix;
            current = parent.parent;
        }
        None
    }

    /// Whether `id` and all of its ancestors are visible.
    pub fn is_visible_in_world(&self, id: ObjectId) -> bool {
        let mut current = Some(id);
        for _ in 0..=MAX_DEPTH {
            let Some(node_id) = current else {
                return true;
            };
            match self.object(node_id) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        false
    }

    /// Bounding volume of `id`'s geometry in its local space.
    pub fn local_bounds(&self, id: ObjectId) -> Option<LocalBounds> {
        let object = self.object(id)?;
        match object.mesh {
            MeshKind::Sphere { radius, .. } => Some(LocalBounds::Sphere { radius }),
            MeshKind::Cuboid { size } => Some(LocalBounds::Box {
                min: -size * 0.5,
                max: size * 0.5,
            }),
            MeshKind::Plane { width, height } => {
                let half = Vec3::new(width * 0.5, height * 0.5, PLANE_THICKNESS * 0.5);
                Some(LocalBounds::Box {
                    min: -half,
                    max: half,
                })
            }
            MeshKind::Model(model) => {
                let (min, max) = self.model(model)?.bounds()?;
                Some(LocalBounds::Box { min, max })
            }
        }
    }
}

impl PropertyStore<ObjectId> for Scene {
    fn read(&self, target: &ObjectId, property: Property) -> Option<TweenValue> {
        let object = self.object(*target)?;
        Some(match property {
            Property::Position => TweenValue::Vec3(object.transform.position),
            Property::Rotation => TweenValue::Vec3(object.transform.rotation),
            Property::Scale => TweenValue::Vec3(object.transform.scale),
            Property::Opacity => TweenValue::Scalar(object.material.opacity),
        })
    }

    fn write(&mut self, target: &ObjectId, property: Property, value: TweenValue) {
        let Some(object) = self.object_mut(*target) else {
            return;
        };
        match (property, value) {
            (Property::Position, TweenValue::Vec3(v)) => object.transform.position = v,
            (Property::Rotation, TweenValue::Vec3(v)) => object.transform.rotation = v,
            (Property::Scale, TweenValue::Vec3(v)) => object.transform.scale = v,
            (Property::Opacity, TweenValue::Scalar(v)) => object.material.opacity = v.clamp(0.0, 1.0),
            (property, value) => {
                debug!(?target, ?property, ?value, "ignoring mismatched tween value");
            }
        }
    }
}
