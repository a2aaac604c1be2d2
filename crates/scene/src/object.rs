use folio3d_core::{ObjectId, TextureId, Transform};
use glam::Vec3;

use crate::mesh::ModelId;

/// Geometry attached to an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshKind {
    /// UV sphere centred on the origin.
    Sphere {
        /// Radius in local units.
        radius: f32,
        /// Longitude and latitude segment count.
        segments: u32,
    },
    /// Axis-aligned box centred on the origin.
    Cuboid {
        /// Full extents along each axis.
        size: Vec3,
    },
    /// Rectangle in the local XY plane facing +Z.
    Plane {
        /// Extent along X.
        width: f32,
        /// Extent along Y.
        height: f32,
    },
    /// Loaded model registered with [`crate::Scene::add_model`].
    Model(ModelId),
}

/// Surface description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base colour (linear RGB), multiplied with the texture when one is set.
    pub color: Vec3,
    /// Optional albedo texture.
    pub texture: Option<TextureId>,
    /// 0 = opaque-invisible, 1 = fully opaque.
    pub opacity: f32,
    /// Metalness factor.
    pub metalness: f32,
    /// Roughness factor.
    pub roughness: f32,
    /// Skip lighting (sky dome, text labels).
    pub unlit: bool,
    /// Render back faces as well.
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            texture: None,
            opacity: 1.0,
            metalness: 0.0,
            roughness: 1.0,
            unlit: false,
            double_sided: false,
        }
    }
}

impl Material {
    /// Material with a texture and default factors.
    pub fn textured(texture: TextureId) -> Self {
        Self {
            texture: Some(texture),
            ..Self::default()
        }
    }

    /// Untextured material of the given colour.
    pub fn colored(color: Vec3) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}

/// Texture pair swapped by hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverTextures {
    /// Texture shown when the pointer is elsewhere.
    pub normal: TextureId,
    /// Texture shown while the pointer is over the object.
    pub hover: TextureId,
}

/// One node of the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Optional label used for lookups and logging.
    pub name: Option<String>,
    /// Transform relative to the parent (or world when there is none).
    pub transform: Transform,
    /// Geometry.
    pub mesh: MeshKind,
    /// Surface.
    pub material: Material,
    /// Hover swap textures, if the object reacts to hover.
    pub hover_textures: Option<HoverTextures>,
    /// Hidden objects are neither drawn nor picked.
    pub visible: bool,
    /// Parent node.
    pub parent: Option<ObjectId>,
}

impl SceneObject {
    /// Visible object at the origin with a default material.
    pub fn new(mesh: MeshKind) -> Self {
        Self {
            name: None,
            transform: Transform::default(),
            mesh,
            material: Material::default(),
            hover_textures: None,
            visible: true,
            parent: None,
        }
    }

    /// Set the name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the local transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the material.
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Attach hover textures; the material starts on the normal one.
    pub fn with_hover_textures(mut self, textures: HoverTextures) -> Self {
        self.material.texture = Some(textures.normal);
        self.hover_textures = Some(textures);
        self
    }

    /// Parent this object.
    pub fn with_parent(mut self, parent: ObjectId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Start hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Whether the name matches.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}
