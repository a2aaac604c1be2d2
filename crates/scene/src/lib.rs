#![warn(missing_docs)]
//! Retained scene graph: objects, materials, textures, lights, and asset loading.

pub mod assets;
mod graph;
mod light;
mod mesh;
mod object;
mod texture;

pub use graph::{LocalBounds, Scene};
pub use light::{AmbientLight, DirectionalLight, LightRig, PointLight};
pub use mesh::{MeshData, ModelId};
pub use object::{HoverTextures, Material, MeshKind, SceneObject};
pub use texture::TextureStore;
