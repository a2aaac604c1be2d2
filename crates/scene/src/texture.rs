use folio3d_core::TextureId;
use image::{Rgba, RgbaImage};

/// Registry of RGBA textures addressed by [`TextureId`].
///
/// Textures are immutable once registered, so renderers can upload each id
/// once and cache the GPU copy.
#[derive(Debug, Default, Clone)]
pub struct TextureStore {
    entries: Vec<(String, RgbaImage)>,
}

impl TextureStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image and return its id.
    pub fn insert(&mut self, label: impl Into<String>, image: RgbaImage) -> TextureId {
        let id = TextureId(self.entries.len() as u32);
        self.entries.push((label.into(), image));
        id
    }

    /// Register a 1x1 texture of a single colour.
    pub fn insert_solid(&mut self, label: impl Into<String>, rgba: [u8; 4]) -> TextureId {
        self.insert(label, RgbaImage::from_pixel(1, 1, Rgba(rgba)))
    }

    /// Image for `id`.
    pub fn get(&self, id: TextureId) -> Option<&RgbaImage> {
        self.entries.get(id.0 as usize).map(|(_, image)| image)
    }

    /// Label the texture was registered under.
    pub fn label(&self, id: TextureId) -> Option<&str> {
        self.entries.get(id.0 as usize).map(|(label, _)| label.as_str())
    }

    /// Id of the first texture registered under `label`.
    pub fn find(&self, label: &str) -> Option<TextureId> {
        self.entries
            .iter()
            .position(|(l, _)| l == label)
            .map(|i| TextureId(i as u32))
    }

    /// Number of registered textures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All textures in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TextureId, &RgbaImage)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, (_, image))| (TextureId(i as u32), image))
    }
}
