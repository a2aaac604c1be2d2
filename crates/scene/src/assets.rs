//! Image, model, and font loading plus text texture rasterisation.

use std::path::{Path, PathBuf};

pub use fontdue::Font;
use fontdue::FontSettings;
use glam::{Mat4, Vec3};
use image::{Rgba, RgbaImage};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::mesh::MeshData;

/// Errors raised while loading assets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Image decoding failed.
    #[error("failed to decode image {path}: {source}")]
    Image {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: image::ImageError,
    },
    /// OBJ parsing failed.
    #[error("failed to parse model {path}: {source}")]
    Obj {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: tobj::LoadError,
    },
    /// glTF/GLB parsing or buffer loading failed.
    #[error("failed to load glTF {path}: {source}")]
    Gltf {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: gltf::Error,
    },
    /// Model parsed but contained no triangles.
    #[error("model {0} has no geometry")]
    EmptyModel(PathBuf),
    /// Extension is not a supported model format.
    #[error("unsupported model format: {0}")]
    UnsupportedFormat(PathBuf),
    /// Font bytes were rejected.
    #[error("failed to parse font {path}: {message}")]
    Font {
        /// Offending path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

/// Where scene assembly gets its files from.
pub trait AssetSource {
    /// Load and decode an image.
    fn load_image(&mut self, path: &Path) -> Result<RgbaImage, AssetError>;
    /// Load a model.
    fn load_model(&mut self, path: &Path) -> Result<MeshData, AssetError>;
}

/// Loads assets from the filesystem, resolving relative paths against `root`.
#[derive(Debug, Clone)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl AssetSource for FsAssets {
    fn load_image(&mut self, path: &Path) -> Result<RgbaImage, AssetError> {
        load_image(&self.resolve(path))
    }

    fn load_model(&mut self, path: &Path) -> Result<MeshData, AssetError> {
        load_model(&self.resolve(path))
    }
}

/// Decode an image file into RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, AssetError> {
    let image = image::open(path).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = image.to_rgba8();
    debug!(path = %path.display(), width = rgba.width(), height = rgba.height(), "image loaded");
    Ok(rgba)
}

/// Load a model file: binary or JSON glTF, or Wavefront OBJ.
pub fn load_model(path: &Path) -> Result<MeshData, AssetError> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("glb" | "gltf") => load_gltf(path),
        Some("obj") => load_obj(path),
        _ => Err(AssetError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn load_gltf(path: &Path) -> Result<MeshData, AssetError> {
    let gltf_err = |source| AssetError::Gltf {
        path: path.to_path_buf(),
        source,
    };
    let gltf::Gltf { document, blob } = gltf::Gltf::open(path).map_err(gltf_err)?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob).map_err(gltf_err)?;

    let mut mesh = MeshData::default();
    let mut missing_normals = false;
    let roots: Vec<_> = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene.nodes().collect(),
        None => document.nodes().collect(),
    };
    let mut stack: Vec<_> = roots.into_iter().map(|node| (node, Mat4::IDENTITY)).collect();
    while let Some((node, parent)) = stack.pop() {
        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
        if let Some(node_mesh) = node.mesh() {
            for primitive in node_mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    debug!(path = %path.display(), mode = ?primitive.mode(), "skipping non-triangle primitive");
                    continue;
                }
                let reader =
                    primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
                let Some(positions) = reader.read_positions() else {
                    continue;
                };
                let base = mesh.positions.len() as u32;
                mesh.positions
                    .extend(positions.map(|p| world.transform_point3(Vec3::from(p)).to_array()));
                let added = mesh.positions.len() - base as usize;

                match reader.read_normals() {
                    Some(normals) => mesh.normals.extend(normals.map(|n| {
                        world
                            .transform_vector3(Vec3::from(n))
                            .normalize_or_zero()
                            .to_array()
                    })),
                    None => missing_normals = true,
                }
                match reader.read_tex_coords(0) {
                    Some(uvs) => mesh.uvs.extend(uvs.into_f32()),
                    None => mesh.uvs.extend(std::iter::repeat([0.0, 0.0]).take(added)),
                }
                match reader.read_indices() {
                    Some(indices) => mesh.indices.extend(indices.into_u32().map(|i| base + i)),
                    None => mesh.indices.extend(base..base + added as u32),
                }
            }
        }
        stack.extend(node.children().map(|child| (child, world)));
    }

    if mesh.indices.is_empty() {
        return Err(AssetError::EmptyModel(path.to_path_buf()));
    }
    if missing_normals || mesh.normals.len() != mesh.positions.len() {
        mesh.normals.clear();
        mesh.recompute_normals();
    }
    info!(
        path = %path.display(),
        meshes = document.meshes().count(),
        triangles = mesh.triangle_count(),
        "model loaded"
    );
    Ok(mesh)
}

fn load_obj(path: &Path) -> Result<MeshData, AssetError> {
    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, _materials) = tobj::load_obj(path, &options).map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let mut mesh = MeshData::default();
    let mut missing_normals = false;
    for model in &models {
        let src = &model.mesh;
        let base = mesh.positions.len() as u32;
        let count = src.positions.len() / 3;
        for i in 0..count {
            mesh.positions
                .push([src.positions[i * 3], src.positions[i * 3 + 1], src.positions[i * 3 + 2]]);
            if src.normals.len() >= (i + 1) * 3 {
                mesh.normals
                    .push([src.normals[i * 3], src.normals[i * 3 + 1], src.normals[i * 3 + 2]]);
            } else {
                missing_normals = true;
            }
            // OBJ texture space has its origin at the bottom-left.
            if src.texcoords.len() >= (i + 1) * 2 {
                mesh.uvs.push([src.texcoords[i * 2], 1.0 - src.texcoords[i * 2 + 1]]);
            } else {
                mesh.uvs.push([0.0, 0.0]);
            }
        }
        mesh.indices.extend(src.indices.iter().map(|i| base + i));
    }

    if mesh.indices.is_empty() {
        return Err(AssetError::EmptyModel(path.to_path_buf()));
    }
    if missing_normals {
        mesh.recompute_normals();
    }
    info!(
        path = %path.display(),
        objects = models.len(),
        triangles = mesh.triangle_count(),
        "model loaded"
    );
    Ok(mesh)
}

/// Parse a TrueType/OpenType font file.
pub fn load_font(path: &Path) -> Result<Font, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Font::from_bytes(bytes, FontSettings::default()).map_err(|message| AssetError::Font {
        path: path.to_path_buf(),
        message: message.to_string(),
    })
}

/// Colours and size for [`text_texture`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Texture edge length in pixels.
    pub size: u32,
    /// Glyph height in pixels.
    pub font_px: f32,
    /// Background fill.
    pub background: [u8; 4],
    /// Glyph colour.
    pub foreground: [u8; 4],
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 256,
            font_px: 40.0,
            background: [0, 0, 0, 255],
            foreground: [255, 255, 255, 255],
        }
    }
}

/// Square texture with `text` centred on the background colour.
///
/// Without a font the texture is a plain background fill.
pub fn text_texture(text: &str, font: Option<&Font>, style: &TextStyle) -> RgbaImage {
    let size = style.size.max(1);
    let mut image = RgbaImage::from_pixel(size, size, Rgba(style.background));
    let Some(font) = font else {
        warn!(text, "no font configured, using solid text texture");
        return image;
    };

    let glyphs: Vec<_> = text.chars().map(|c| font.rasterize(c, style.font_px)).collect();
    let text_width: f32 = glyphs.iter().map(|(m, _)| m.advance_width).sum();
    let (ascent, descent) = font
        .horizontal_line_metrics(style.font_px)
        .map(|m| (m.ascent, m.descent))
        .unwrap_or((style.font_px, 0.0));
    let baseline = (size as f32 + ascent + descent) * 0.5;

    let mut pen_x = (size as f32 - text_width) * 0.5;
    for (metrics, coverage) in &glyphs {
        let left = (pen_x + metrics.xmin as f32).round() as i64;
        let top = (baseline - metrics.ymin as f32 - metrics.height as f32).round() as i64;
        for gy in 0..metrics.height {
            for gx in 0..metrics.width {
                let (x, y) = (left + gx as i64, top + gy as i64);
                if x < 0 || y < 0 || x >= size as i64 || y >= size as i64 {
                    continue;
                }
                let alpha = coverage[gy * metrics.width + gx] as f32 / 255.0;
                if alpha <= 0.0 {
                    continue;
                }
                let pixel = image.get_pixel_mut(x as u32, y as u32);
                for channel in 0..4 {
                    let bg = pixel.0[channel] as f32;
                    let fg = style.foreground[channel] as f32;
                    pixel.0[channel] = (bg + (fg - bg) * alpha).round() as u8;
                }
            }
        }
        pen_x += metrics.advance_width;
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Single triangle in a GLB container, under a node lifted by `(0, 2, 0)`.
    fn triangle_glb() -> Vec<u8> {
        let mut bin = Vec::new();
        for v in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            for c in v {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let json = format!(
            r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[0]}}],"nodes":[{{"mesh":0,"translation":[0,2,0]}}],"meshes":[{{"primitives":[{{"attributes":{{"POSITION":0}},"indices":1}}]}}],"buffers":[{{"byteLength":{}}}],"bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":36,"target":34962}},{{"buffer":0,"byteOffset":36,"byteLength":6,"target":34963}}],"accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0,0,0],"max":[1,1,0]}},{{"bufferView":1,"componentType":5123,"count":3,"type":"SCALAR"}}]}}"#,
            bin.len()
        );
        let mut json = json.into_bytes();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json);
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin);
        glb
    }

    #[test]
    fn glb_triangle_loads_with_node_transform() {
        let mut file = tempfile::Builder::new().suffix(".glb").tempfile().unwrap();
        file.write_all(&triangle_glb()).unwrap();
        let mesh = load_model(file.path()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.positions[1], [1.0, 2.0, 0.0]);
        assert_eq!(mesh.uvs.len(), 3);
        assert_eq!(mesh.normals.len(), 3);
        assert!(mesh.normals.iter().all(|n| (n[2] - 1.0).abs() < 1e-6));
    }

    #[test]
    fn missing_glb_reports_gltf_error() {
        let err = load_model(Path::new("/definitely/not/here/desk.glb")).unwrap_err();
        assert!(matches!(err, AssetError::Gltf { .. }), "{err}");
    }

    #[test]
    fn other_extensions_are_unsupported() {
        let err = load_model(Path::new("assets/desk.fbx")).unwrap_err();
        assert!(matches!(err, AssetError::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_obj_reports_parse_error() {
        let err = load_model(Path::new("/definitely/not/here/desk.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Obj { .. }), "{err}");
    }

    #[test]
    fn obj_quad_is_triangulated_with_normals() {
        let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        writeln!(file, "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4").unwrap();
        let mesh = load_model(file.path()).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert!(mesh.normals.iter().all(|n| (n[2] - 1.0).abs() < 1e-6));
        assert_eq!(mesh.bounds().unwrap().1.x, 1.0);
    }

    #[test]
    fn empty_obj_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        writeln!(file, "# nothing here").unwrap();
        assert!(matches!(
            load_model(file.path()),
            Err(AssetError::EmptyModel(_))
        ));
    }

    #[test]
    fn missing_image_reports_path() {
        let err = load_image(Path::new("/definitely/not/here/me.jpg")).unwrap_err();
        assert!(err.to_string().contains("me.jpg"));
    }

    #[test]
    fn fs_assets_resolve_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let image = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        image.save(dir.path().join("art.png")).unwrap();
        let mut source = FsAssets::new(dir.path());
        let loaded = source.load_image(Path::new("art.png")).unwrap();
        assert_eq!(loaded.dimensions(), (2, 2));
        assert_eq!(*loaded.get_pixel(1, 1), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn text_texture_without_font_is_solid_background() {
        let style = TextStyle {
            size: 8,
            background: [1, 2, 3, 255],
            ..TextStyle::default()
        };
        let image = text_texture("MENU.MENU.", None, &style);
        assert_eq!(image.dimensions(), (8, 8));
        assert!(image.pixels().all(|p| p.0 == [1, 2, 3, 255]));
    }

    #[test]
    fn bad_font_bytes_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a font").unwrap();
        assert!(matches!(load_font(file.path()), Err(AssetError::Font { .. })));
    }
}
