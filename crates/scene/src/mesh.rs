//! CPU-side triangle meshes.

use glam::Vec3;
use std::f32::consts::PI;

/// Index of a loaded model inside a [`crate::Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub u32);

/// Indexed triangle list with per-vertex normals and texture coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, same length as `positions`.
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates with the origin at the top-left of the image.
    pub uvs: Vec<[f32; 2]>,
    /// Counter-clockwise triangles.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// UV sphere laid out like a globe: `u` wraps around Y, `v` runs pole to pole.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let w = width_segments.max(3);
        let h = height_segments.max(2);
        let mut mesh = Self::default();

        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let dir = Vec3::new(
                    -(u * 2.0 * PI).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * 2.0 * PI).sin() * (v * PI).sin(),
                );
                mesh.positions.push((dir * radius).to_array());
                mesh.normals.push(dir.normalize_or_zero().to_array());
                mesh.uvs.push([u, v]);
            }
        }

        let stride = w + 1;
        for iy in 0..h {
            for ix in 0..w {
                let a = iy * stride + ix + 1;
                let b = iy * stride + ix;
                let c = (iy + 1) * stride + ix;
                let d = (iy + 1) * stride + ix + 1;
                if iy != 0 {
                    mesh.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    mesh.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        mesh
    }

    /// Box centred on the origin with one quad per face.
    pub fn cuboid(size: Vec3) -> Self {
        let half = size * 0.5;
        // (normal, u axis, v axis) with u x v == normal.
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        let mut mesh = Self::default();
        for (normal, u_axis, v_axis) in faces {
            let depth = normal.abs().dot(half);
            let hu = u_axis.abs().dot(half);
            let hv = v_axis.abs().dot(half);
            mesh.push_quad(normal * depth, u_axis * hu, v_axis * hv, normal);
        }
        mesh
    }

    /// Rectangle in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        let mut mesh = Self::default();
        mesh.push_quad(
            Vec3::ZERO,
            Vec3::X * (width * 0.5),
            Vec3::Y * (height * 0.5),
            Vec3::Z,
        );
        mesh
    }

    fn push_quad(&mut self, center: Vec3, u: Vec3, v: Vec3, normal: Vec3) {
        let base = self.positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            self.positions.push((center + u * su + v * sv).to_array());
            self.normals.push(normal.to_array());
            self.uvs.push([(su + 1.0) * 0.5, 1.0 - (sv + 1.0) * 0.5]);
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds of the vertex positions, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|p| Vec3::from_array(*p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Replace the normals with area-weighted vertex normals.
    pub fn recompute_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(pa), Some(pb), Some(pc)) = (
                self.positions.get(a),
                self.positions.get(b),
                self.positions.get(c),
            ) else {
                continue;
            };
            let (pa, pb, pc) = (Vec3::from(*pa), Vec3::from(*pb), Vec3::from(*pc));
            let face = (pb - pa).cross(pc - pa);
            for i in [a, b, c] {
                accum[i] += face;
            }
        }
        self.normals = accum
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }
}
