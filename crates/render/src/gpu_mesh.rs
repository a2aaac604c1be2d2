use folio3d_scene::{MeshData, MeshKind, ModelId};
use wgpu::util::DeviceExt;

/// Interleaved vertex matching `scene.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Local position.
    pub position: [f32; 3],
    /// Local normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl MeshVertex {
    /// Vertex attributes at locations 0..=2.
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    /// Interleave a mesh. Missing normals or UVs default to +Y and (0, 0).
    pub fn interleave(mesh: &MeshData) -> Vec<Self> {
        mesh.positions
            .iter()
            .enumerate()
            .map(|(i, position)| Self {
                position: *position,
                normal: mesh.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                uv: mesh.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }
}

/// Cache key for uploaded geometry. Procedural shapes with equal parameters
/// share a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKey {
    /// Sphere radius bits and segment count.
    Sphere(u32, u32),
    /// Box size bits.
    Cuboid([u32; 3]),
    /// Plane width and height bits.
    Plane(u32, u32),
    /// Loaded model.
    Model(ModelId),
}

impl MeshKey {
    /// Key for a mesh kind.
    pub fn of(kind: &MeshKind) -> Self {
        match *kind {
            MeshKind::Sphere { radius, segments } => Self::Sphere(radius.to_bits(), segments),
            MeshKind::Cuboid { size } => {
                Self::Cuboid([size.x.to_bits(), size.y.to_bits(), size.z.to_bits()])
            }
            MeshKind::Plane { width, height } => Self::Plane(width.to_bits(), height.to_bits()),
            MeshKind::Model(id) => Self::Model(id),
        }
    }
}

/// CPU geometry for a procedural mesh kind; `None` for models.
pub fn procedural_mesh(kind: &MeshKind) -> Option<MeshData> {
    match *kind {
        MeshKind::Sphere { radius, segments } => Some(MeshData::sphere(radius, segments, segments)),
        MeshKind::Cuboid { size } => Some(MeshData::cuboid(size)),
        MeshKind::Plane { width, height } => Some(MeshData::plane(width, height)),
        MeshKind::Model(_) => None,
    }
}

/// GPU-side representation of a mesh.
pub struct GpuMesh {
    /// Vertex buffer on GPU.
    pub vertex_buffer: wgpu::Buffer,
    /// Index buffer on GPU.
    pub index_buffer: wgpu::Buffer,
    /// Number of indices to draw.
    pub index_count: u32,
}

impl GpuMesh {
    /// Upload a mesh to the GPU.
    pub fn upload(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        let vertices = MeshVertex::interleave(mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn interleave_fills_missing_attributes() {
        let mut mesh = MeshData::plane(1.0, 1.0);
        mesh.uvs.clear();
        let vertices = MeshVertex::interleave(&mesh);
        assert_eq!(vertices.len(), 4);
        assert!(vertices.iter().all(|v| v.uv == [0.0, 0.0] && v.normal == [0.0, 0.0, 1.0]));
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
    }

    #[test]
    fn equal_shapes_share_a_key() {
        let a = MeshKey::of(&MeshKind::Cuboid { size: Vec3::ONE });
        let b = MeshKey::of(&MeshKind::Cuboid { size: Vec3::ONE });
        let c = MeshKey::of(&MeshKind::Cuboid { size: Vec3::splat(2.0) });
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(procedural_mesh(&MeshKind::Model(ModelId(0))).is_none());
    }
}
