//! Fountain particle rendering.

use anyhow::Result;
use folio3d_fx::Fountain;
use glam::{Mat4, Vec4};

use crate::pipeline::{RenderContext, DEPTH_FORMAT};

/// Colour of fountain particles.
pub const PARTICLE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.85];

/// GPU vertex for a single particle point.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// RGBA colour.
    pub color: [f32; 4],
}

/// World-space vertices for a fountain attached to a parent with `parent_world`.
pub fn fountain_vertices(fountain: &Fountain, parent_world: Mat4, color: Vec4) -> Vec<ParticleVertex> {
    fountain
        .particles()
        .iter()
        .map(|p| ParticleVertex {
            position: parent_world.transform_point3(p.position).to_array(),
            color: color.to_array(),
        })
        .collect()
}

/// Point-list pipeline for particles.
pub struct ParticlePipeline {
    render_pipeline: wgpu::RenderPipeline,
}

impl ParticlePipeline {
    /// Create the particle render pipeline; it shares `group(0)` with the scene.
    pub fn new(ctx: &RenderContext, globals_layout: &wgpu::BindGroupLayout) -> Result<Self> {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/particles.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[globals_layout],
            push_constant_ranges: &[],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4],
        };

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Render Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        Ok(Self { render_pipeline })
    }

    /// Access the underlying `wgpu::RenderPipeline` for particles.
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.render_pipeline
    }
}

/// Default particle colour as a vector.
pub fn particle_color() -> Vec4 {
    Vec4::from_array(PARTICLE_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio3d_core::ObjectId;
    use folio3d_fx::FountainConfig;
    use glam::Vec3;

    #[test]
    fn vertices_follow_parent_transform() {
        let fountain = Fountain::new(ObjectId(0), FountainConfig::default(), 5);
        let offset = Vec3::new(10.0, 0.0, -2.0);
        let vertices = fountain_vertices(&fountain, Mat4::from_translation(offset), particle_color());
        assert_eq!(vertices.len(), fountain.particles().len());
        for (v, p) in vertices.iter().zip(fountain.particles()) {
            assert!(Vec3::from(v.position).abs_diff_eq(p.position + offset, 1e-5));
            assert_eq!(v.color, PARTICLE_COLOR);
        }
    }
}
