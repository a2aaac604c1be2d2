#![warn(missing_docs)]
//! wgpu renderer for the scene graph and fountain particles.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use folio3d_camera::Camera;
use folio3d_core::{ObjectId, TextureId};
use folio3d_fx::Fountain;
use folio3d_scene::Scene;
use tracing::{debug, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

mod gpu_mesh;
mod particles;
mod pipeline;
mod uniforms;

pub use gpu_mesh::{procedural_mesh, GpuMesh, MeshKey, MeshVertex};
pub use particles::{fountain_vertices, particle_color, ParticlePipeline, ParticleVertex, PARTICLE_COLOR};
pub use pipeline::{ObjectSlot, RenderContext, ScenePipeline, DEPTH_FORMAT};
pub use uniforms::{GlobalsUniform, ObjectUniform};

/// Everything a frame needs to draw.
#[derive(Clone, Copy)]
pub struct FrameView<'a> {
    /// Scene graph.
    pub scene: &'a Scene,
    /// Viewing camera.
    pub camera: &'a Camera,
    /// Fountains; only visible ones with a visible parent are drawn.
    pub fountains: &'a [Fountain],
}

/// Seam between the frame loop and whatever draws the scene.
pub trait SceneRenderer {
    /// Viewport changed size.
    fn resize(&mut self, size: (u32, u32));
    /// Draw one frame.
    fn render(&mut self, frame: FrameView<'_>) -> Result<()>;
}

/// Renderer that draws nothing; used by headless runs.
#[derive(Debug, Default)]
pub struct NullRenderer {
    /// Frames "rendered" so far.
    pub frames: u64,
    /// Last size passed to `resize`.
    pub size: (u32, u32),
}

impl SceneRenderer for NullRenderer {
    fn resize(&mut self, size: (u32, u32)) {
        self.size = size;
    }

    fn render(&mut self, _frame: FrameView<'_>) -> Result<()> {
        self.frames += 1;
        Ok(())
    }
}

struct DrawItem {
    object: ObjectId,
    mesh: MeshKey,
    texture: Option<TextureId>,
    double_sided: bool,
}

/// Main renderer owning GPU resources.
pub struct Renderer {
    context: RenderContext,
    scene_pipeline: ScenePipeline,
    particle_pipeline: ParticlePipeline,
    meshes: HashMap<MeshKey, GpuMesh>,
    textures: HashMap<TextureId, wgpu::BindGroup>,
    objects: HashMap<ObjectId, ObjectSlot>,
}

impl Renderer {
    /// Initialize GPU resources with a window (async).
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let context = RenderContext::new(window, vsync).await?;
        let scene_pipeline = ScenePipeline::new(&context)?;
        let particle_pipeline = ParticlePipeline::new(&context, scene_pipeline.globals_layout())?;
        tracing::info!(size = ?context.size, "renderer initialized");

        Ok(Self {
            context,
            scene_pipeline,
            particle_pipeline,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            objects: HashMap::new(),
        })
    }

    /// Current backbuffer size.
    pub fn size(&self) -> (u32, u32) {
        self.context.size
    }

    /// Upload whatever the visible objects need and return the draw list,
    /// opaque objects first then translucent ones back to front.
    fn prepare(&mut self, frame: FrameView<'_>) -> Vec<DrawItem> {
        let device = &self.context.device;
        let queue = &self.context.queue;
        let scene = frame.scene;

        let mut opaque = Vec::new();
        let mut translucent = Vec::new();
        for (id, object) in scene.objects() {
            if !scene.is_visible_in_world(id) || object.material.opacity <= 0.0 {
                continue;
            }
            let Some(world) = scene.world_matrix(id) else {
                continue;
            };
            // Collapsed (zero-scale) objects cover no pixels.
            if world.determinant().abs() < 1e-12 {
                continue;
            }

            let key = MeshKey::of(&object.mesh);
            if !self.meshes.contains_key(&key) {
                let mesh = match object.mesh {
                    folio3d_scene::MeshKind::Model(model) => scene.model(model).cloned(),
                    ref kind => procedural_mesh(kind),
                };
                let Some(mesh) = mesh else {
                    warn!(?id, "object references a missing model");
                    continue;
                };
                debug!(?key, triangles = mesh.triangle_count(), "uploading mesh");
                self.meshes.insert(key, GpuMesh::upload(device, &mesh, "Scene Mesh"));
            }

            if let Some(texture) = object.material.texture {
                if !self.textures.contains_key(&texture) {
                    if let Some(image) = scene.textures().get(texture) {
                        let label = scene.textures().label(texture).unwrap_or("texture");
                        let bind_group = self.scene_pipeline.create_texture(device, queue, image, label);
                        self.textures.insert(texture, bind_group);
                    }
                }
            }

            let slot = self
                .objects
                .entry(id)
                .or_insert_with(|| self.scene_pipeline.create_object_slot(device));
            slot.write(queue, &ObjectUniform::new(world, &object.material));

            let item = DrawItem {
                object: id,
                mesh: key,
                texture: object.material.texture,
                double_sided: object.material.double_sided,
            };
            if object.material.opacity < 1.0 {
                let distance = world.w_axis.truncate().distance_squared(frame.camera.position);
                translucent.push((distance, item));
            } else {
                opaque.push(item);
            }
        }

        translucent.sort_by(|a, b| b.0.total_cmp(&a.0));
        opaque.extend(translucent.into_iter().map(|(_, item)| item));
        opaque
    }

    fn particle_buffer(&self, frame: FrameView<'_>) -> Option<(wgpu::Buffer, u32)> {
        let color = particle_color();
        let vertices: Vec<ParticleVertex> = frame
            .fountains
            .iter()
            .filter(|f| f.visible && frame.scene.is_visible_in_world(f.parent))
            .filter_map(|f| {
                let world = frame.scene.world_matrix(f.parent)?;
                Some(fountain_vertices(f, world, color))
            })
            .flatten()
            .collect();
        if vertices.is_empty() {
            return None;
        }
        let buffer = self
            .context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Particle Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        Some((buffer, vertices.len() as u32))
    }
}

impl SceneRenderer for Renderer {
    fn resize(&mut self, size: (u32, u32)) {
        self.context.resize(size);
    }

    fn render(&mut self, frame: FrameView<'_>) -> Result<()> {
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.context.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timed out, skipping frame");
                return Ok(());
            }
            Err(err) => return Err(err).context("Failed to acquire surface texture"),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.scene_pipeline.update_globals(
            &self.context.queue,
            &GlobalsUniform::new(frame.camera, &frame.scene.lights),
        );
        let draws = self.prepare(frame);
        let particles = self.particle_buffer(frame);

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        {
            let bg = frame.scene.background;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.x as f64,
                            g: bg.y as f64,
                            b: bg.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.context.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, self.scene_pipeline.globals_bind_group(), &[]);
            for item in &draws {
                let (Some(mesh), Some(slot)) =
                    (self.meshes.get(&item.mesh), self.objects.get(&item.object))
                else {
                    continue;
                };
                let texture = item
                    .texture
                    .and_then(|t| self.textures.get(&t))
                    .unwrap_or_else(|| self.scene_pipeline.default_texture());
                pass.set_pipeline(self.scene_pipeline.pipeline(item.double_sided));
                pass.set_bind_group(1, slot.bind_group(), &[]);
                pass.set_bind_group(2, texture, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if let Some((buffer, count)) = particles.as_ref() {
                pass.set_pipeline(self.particle_pipeline.pipeline());
                pass.set_bind_group(0, self.scene_pipeline.globals_bind_group(), &[]);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..*count, 0..1);
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_renderer_counts_frames() {
        let scene = Scene::new();
        let camera = Camera::default();
        let mut renderer = NullRenderer::default();
        renderer.resize((640, 480));
        for _ in 0..3 {
            renderer
                .render(FrameView {
                    scene: &scene,
                    camera: &camera,
                    fountains: &[],
                })
                .unwrap();
        }
        assert_eq!(renderer.frames, 3);
        assert_eq!(renderer.size, (640, 480));
    }
}
