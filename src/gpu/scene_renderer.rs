//! wgpu implementation of [`FrameRenderer`].
//!
//! Draws the mesh and an instanced quad per particle into an offscreen
//! target, runs [`PostProcessPipeline`], and reads the result back into a
//! host [`Frame`]. Targets are 8-bit, so the composite is clamped to
//! `[0, 1]` between passes, unlike the float software path.

use super::context::GpuContext;
use super::layouts::{create_bind_group, SCENE_BINDINGS};
use super::pipelines::{create_shader, DrawKind, Pass};
use super::postprocess::PostProcessPipeline;
use super::textures::{ReadbackBuffer, RenderTarget};
use crate::postprocess::{Frame, PostProcessConfig};
use crate::render::{check_viewport, FrameInput, FrameRenderer, RenderError};
use crate::scene::{Mesh, Viewport};
use crate::shading::MAX_POINT_LIGHTS;
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, Buffer, ShaderStages};

/// Mirrors `MeshUniforms` in mesh.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct MeshUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    eye_time: [f32; 4],
    albedo: [f32; 4],
    emissive: [f32; 4],
    specular: [f32; 4],
    ambient: [f32; 4],
    light_position: [[f32; 4]; MAX_POINT_LIGHTS],
    light_color: [[f32; 4]; MAX_POINT_LIGHTS],
}

impl MeshUniforms {
    fn new(input: &FrameInput<'_>, view_proj: Mat4) -> Self {
        let material = input.material;
        let lights = &input.lighting.points;
        let count = lights.len().min(MAX_POINT_LIGHTS);

        let mut light_position = [[0.0; 4]; MAX_POINT_LIGHTS];
        let mut light_color = [[0.0; 4]; MAX_POINT_LIGHTS];
        for (i, light) in lights.iter().take(count).enumerate() {
            light_position[i] = light.position.extend(light.intensity).to_array();
            light_color[i] = light.color.extend(1.0).to_array();
        }

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: input.transform.mesh_world_matrix().to_cols_array_2d(),
            eye_time: input.camera.position.extend(input.uniforms.time).to_array(),
            albedo: material.albedo.extend(material.shininess).to_array(),
            emissive: (material.emissive * material.emissive_intensity).extend(0.0).to_array(),
            specular: material.specular.extend(0.0).to_array(),
            ambient: input.lighting.ambient.extend(count as f32).to_array(),
            light_position,
            light_color,
        }
    }
}

/// Mirrors `ParticleUniforms` in particles.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ParticleUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
    glow_color: [f32; 4],
    viewport: [f32; 4],
}

impl ParticleUniforms {
    fn new(input: &FrameInput<'_>, view_proj: Mat4, viewport: Viewport) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: input.transform.group_matrix().to_cols_array_2d(),
            base_color: input.palette.base.extend(input.uniforms.time).to_array(),
            glow_color: input.palette.glow.extend(input.point_size).to_array(),
            viewport: [viewport.width as f32, viewport.height as f32, 0.0, 0.0],
        }
    }
}

struct MeshBuffers {
    source: Mesh,
    vertex: Buffer,
    index: Buffer,
    index_count: u32,
}

struct InstanceBuffer {
    buffer: Buffer,
    capacity: usize,
    count: u32,
}

pub struct GpuSceneRenderer {
    ctx: GpuContext,
    mesh_pass: Pass,
    mesh_uniforms: Buffer,
    mesh_bind_group: BindGroup,
    particle_pass: Pass,
    particle_uniforms: Buffer,
    particle_bind_group: BindGroup,
    mesh: Option<MeshBuffers>,
    instances: Option<InstanceBuffer>,
    scene_target: RenderTarget,
    output_target: RenderTarget,
    readback: ReadbackBuffer,
    postprocess: PostProcessPipeline,
    viewport: Viewport,
}

impl GpuSceneRenderer {
    pub async fn new(viewport: Viewport, post: PostProcessConfig) -> Result<Self, RenderError> {
        check_viewport(viewport)?;
        let ctx = GpuContext::new().await?;
        let device = &ctx.device;

        let mesh_shader = create_shader(device, "mesh_shader", include_str!("shaders/mesh.wgsl"));
        let particle_shader =
            create_shader(device, "particle_shader", include_str!("shaders/particles.wgsl"));
        let stages = ShaderStages::VERTEX_FRAGMENT;
        let mesh_pass = Pass::new(device, "mesh", &mesh_shader, DrawKind::Mesh, stages, SCENE_BINDINGS);
        let particle_pass = Pass::new(
            device,
            "particles",
            &particle_shader,
            DrawKind::Particles,
            stages,
            SCENE_BINDINGS,
        );

        let mesh_uniforms = uniform_buffer(device, "mesh_uniforms", std::mem::size_of::<MeshUniforms>());
        let particle_uniforms =
            uniform_buffer(device, "particle_uniforms", std::mem::size_of::<ParticleUniforms>());
        let mesh_bind_group = create_bind_group(
            device,
            "mesh_bind_group",
            &mesh_pass.layout,
            &[mesh_uniforms.as_entire_binding()],
        );
        let particle_bind_group = create_bind_group(
            device,
            "particle_bind_group",
            &particle_pass.layout,
            &[particle_uniforms.as_entire_binding()],
        );

        let postprocess = PostProcessPipeline::new(device, &ctx.queue, post, viewport);

        Ok(Self {
            mesh_pass,
            mesh_uniforms,
            mesh_bind_group,
            particle_pass,
            particle_uniforms,
            particle_bind_group,
            mesh: None,
            instances: None,
            scene_target: RenderTarget::new(device, "scene_target", viewport),
            output_target: RenderTarget::new(device, "output_target", viewport),
            readback: ReadbackBuffer::new(device, viewport),
            postprocess,
            viewport,
            ctx,
        })
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.ctx.adapter_info()
    }

    fn upload_mesh(&mut self, mesh: &Mesh) {
        if self.mesh.as_ref().is_some_and(|uploaded| &uploaded.source == mesh) {
            return;
        }
        if mesh.indices.is_empty() {
            self.mesh = None;
            return;
        }

        let device = &self.ctx.device;
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        self.mesh = Some(MeshBuffers {
            source: mesh.clone(),
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
        });
    }

    fn upload_particles(&mut self, positions: &[Vec3], dirty: bool) {
        let up_to_date = self
            .instances
            .as_ref()
            .is_some_and(|instances| instances.count as usize == positions.len());
        if up_to_date && !dirty {
            return;
        }
        if positions.is_empty() {
            self.instances = None;
            return;
        }

        let needs_grow = self
            .instances
            .as_ref()
            .map_or(true, |instances| instances.capacity < positions.len());
        if needs_grow {
            let buffer = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("particle_instances"),
                size: std::mem::size_of_val(positions) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.instances = Some(InstanceBuffer {
                buffer,
                capacity: positions.len(),
                count: 0,
            });
        }

        if let Some(instances) = self.instances.as_mut() {
            self.ctx
                .queue
                .write_buffer(&instances.buffer, 0, bytemuck::cast_slice(positions));
            instances.count = positions.len() as u32;
        }
    }
}

fn uniform_buffer(device: &wgpu::Device, label: &'static str, size: usize) -> Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl FrameRenderer for GpuSceneRenderer {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        check_viewport(viewport)?;
        if viewport == self.viewport {
            return Ok(());
        }

        let device = &self.ctx.device;
        self.scene_target = RenderTarget::new(device, "scene_target", viewport);
        self.output_target = RenderTarget::new(device, "output_target", viewport);
        self.readback = ReadbackBuffer::new(device, viewport);
        self.postprocess.resize(device, &self.ctx.queue, viewport);
        self.viewport = viewport;
        Ok(())
    }

    fn render(&mut self, input: &FrameInput<'_>) -> Result<Frame, RenderError> {
        let view_proj = input.camera.view_projection();
        let queue = &self.ctx.queue;
        queue.write_buffer(
            &self.mesh_uniforms,
            0,
            bytemuck::bytes_of(&MeshUniforms::new(input, view_proj)),
        );
        queue.write_buffer(
            &self.particle_uniforms,
            0,
            bytemuck::bytes_of(&ParticleUniforms::new(input, view_proj, self.viewport)),
        );
        self.upload_mesh(input.mesh);
        self.upload_particles(input.positions, input.positions_dirty);

        let device = &self.ctx.device;
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene_encoder"),
        });

        {
            let background = input.background;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.scene_target.view(),
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: background.x as f64,
                            g: background.y as f64,
                            b: background.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(mesh) = &self.mesh {
                pass.set_pipeline(&self.mesh_pass.pipeline);
                pass.set_bind_group(0, &self.mesh_bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex.slice(..));
                pass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if let Some(instances) = &self.instances {
                pass.set_pipeline(&self.particle_pass.pipeline);
                pass.set_bind_group(0, &self.particle_bind_group, &[]);
                pass.set_vertex_buffer(0, instances.buffer.slice(..));
                pass.draw(0..6, 0..instances.count);
            }
        }

        let output = if self.postprocess.is_active() {
            self.postprocess.apply(
                device,
                &mut encoder,
                self.scene_target.view(),
                self.output_target.view(),
            );
            &self.output_target
        } else {
            &self.scene_target
        };

        self.readback.copy_from(&mut encoder, output);
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        self.readback.read_frame(device)
    }
}
