//! Render pipelines for the three kinds of draw the renderer issues.

use super::layouts::{create_layout, Binding};
use crate::scene::MeshVertex;
use glam::Vec3;
use wgpu::{
    BindGroupLayout, Device, PipelineLayout, RenderPipeline, ShaderModule, ShaderStages,
    TextureFormat, VertexBufferLayout,
};

/// Every target in the chain is 8-bit RGBA.
pub const TARGET_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// `dst.rgb += src.rgb * src.a`, destination alpha untouched.
pub const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Zero,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const PARTICLE_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    /// Indexed [`MeshVertex`] triangles, back faces culled, opaque.
    Mesh,
    /// One instanced quad per particle position, additive.
    Particles,
    /// Buffer-free triangle covering the target, opaque.
    Fullscreen { fragment_entry: &'static str },
}

impl DrawKind {
    fn vertex_buffers(self) -> Vec<VertexBufferLayout<'static>> {
        match self {
            Self::Mesh => vec![VertexBufferLayout {
                array_stride: std::mem::size_of::<MeshVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &MESH_ATTRIBUTES,
            }],
            Self::Particles => vec![VertexBufferLayout {
                array_stride: std::mem::size_of::<Vec3>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &PARTICLE_ATTRIBUTES,
            }],
            Self::Fullscreen { .. } => Vec::new(),
        }
    }

    fn fragment_entry(self) -> &'static str {
        match self {
            Self::Fullscreen { fragment_entry } => fragment_entry,
            Self::Mesh | Self::Particles => "fs_main",
        }
    }

    fn blend(self) -> wgpu::BlendState {
        match self {
            Self::Particles => ADDITIVE_BLEND,
            Self::Mesh | Self::Fullscreen { .. } => wgpu::BlendState::REPLACE,
        }
    }

    fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            Self::Mesh => Some(wgpu::Face::Back),
            Self::Particles | Self::Fullscreen { .. } => None,
        }
    }
}

/// A pipeline together with the layout of its single bind group.
pub struct Pass {
    pub pipeline: RenderPipeline,
    pub layout: BindGroupLayout,
}

impl Pass {
    /// Compile `kind` from `shader` with group 0 laid out as `bindings`.
    pub fn new(
        device: &Device,
        label: &str,
        shader: &ShaderModule,
        kind: DrawKind,
        visibility: ShaderStages,
        bindings: &[Binding],
    ) -> Self {
        let layout = create_layout(device, &format!("{label}_bind_group_layout"), visibility, bindings);
        let pipeline_layout = create_pipeline_layout(device, &format!("{label}_pipeline_layout"), &layout);
        let pipeline = create_render_pipeline(device, label, shader, &pipeline_layout, kind);
        Self { pipeline, layout }
    }
}

fn create_pipeline_layout(device: &Device, label: &str, layout: &BindGroupLayout) -> PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        immediate_size: 0,
    })
}

fn create_render_pipeline(
    device: &Device,
    label: &str,
    shader: &ShaderModule,
    layout: &PipelineLayout,
    kind: DrawKind,
) -> RenderPipeline {
    let buffers = kind.vertex_buffers();
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(kind.fragment_entry()),
            targets: &[Some(wgpu::ColorTargetState {
                format: TARGET_FORMAT,
                blend: Some(kind.blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: kind.cull_mode(),
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

pub fn create_shader(device: &Device, label: &str, source: &str) -> ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}
