//! Bind group layouts and bind groups, numbered by position.
//!
//! Every pass here binds a handful of resources to one group in slot order,
//! so a layout is just a list of [`Binding`] kinds and the matching bind
//! group is the same list of resources.

use wgpu::{BindGroup, BindGroupLayout, BindingResource, Device, ShaderStages};

/// Kind of resource at one binding slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Uniform,
    /// Filterable float 2D texture.
    Texture,
    /// Filtering sampler.
    Sampler,
}

impl Binding {
    fn ty(self) -> wgpu::BindingType {
        match self {
            Self::Uniform => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            Self::Texture => wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            Self::Sampler => wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        }
    }
}

/// Scene draws: one uniform block read by both stages.
pub const SCENE_BINDINGS: &[Binding] = &[Binding::Uniform];

/// Blur and aberration: uniforms, source texture, sampler.
pub const SOURCE_BINDINGS: &[Binding] = &[Binding::Uniform, Binding::Texture, Binding::Sampler];

/// Bloom extract/composite: uniforms, scene, glow, sampler.
pub const BLOOM_BINDINGS: &[Binding] = &[
    Binding::Uniform,
    Binding::Texture,
    Binding::Texture,
    Binding::Sampler,
];

/// Layout with `bindings[i]` at binding `i`.
pub fn create_layout(
    device: &Device,
    label: &str,
    visibility: ShaderStages,
    bindings: &[Binding],
) -> BindGroupLayout {
    let entries: Vec<_> = (0u32..)
        .zip(bindings)
        .map(|(binding, kind)| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: kind.ty(),
            count: None,
        })
        .collect();

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}

/// Bind group with `resources[i]` at binding `i`.
pub fn create_bind_group(
    device: &Device,
    label: &str,
    layout: &BindGroupLayout,
    resources: &[BindingResource<'_>],
) -> BindGroup {
    let entries: Vec<_> = (0u32..)
        .zip(resources)
        .map(|(binding, resource)| wgpu::BindGroupEntry {
            binding,
            resource: resource.clone(),
        })
        .collect();

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &entries,
    })
}
