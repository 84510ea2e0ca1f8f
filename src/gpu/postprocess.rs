//! GPU bloom and chromatic aberration.
//!
//! Passes, each a full-screen triangle:
//! 1. Extract bright areas of the scene into `glow_a`
//! 2. Blur `glow_a` horizontally into `glow_b`, vertically back into
//!    `glow_a`, `blur_passes` times
//! 3. Composite scene + glow
//! 4. Aberration over the result of 3 (or the raw scene if bloom is off)

use super::layouts::{create_bind_group, Binding, BLOOM_BINDINGS, SOURCE_BINDINGS};
use super::pipelines::{create_shader, DrawKind, Pass};
use super::textures::RenderTarget;
use crate::postprocess::PostProcessConfig;
use crate::scene::Viewport;
use wgpu::{
    BindingResource, Buffer, Device, Queue, RenderPipeline, Sampler, ShaderModule, ShaderStages,
    TextureView,
};

const BLUR: &str = concat!(include_str!("shaders/fullscreen.wgsl"), include_str!("shaders/blur.wgsl"));
const BLOOM: &str = concat!(include_str!("shaders/fullscreen.wgsl"), include_str!("shaders/bloom.wgsl"));
const ABERRATION: &str = concat!(
    include_str!("shaders/fullscreen.wgsl"),
    include_str!("shaders/aberration.wgsl")
);

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurUniforms {
    direction: [f32; 2],
    texel_size: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BloomUniforms {
    threshold: f32,
    smoothing: f32,
    intensity: f32,
    _padding: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct AberrationUniforms {
    offset: [f32; 2],
    _padding: [f32; 2],
}

/// Ping-pong targets for the glow plus the bloom output fed to aberration.
struct Targets {
    glow_a: RenderTarget,
    glow_b: RenderTarget,
    composite: RenderTarget,
}

impl Targets {
    fn new(device: &Device, viewport: Viewport) -> Self {
        Self {
            glow_a: RenderTarget::new(device, "glow_a", viewport),
            glow_b: RenderTarget::new(device, "glow_b", viewport),
            composite: RenderTarget::new(device, "bloom_composite", viewport),
        }
    }
}

pub struct PostProcessPipeline {
    blur: Pass,
    extract: Pass,
    composite: Pass,
    aberration: Pass,
    targets: Targets,

    // One buffer per blur direction; queue writes all land before the
    // encoder runs, so a shared buffer would end up with only the last one.
    blur_horizontal: Buffer,
    blur_vertical: Buffer,
    bloom_uniforms: Buffer,
    aberration_uniforms: Buffer,

    sampler: Sampler,
    config: PostProcessConfig,
    viewport: Viewport,
}

impl PostProcessPipeline {
    pub fn new(device: &Device, queue: &Queue, config: PostProcessConfig, viewport: Viewport) -> Self {
        let blur_shader = create_shader(device, "blur_shader", BLUR);
        let bloom_shader = create_shader(device, "bloom_shader", BLOOM);
        let aberration_shader = create_shader(device, "aberration_shader", ABERRATION);

        let fullscreen = |label: &str, shader: &ShaderModule, fragment_entry: &'static str, bindings: &[Binding]| {
            Pass::new(
                device,
                label,
                shader,
                DrawKind::Fullscreen { fragment_entry },
                ShaderStages::FRAGMENT,
                bindings,
            )
        };
        let blur = fullscreen("blur", &blur_shader, "fs_main", SOURCE_BINDINGS);
        let extract = fullscreen("bloom_extract", &bloom_shader, "fs_extract", BLOOM_BINDINGS);
        let composite = fullscreen("bloom_composite", &bloom_shader, "fs_composite", BLOOM_BINDINGS);
        let aberration = fullscreen("aberration", &aberration_shader, "fs_main", SOURCE_BINDINGS);

        let uniform_buffer = |label: &str, size: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("postprocess_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let pipeline = Self {
            blur,
            extract,
            composite,
            aberration,
            targets: Targets::new(device, viewport),
            blur_horizontal: uniform_buffer("blur_horizontal", std::mem::size_of::<BlurUniforms>()),
            blur_vertical: uniform_buffer("blur_vertical", std::mem::size_of::<BlurUniforms>()),
            bloom_uniforms: uniform_buffer("bloom_uniforms", std::mem::size_of::<BloomUniforms>()),
            aberration_uniforms: uniform_buffer(
                "aberration_uniforms",
                std::mem::size_of::<AberrationUniforms>(),
            ),
            sampler,
            config,
            viewport,
        };
        pipeline.write_uniforms(queue);
        pipeline
    }

    fn write_uniforms(&self, queue: &Queue) {
        let texel_size = [
            1.0 / self.viewport.width as f32,
            1.0 / self.viewport.height as f32,
        ];
        for (buffer, direction) in [
            (&self.blur_horizontal, [1.0, 0.0]),
            (&self.blur_vertical, [0.0, 1.0]),
        ] {
            queue.write_buffer(
                buffer,
                0,
                bytemuck::bytes_of(&BlurUniforms {
                    direction,
                    texel_size,
                }),
            );
        }

        let bloom = &self.config.bloom;
        let bloom = BloomUniforms {
            threshold: bloom.threshold,
            smoothing: bloom.smoothing,
            intensity: bloom.intensity,
            _padding: 0.0,
        };
        queue.write_buffer(&self.bloom_uniforms, 0, bytemuck::bytes_of(&bloom));

        let aberration = AberrationUniforms {
            offset: self.config.aberration.offset.to_array(),
            _padding: [0.0; 2],
        };
        queue.write_buffer(&self.aberration_uniforms, 0, bytemuck::bytes_of(&aberration));
    }

    /// Recreate the intermediate targets for a new output size.
    pub fn resize(&mut self, device: &Device, queue: &Queue, viewport: Viewport) {
        self.viewport = viewport;
        self.targets = Targets::new(device, viewport);
        self.write_uniforms(queue);
    }

    pub fn config(&self) -> &PostProcessConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.config.is_active()
    }

    /// Record every enabled pass, reading `scene` and writing `output`.
    /// Does nothing when no effect is enabled.
    pub fn apply(
        &self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        scene: &TextureView,
        output: &TextureView,
    ) {
        let bloom = self.config.bloom.enabled;
        let aberration = self.config.aberration.enabled;
        let targets = &self.targets;

        if bloom {
            let glow_a = targets.glow_a.view();
            let glow_b = targets.glow_b.view();

            self.bloom_pass(device, encoder, &self.extract, scene, scene, glow_a);
            for _ in 0..self.config.bloom.blur_passes {
                self.source_pass(device, encoder, &self.blur, &self.blur_horizontal, glow_a, glow_b);
                self.source_pass(device, encoder, &self.blur, &self.blur_vertical, glow_b, glow_a);
            }
            let bloomed = if aberration { targets.composite.view() } else { output };
            self.bloom_pass(device, encoder, &self.composite, scene, glow_a, bloomed);
        }

        if aberration {
            let source = if bloom { targets.composite.view() } else { scene };
            self.source_pass(device, encoder, &self.aberration, &self.aberration_uniforms, source, output);
        }
    }

    /// Bloom extract/composite: uniforms, scene, glow, sampler.
    fn bloom_pass(
        &self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        pass: &Pass,
        scene: &TextureView,
        glow: &TextureView,
        output: &TextureView,
    ) {
        let bind_group = create_bind_group(
            device,
            "bloom_bind_group",
            &pass.layout,
            &[
                self.bloom_uniforms.as_entire_binding(),
                BindingResource::TextureView(scene),
                BindingResource::TextureView(glow),
                BindingResource::Sampler(&self.sampler),
            ],
        );
        draw_fullscreen(encoder, &pass.pipeline, &bind_group, output);
    }

    /// Blur/aberration: uniforms, source, sampler.
    fn source_pass(
        &self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        pass: &Pass,
        uniforms: &Buffer,
        source: &TextureView,
        output: &TextureView,
    ) {
        let bind_group = create_bind_group(
            device,
            "source_bind_group",
            &pass.layout,
            &[
                uniforms.as_entire_binding(),
                BindingResource::TextureView(source),
                BindingResource::Sampler(&self.sampler),
            ],
        );
        draw_fullscreen(encoder, &pass.pipeline, &bind_group, output);
    }
}

fn draw_fullscreen(
    encoder: &mut wgpu::CommandEncoder,
    pipeline: &RenderPipeline,
    bind_group: &wgpu::BindGroup,
    output: &TextureView,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("postprocess_pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: output,
            resolve_target: None,
            depth_slice: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });

    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::GpuContext;

    #[test]
    fn test_uniform_blocks_are_vec4_aligned() {
        assert_eq!(std::mem::size_of::<BlurUniforms>(), 16);
        assert_eq!(std::mem::size_of::<BloomUniforms>(), 16);
        assert_eq!(std::mem::size_of::<AberrationUniforms>(), 16);
    }

    #[tokio::test]
    async fn test_postprocess_pipeline_creation() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => {
                eprintln!("Skipping test - GPU not available");
                return;
            }
        };

        let mut pipeline =
            PostProcessPipeline::new(&ctx.device, &ctx.queue, PostProcessConfig::default(), Viewport::new(64, 32));
        assert!(pipeline.is_active());
        pipeline.resize(&ctx.device, &ctx.queue, Viewport::new(32, 32));
    }
}
