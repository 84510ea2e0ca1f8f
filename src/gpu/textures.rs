//! Offscreen targets and host readback.

use super::context::GpuError;
use super::pipelines::TARGET_FORMAT;
use crate::postprocess::{frame, Frame};
use crate::render::RenderError;
use crate::scene::Viewport;
use wgpu::{Device, Texture, TextureUsages, TextureView};

fn extent(viewport: Viewport) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: viewport.width,
        height: viewport.height,
        depth_or_array_layers: 1,
    }
}

/// A viewport-sized texture that passes draw into, sample from and copy out
/// of.
pub struct RenderTarget {
    texture: Texture,
    view: TextureView,
}

impl RenderTarget {
    pub fn new(device: &Device, label: &str, viewport: Viewport) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(viewport),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: TextureUsages::RENDER_ATTACHMENT
                | TextureUsages::TEXTURE_BINDING
                | TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        Self { texture, view }
    }

    pub fn view(&self) -> &TextureView {
        &self.view
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }
}

/// Rows are padded to [`wgpu::COPY_BYTES_PER_ROW_ALIGNMENT`] on the GPU side.
fn padded_row_bytes(width: u32) -> u32 {
    (width * 4).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}

/// Staging buffer that brings a finished target back as a [`Frame`].
pub struct ReadbackBuffer {
    buffer: wgpu::Buffer,
    viewport: Viewport,
}

impl ReadbackBuffer {
    pub fn new(device: &Device, viewport: Viewport) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_readback"),
            size: padded_row_bytes(viewport.width) as u64 * viewport.height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self { buffer, viewport }
    }

    /// Record a copy of `target` into the staging buffer.
    pub fn copy_from(&self, encoder: &mut wgpu::CommandEncoder, target: &RenderTarget) {
        encoder.copy_texture_to_buffer(
            target.texture().as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes(self.viewport.width)),
                    rows_per_image: Some(self.viewport.height),
                },
            },
            extent(self.viewport),
        );
    }

    /// Block until the copy lands and return it without row padding.
    pub fn read_rgba8(&self, device: &Device) -> Result<Vec<u8>, GpuError> {
        let slice = self.buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device.poll(wgpu::PollType::wait_indefinitely())?;
        receiver.recv().map_err(|_| GpuError::ReadbackDropped)??;

        let row_bytes = (self.viewport.width * 4) as usize;
        let mapped = slice.get_mapped_range();
        let pixels: Vec<u8> = mapped
            .chunks(padded_row_bytes(self.viewport.width) as usize)
            .take(self.viewport.height as usize)
            .flat_map(|row| &row[..row_bytes])
            .copied()
            .collect();
        drop(mapped);
        self.buffer.unmap();
        Ok(pixels)
    }

    /// [`Self::read_rgba8`], expanded to a float frame.
    pub fn read_frame(&self, device: &Device) -> Result<Frame, RenderError> {
        let pixels = self.read_rgba8(device)?;
        let actual = pixels.len();
        let (width, height) = (self.viewport.width, self.viewport.height);
        frame::from_rgba8(width, height, pixels).ok_or(RenderError::Readback {
            expected: (width * height * 4) as usize,
            actual,
        })
    }
}
