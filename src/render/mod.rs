//! Frame rendering.
//!
//! This module provides:
//! - [`FrameInput`], the read-only view of one frame's scene state
//! - [`FrameRenderer`], implemented by the host rasterizer here and by the
//!   wgpu renderer in [`crate::gpu`]
//! - [`SoftwareRenderer`], which needs no GPU and backs the tests

pub mod software;

pub use software::SoftwareRenderer;

use crate::gpu::GpuError;
use crate::postprocess::Frame;
use crate::scene::{Camera, Mesh, MeshTransform, Viewport};
use crate::shading::{Lighting, PhongMaterial, PointPalette, ShaderUniforms};
use glam::Vec3;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Viewport must be non-empty, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("Readback returned {actual} bytes, expected {expected}")]
    Readback { expected: usize, actual: usize },
}

pub(crate) fn check_viewport(viewport: Viewport) -> Result<(), RenderError> {
    if viewport.is_empty() {
        return Err(RenderError::EmptyViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }
    Ok(())
}

/// Everything a renderer needs for one frame.
///
/// Particle positions are in group space and borrowed from the simulation
/// for this frame only. `lighting` is already in world space.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub uniforms: ShaderUniforms,
    pub camera: &'a Camera,
    pub transform: &'a MeshTransform,
    pub mesh: &'a Mesh,
    pub material: &'a PhongMaterial,
    pub lighting: &'a Lighting,
    pub positions: &'a [Vec3],
    /// Whether `positions` changed since the previous frame.
    pub positions_dirty: bool,
    pub palette: &'a PointPalette,
    pub point_size: f32,
    pub background: Vec3,
}

/// Turns a [`FrameInput`] into a composited frame.
pub trait FrameRenderer {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn viewport(&self) -> Viewport;

    fn resize(&mut self, viewport: Viewport) -> Result<(), RenderError>;

    /// Draw the mesh and particles, then run the post-processing chain.
    fn render(&mut self, input: &FrameInput<'_>) -> Result<Frame, RenderError>;
}
