//! Headless GPU rendering with wgpu.
//!
//! Mirrors the software renderer: the same geometry and coloring formulas
//! in WGSL, followed by bloom and chromatic aberration passes. Nothing here
//! runs simulation work.

pub mod context;
pub mod layouts;
pub mod pipelines;
pub mod postprocess;
pub mod scene_renderer;
pub mod textures;

pub use context::{GpuContext, GpuError};
pub use postprocess::PostProcessPipeline;
pub use scene_renderer::GpuSceneRenderer;
