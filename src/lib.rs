//! Prismfield core
//!
//! The animated backdrop of a portfolio hero section: a noise-driven
//! particle field and a breathing polyhedron, shaded in two stages and
//! finished with bloom and chromatic aberration.
//!
//! # Features
//!
//! - Seeded Perlin noise and a staged, transactional particle step
//! - Pure geometry/coloring stages shared by the host and WGSL shaders
//! - Host compositor (bloom, chromatic aberration) over float frames
//! - Scene lifecycle with per-frame error isolation and idempotent teardown
//! - Software and wgpu renderers behind one trait
//! - Offline PNG sequence rendering

pub mod config;
pub mod gpu;
pub mod noise;
pub mod pipeline;
pub mod postprocess;
pub mod render;
pub mod scene;
pub mod shading;
pub mod simulation;

// Re-export commonly used types
pub use config::{parse_hex_color, ColorValue, ConfigError, SceneConfig};
pub use gpu::{GpuContext, GpuError, GpuSceneRenderer};
pub use noise::NoiseField;
pub use pipeline::{
    create_renderer, render_sequence, render_sequence_blocking, render_still, PipelineError,
    RenderBackend, SequenceConfig, SequenceSummary,
};
pub use postprocess::{AberrationSettings, BloomSettings, Compositor, Frame, PostProcessConfig};
pub use render::{FrameInput, FrameRenderer, RenderError, SoftwareRenderer};
pub use scene::{
    Camera, FrameClock, FrameLoop, FrameTick, Mesh, MeshTransform, SceneError, SceneHandle,
    SceneOrchestrator, SceneState, TickOutcome, Viewport,
};
pub use shading::{color_breathing, coloring_stage, geometry_stage, PointPalette, ShaderUniforms};
pub use simulation::{initialize, step, ParticleBuffer, ParticleField, SimulationError, StepParams};
