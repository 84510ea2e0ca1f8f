//! Scene composition and lifecycle.
//!
//! This module provides:
//! - Mesh, camera and idle-motion primitives
//! - [`FrameLoop`], the per-frame callback registry
//! - [`SceneOrchestrator`], which owns the particle field and drives one
//!   simulate/shade/composite cycle per tick

pub mod camera;
pub mod frame_loop;
pub mod mesh;
pub mod orchestrator;
pub mod transform;

pub use camera::{Camera, ScreenPoint, Viewport};
pub use frame_loop::{FrameClock, FrameLoop, FrameTick, SubscriptionId};
pub use mesh::{Mesh, MeshVertex};
pub use orchestrator::{SceneHandle, SceneOrchestrator, SceneState, SceneStats, TickOutcome};
pub use transform::MeshTransform;

use crate::config::ConfigError;
use crate::render::RenderError;
use crate::simulation::SimulationError;

/// Errors that stop a scene from being built.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Why a tick was skipped.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Particle buffer already released")]
    Released,
}
