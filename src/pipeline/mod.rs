//! Offline rendering of a scene to a numbered PNG sequence.

use crate::config::SceneConfig;
use crate::gpu::GpuSceneRenderer;
use crate::postprocess::{frame, PostProcessConfig};
use crate::render::{FrameRenderer, RenderError, SoftwareRenderer};
use crate::scene::{FrameClock, FrameLoop, SceneError, SceneOrchestrator, TickOutcome, Viewport};
use std::path::{Path, PathBuf};

/// Which renderer draws the frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderBackend {
    #[default]
    Software,
    /// wgpu; falls back to software when no adapter is available.
    Gpu,
}

impl RenderBackend {
    pub fn from_str(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "software" | "cpu" => Some(Self::Software),
            "gpu" | "wgpu" => Some(Self::Gpu),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Software => "software",
            Self::Gpu => "gpu",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SequenceConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub frames: u32,
    pub backend: RenderBackend,
    /// File names are `{prefix}_{index:05}.png`.
    pub file_prefix: String,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
            fps: 30,
            frames: 90,
            backend: RenderBackend::Software,
            file_prefix: "frame".to_string(),
        }
    }
}

impl SequenceConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    pub fn frame_path(&self, dir: &Path, index: u32) -> PathBuf {
        dir.join(format!("{}_{:05}.png", self.file_prefix, index))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),
}

/// What [`render_sequence`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSummary {
    pub frames_written: u32,
    pub frames_skipped: u32,
    pub backend: RenderBackend,
    pub seed: u64,
    pub files: Vec<PathBuf>,
}

/// Build the renderer for `backend`.
///
/// A GPU request without a usable adapter logs a warning and returns the
/// software renderer.
pub async fn create_renderer(
    backend: RenderBackend,
    viewport: Viewport,
    post: PostProcessConfig,
) -> Result<(Box<dyn FrameRenderer>, RenderBackend), RenderError> {
    match backend {
        RenderBackend::Software => Ok((Box::new(SoftwareRenderer::new(viewport, post)?), RenderBackend::Software)),
        RenderBackend::Gpu => match GpuSceneRenderer::new(viewport, post).await {
            Ok(renderer) => {
                log::info!("Rendering on GPU: {}", renderer.adapter_info().name);
                Ok((Box::new(renderer), RenderBackend::Gpu))
            }
            Err(RenderError::Gpu(err)) => {
                log::warn!("GPU renderer unavailable ({err}), falling back to software");
                Ok((Box::new(SoftwareRenderer::new(viewport, post)?), RenderBackend::Software))
            }
            Err(err) => Err(err),
        },
    }
}

/// Render `sequence.frames` frames at a fixed rate into `output_dir`.
///
/// Frames whose tick is skipped are not written. `progress_callback`
/// receives the completed fraction after every frame.
pub async fn render_sequence<P: AsRef<Path>>(
    scene_config: SceneConfig,
    sequence: &SequenceConfig,
    output_dir: P,
    progress_callback: Option<Box<dyn Fn(f32) + Send>>,
) -> Result<SequenceSummary, PipelineError> {
    if sequence.fps == 0 || sequence.frames == 0 {
        return Err(PipelineError::InvalidSequence(format!(
            "need at least one frame at a positive rate, got {} frames at {} fps",
            sequence.frames, sequence.fps
        )));
    }

    let output_dir = output_dir.as_ref();
    std::fs::create_dir_all(output_dir)?;

    let (renderer, backend) =
        create_renderer(sequence.backend, sequence.viewport(), scene_config.post_process()).await?;
    let scene = SceneOrchestrator::new(scene_config, renderer)?;
    let seed = scene.seed();

    log::info!(
        "Rendering {} frames at {} fps to {}",
        sequence.frames,
        sequence.fps,
        output_dir.display()
    );

    let mut frame_loop = FrameLoop::new(FrameClock::fixed(sequence.fps as f32));
    let mut handle = scene.attach(&mut frame_loop);

    let mut files = Vec::new();
    let mut skipped = 0;
    for index in 0..sequence.frames {
        let before = handle.scene().stats().frames_rendered;
        frame_loop.advance();

        let scene = handle.scene();
        if scene.stats().frames_rendered > before {
            if let Some(frame) = scene.latest_frame() {
                let path = sequence.frame_path(output_dir, index);
                frame::to_rgba8(frame).save(&path)?;
                files.push(path);
            }
        } else {
            skipped += 1;
        }
        drop(scene);

        if let Some(ref callback) = progress_callback {
            callback((index + 1) as f32 / sequence.frames as f32);
        }
    }

    handle.dispose(&mut frame_loop);

    Ok(SequenceSummary {
        frames_written: files.len() as u32,
        frames_skipped: skipped,
        backend,
        seed,
        files,
    })
}

/// [`render_sequence`] for callers without an async runtime.
pub fn render_sequence_blocking<P: AsRef<Path>>(
    scene_config: SceneConfig,
    sequence: &SequenceConfig,
    output_dir: P,
    progress_callback: Option<Box<dyn Fn(f32) + Send>>,
) -> Result<SequenceSummary, PipelineError> {
    pollster::block_on(render_sequence(scene_config, sequence, output_dir, progress_callback))
}

/// Render a single frame at elapsed time `t` with the software renderer.
pub fn render_still(config: SceneConfig, viewport: Viewport, t: f32) -> Result<image::RgbaImage, PipelineError> {
    let mut scene = SceneOrchestrator::with_software_renderer(config, viewport)?;
    match scene.tick(t) {
        TickOutcome::Rendered => {}
        outcome => {
            return Err(PipelineError::InvalidSequence(format!(
                "frame at t={t} was not rendered ({outcome:?})"
            )))
        }
    }
    let frame = scene
        .latest_frame()
        .map(frame::to_rgba8)
        .ok_or_else(|| PipelineError::InvalidSequence("no frame produced".to_string()))?;
    scene.dispose();
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names() {
        assert_eq!(RenderBackend::from_str("GPU"), Some(RenderBackend::Gpu));
        assert_eq!(RenderBackend::from_str("cpu"), Some(RenderBackend::Software));
        assert_eq!(RenderBackend::from_str("metal"), None);
        assert_eq!(RenderBackend::Gpu.name(), "gpu");
    }

    #[test]
    fn test_sequence_defaults_and_paths() {
        let sequence = SequenceConfig::default();
        assert_eq!(sequence.fps, 30);
        assert_eq!(
            sequence.frame_path(Path::new("out"), 7),
            PathBuf::from("out/frame_00007.png")
        );
    }

    #[test]
    fn test_render_still() {
        let config = SceneConfig {
            particle_count: 32,
            seed: Some(1),
            ..Default::default()
        };
        let image = render_still(config, Viewport::new(24, 16), 0.5).unwrap();
        assert_eq!(image.dimensions(), (24, 16));
    }

    #[test]
    fn test_blocking_sequence() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = SceneConfig {
            particle_count: 16,
            seed: Some(3),
            ..Default::default()
        };
        let sequence = SequenceConfig {
            width: 16,
            height: 16,
            frames: 2,
            ..Default::default()
        };

        let summary = render_sequence_blocking(config, &sequence, dir.path(), None).unwrap();
        assert_eq!(summary.frames_written, 2);
        assert!(summary.files.iter().all(|path| path.exists()));
    }
}
