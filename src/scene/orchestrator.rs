//! The scene lifecycle: build, tick, dispose.

use super::{
    Camera, FrameLoop, FrameTick, Mesh, MeshTransform, SceneError, SubscriptionId, TickError,
    Viewport,
};
use crate::config::SceneConfig;
use crate::postprocess::Frame;
use crate::render::{FrameInput, FrameRenderer, RenderError, SoftwareRenderer};
use crate::shading::{Lighting, PhongMaterial, PointPalette, ShaderUniforms};
use crate::simulation::ParticleField;
use glam::Vec3;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// Lifecycle of a scene. Construction goes straight to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    Running,
    Disposed,
}

/// What a call to [`SceneOrchestrator::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new frame was produced.
    Rendered,
    /// The frame failed; the previous frame is still current.
    Skipped,
    /// The scene is disposed; nothing ran.
    Disposed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneStats {
    pub frames_rendered: u64,
    pub frames_skipped: u64,
    /// Elapsed time of the last rendered frame.
    pub last_elapsed: Option<f32>,
    pub last_skip_reason: Option<String>,
}

/// Owns everything the hero animation needs and advances it once per tick.
pub struct SceneOrchestrator {
    state: SceneState,
    config: SceneConfig,
    seed: u64,
    field: Option<ParticleField>,
    mesh: Mesh,
    material: PhongMaterial,
    lighting: Lighting,
    camera: Camera,
    palette: PointPalette,
    background: Vec3,
    transform: MeshTransform,
    uniforms: ShaderUniforms,
    renderer: Box<dyn FrameRenderer>,
    latest_frame: Option<Frame>,
    stats: SceneStats,
}

impl SceneOrchestrator {
    /// Validate `config`, allocate the particles and build the static scene.
    pub fn new(config: SceneConfig, renderer: Box<dyn FrameRenderer>) -> Result<Self, SceneError> {
        config.validate()?;

        let seed = config.resolve_seed();
        let field = ParticleField::seeded(
            config.particle_count as usize,
            config.domain_half_width,
            config.velocity_half_range(),
            seed,
            config.step_params(),
        )?;
        let viewport = renderer.viewport();

        log::info!(
            "Scene ready: {} particles, seed {}, {}x{} via {} renderer",
            field.len(),
            seed,
            viewport.width,
            viewport.height,
            renderer.name()
        );

        Ok(Self {
            state: SceneState::Running,
            seed,
            field: Some(field),
            mesh: Mesh::prism(),
            material: PhongMaterial::default(),
            lighting: Lighting::default(),
            camera: Camera::hero(viewport.aspect()),
            palette: config.palette()?,
            background: config.background_rgb()?,
            transform: MeshTransform::default(),
            uniforms: ShaderUniforms::default(),
            renderer,
            latest_frame: None,
            stats: SceneStats::default(),
            config,
        })
    }

    /// Build a scene drawn by the host rasterizer.
    pub fn with_software_renderer(config: SceneConfig, viewport: Viewport) -> Result<Self, SceneError> {
        let renderer = SoftwareRenderer::new(viewport, config.post_process())?;
        Self::new(config, Box::new(renderer))
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.state == SceneState::Disposed
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn transform(&self) -> &MeshTransform {
        &self.transform
    }

    pub fn uniforms(&self) -> &ShaderUniforms {
        &self.uniforms
    }

    pub fn stats(&self) -> &SceneStats {
        &self.stats
    }

    pub fn viewport(&self) -> Viewport {
        self.renderer.viewport()
    }

    /// The particle field, or `None` once disposed.
    pub fn particles(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    /// The most recent successfully rendered frame.
    pub fn latest_frame(&self) -> Option<&Frame> {
        self.latest_frame.as_ref()
    }

    /// Run one frame at elapsed time `elapsed`.
    ///
    /// Failures are logged and counted; they never escape.
    pub fn tick(&mut self, elapsed: f32) -> TickOutcome {
        if self.is_disposed() {
            log::trace!("Tick at {elapsed}s ignored, scene disposed");
            return TickOutcome::Disposed;
        }

        match self.try_tick(elapsed) {
            Ok(()) => {
                self.stats.frames_rendered += 1;
                self.stats.last_elapsed = Some(elapsed);
                TickOutcome::Rendered
            }
            Err(err) => {
                log::warn!("Skipping frame at {elapsed}s: {err}");
                self.stats.frames_skipped += 1;
                self.stats.last_skip_reason = Some(err.to_string());
                TickOutcome::Skipped
            }
        }
    }

    fn try_tick(&mut self, elapsed: f32) -> Result<(), TickError> {
        let field = self.field.as_mut().ok_or(TickError::Released)?;

        let transform = MeshTransform::at(elapsed);
        let positions = field.stage(elapsed)?;
        let uniforms = ShaderUniforms::at(elapsed);
        let lighting = self.lighting.transformed(transform.group_matrix());

        let input = FrameInput {
            uniforms,
            camera: &self.camera,
            transform: &transform,
            mesh: &self.mesh,
            material: &self.material,
            lighting: &lighting,
            positions,
            // A staged frame is always new to the renderer.
            positions_dirty: true,
            palette: &self.palette,
            point_size: self.config.point_size,
            background: self.background,
        };

        match self.renderer.render(&input) {
            Ok(frame) => {
                field.commit();
                // The renderer already drew exactly these positions.
                field.take_dirty();
                self.latest_frame = Some(frame);
                self.transform = transform;
                self.uniforms = uniforms;
                Ok(())
            }
            Err(err) => {
                field.discard();
                Err(err.into())
            }
        }
    }

    /// Follow a viewport change. Ignored once disposed.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        if self.is_disposed() {
            return Ok(());
        }
        self.renderer.resize(viewport)?;
        self.camera.set_aspect(viewport.aspect());
        log::debug!("Scene resized to {}x{}", viewport.width, viewport.height);
        Ok(())
    }

    /// Release the particle buffer and stop ticking.
    ///
    /// Returns `false` if the scene was already disposed; nothing is freed
    /// twice.
    pub fn dispose(&mut self) -> bool {
        if self.is_disposed() {
            log::debug!("Scene already disposed");
            return false;
        }

        let released = self.field.take().map(|field| field.len()).unwrap_or(0);
        self.latest_frame = None;
        self.state = SceneState::Disposed;
        log::debug!("Scene disposed, released {released} particles");
        true
    }

    /// Hand the scene to `frame_loop`, ticking once per frame.
    pub fn attach(self, frame_loop: &mut FrameLoop) -> SceneHandle {
        let scene = Rc::new(RefCell::new(self));
        let target = Rc::clone(&scene);

        let subscription = frame_loop.subscribe(move |tick: FrameTick| match target.try_borrow_mut() {
            Ok(mut scene) => {
                scene.tick(tick.elapsed);
            }
            Err(_) => log::warn!("Scene busy at frame {}, skipping tick", tick.frame),
        });

        SceneHandle {
            scene,
            subscription: Some(subscription),
        }
    }
}

impl std::fmt::Debug for SceneOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneOrchestrator")
            .field("state", &self.state)
            .field("seed", &self.seed)
            .field("renderer", &self.renderer.name())
            .field("particles", &self.field.as_ref().map(ParticleField::len))
            .field("stats", &self.stats)
            .finish()
    }
}

/// A scene attached to a [`FrameLoop`].
pub struct SceneHandle {
    scene: Rc<RefCell<SceneOrchestrator>>,
    subscription: Option<SubscriptionId>,
}

impl SceneHandle {
    /// Borrow the scene. Panics if called from inside its own tick.
    pub fn scene(&self) -> Ref<'_, SceneOrchestrator> {
        self.scene.borrow()
    }

    pub fn scene_mut(&self) -> RefMut<'_, SceneOrchestrator> {
        self.scene.borrow_mut()
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Stop receiving frames and dispose the scene.
    ///
    /// Returns `false` if the scene was already disposed.
    pub fn dispose(&mut self, frame_loop: &mut FrameLoop) -> bool {
        if let Some(id) = self.subscription.take() {
            frame_loop.unsubscribe(id);
        }
        self.scene.borrow_mut().dispose()
    }
}
