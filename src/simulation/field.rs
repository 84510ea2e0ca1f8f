use super::{advance_into, initialize, ParticleBuffer, SimulationError, StepParams};
use crate::noise::NoiseField;
use glam::Vec3;

/// A particle buffer together with everything needed to advance it.
///
/// The field is the only writer of its buffer. Readers get `&[Vec3]` for
/// the duration of a borrow and use [`ParticleField::take_dirty`] to learn
/// whether the positions changed since they last looked.
///
/// A step can also be split in two: [`ParticleField::stage`] computes the
/// next frame aside, and only [`ParticleField::commit`] makes it current.
/// Until then the committed buffer is untouched.
pub struct ParticleField {
    buffer: ParticleBuffer,
    noise: NoiseField,
    params: StepParams,
    staged: ParticleBuffer,
    has_staged: bool,
    dirty: bool,
    steps: u64,
}

impl ParticleField {
    /// Wrap an existing buffer.
    ///
    /// The buffer starts dirty so the first reader always uploads it.
    pub fn new(
        buffer: ParticleBuffer,
        noise: NoiseField,
        params: StepParams,
    ) -> Result<Self, SimulationError> {
        if buffer.is_empty() {
            return Err(SimulationError::EmptyField);
        }
        params.validate()?;

        let staged = ParticleBuffer {
            positions: Vec::with_capacity(buffer.len()),
            velocities: Vec::with_capacity(buffer.len()),
        };
        Ok(Self {
            buffer,
            noise,
            params,
            staged,
            has_staged: false,
            dirty: true,
            steps: 0,
        })
    }

    /// Allocate `count` particles and a noise field, both from `seed`.
    pub fn seeded(
        count: usize,
        domain_half_width: f32,
        velocity_scale: f32,
        seed: u64,
        params: StepParams,
    ) -> Result<Self, SimulationError> {
        let buffer = initialize(count, domain_half_width, velocity_scale, seed)?;
        Self::new(buffer, NoiseField::new(seed), params)
    }

    /// Advance one frame at elapsed time `t`.
    ///
    /// On error nothing changes, including the dirty flag.
    pub fn step(&mut self, t: f32) -> Result<(), SimulationError> {
        self.stage(t)?;
        self.commit();
        Ok(())
    }

    /// Compute the frame at elapsed time `t` without committing it and
    /// return its positions.
    ///
    /// Replaces any previously staged frame. On error nothing is staged.
    pub fn stage(&mut self, t: f32) -> Result<&[Vec3], SimulationError> {
        self.has_staged = false;
        advance_into(&self.buffer, &self.noise, t, &self.params, &mut self.staged)?;
        self.has_staged = true;
        Ok(&self.staged.positions)
    }

    /// Positions of the staged frame, if one is waiting.
    pub fn staged_positions(&self) -> Option<&[Vec3]> {
        self.has_staged.then_some(self.staged.positions.as_slice())
    }

    /// Make the staged frame current. Returns `false` if nothing was staged.
    pub fn commit(&mut self) -> bool {
        if !self.has_staged {
            return false;
        }
        std::mem::swap(&mut self.buffer, &mut self.staged);
        self.has_staged = false;
        self.dirty = true;
        self.steps += 1;
        true
    }

    /// Drop the staged frame, if any.
    pub fn discard(&mut self) {
        self.has_staged = false;
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.buffer.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.buffer.velocities
    }

    pub fn buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    /// Mutable access for seeding custom layouts. Marks the field dirty and
    /// drops any staged frame.
    pub fn buffer_mut(&mut self) -> &mut ParticleBuffer {
        self.has_staged = false;
        self.dirty = true;
        &mut self.buffer
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    pub fn params(&self) -> &StepParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of successful steps so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return the dirty flag and clear it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn into_buffer(self) -> ParticleBuffer {
        self.buffer
    }
}

impl std::fmt::Debug for ParticleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleField")
            .field("particles", &self.buffer.len())
            .field("seed", &self.noise.seed())
            .field("params", &self.params)
            .field("staged", &self.has_staged)
            .field("dirty", &self.dirty)
            .field("steps", &self.steps)
            .finish()
    }
}
