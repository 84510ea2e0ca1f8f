//! Host-side particle field simulation.
//!
//! This module provides:
//! - Seeded particle allocation ([`initialize`])
//! - The per-frame noise drift + soft boundary bounce ([`step`])
//! - [`ParticleField`], which owns a buffer between frames and tracks
//!   whether it needs to be uploaded again

mod buffer;
mod field;

pub use buffer::ParticleBuffer;
pub use field::ParticleField;

use crate::noise::NoiseField;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Errors raised by the particle simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("Particle count must be at least 1")]
    EmptyField,
    #[error("Invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f32 },
    #[error("Elapsed time is not finite: {0}")]
    InvalidTime(f32),
    #[error("Particle {index} produced a non-finite value on axis {axis}")]
    NonFinite { index: usize, axis: usize },
}

impl SimulationError {
    /// Whether the error only invalidates the current frame.
    ///
    /// Transient errors leave the buffer untouched, so the next frame can
    /// simply try again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::InvalidTime(_) | Self::NonFinite { .. })
    }
}

/// Parameters of a single simulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    /// Scale applied to time and positions before sampling noise.
    pub noise_scale: f32,
    /// Scale applied to each noise sample before it is added to a position.
    pub displacement_scale: f32,
    /// Factor applied (negated) to position and velocity on a bounce.
    pub bounce_damping: f32,
    /// Per-axis half-width beyond which a particle bounces.
    pub boundary: f32,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            noise_scale: 0.1,
            displacement_scale: 0.02,
            bounce_damping: 0.95,
            boundary: 7.0,
        }
    }
}

impl StepParams {
    /// Largest absolute coordinate a particle can hold after a step.
    ///
    /// The bounce scales instead of clamping, so this sits slightly outside
    /// `boundary`.
    pub fn containment_bound(&self) -> f32 {
        self.boundary / self.bounce_damping
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let checks = [
            ("noise scale", self.noise_scale, self.noise_scale.is_finite()),
            (
                "displacement scale",
                self.displacement_scale,
                self.displacement_scale.is_finite(),
            ),
            (
                "bounce damping",
                self.bounce_damping,
                self.bounce_damping > 0.0 && self.bounce_damping <= 1.0,
            ),
            (
                "boundary",
                self.boundary,
                self.boundary.is_finite() && self.boundary > 0.0,
            ),
        ];

        for (name, value, ok) in checks {
            if !ok {
                return Err(SimulationError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Allocate `count` particles from `seed`.
///
/// Positions are uniform in `[-domain_half_width, domain_half_width]^3`,
/// velocities uniform in `[-velocity_scale, velocity_scale]^3`.
pub fn initialize(
    count: usize,
    domain_half_width: f32,
    velocity_scale: f32,
    seed: u64,
) -> Result<ParticleBuffer, SimulationError> {
    if count == 0 {
        return Err(SimulationError::EmptyField);
    }
    if !(domain_half_width.is_finite() && domain_half_width >= 0.0) {
        return Err(SimulationError::InvalidParameter {
            name: "domain half-width",
            value: domain_half_width,
        });
    }
    if !(velocity_scale.is_finite() && velocity_scale >= 0.0) {
        return Err(SimulationError::InvalidParameter {
            name: "velocity scale",
            value: velocity_scale,
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions = Vec::with_capacity(count);
    let mut velocities = Vec::with_capacity(count);

    for _ in 0..count {
        positions.push(random_vec3(&mut rng, domain_half_width));
        velocities.push(random_vec3(&mut rng, velocity_scale));
    }

    Ok(ParticleBuffer {
        positions,
        velocities,
    })
}

fn random_vec3(rng: &mut StdRng, half_range: f32) -> Vec3 {
    if half_range == 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(
        rng.gen_range(-half_range..=half_range),
        rng.gen_range(-half_range..=half_range),
        rng.gen_range(-half_range..=half_range),
    )
}

/// Advance every particle by one frame at elapsed time `t`.
///
/// The update is all-or-nothing: if any particle would end up non-finite the
/// buffer is left exactly as it was and a transient error is returned.
///
/// # Panics
///
/// Panics if the buffer holds a different number of positions and
/// velocities.
pub fn step(
    buffer: &mut ParticleBuffer,
    noise: &NoiseField,
    t: f32,
    params: &StepParams,
) -> Result<(), SimulationError> {
    let mut next = ParticleBuffer::default();
    advance_into(buffer, noise, t, params, &mut next)?;
    *buffer = next;
    Ok(())
}

/// Compute the frame after `current` into `next`, leaving `current` alone.
///
/// `next` is overwritten whole on success; on error its contents are
/// unspecified.
pub(crate) fn advance_into(
    current: &ParticleBuffer,
    noise: &NoiseField,
    t: f32,
    params: &StepParams,
    next: &mut ParticleBuffer,
) -> Result<(), SimulationError> {
    assert_eq!(
        current.positions.len(),
        current.velocities.len(),
        "malformed particle buffer: {} positions but {} velocities",
        current.positions.len(),
        current.velocities.len()
    );

    if !t.is_finite() {
        return Err(SimulationError::InvalidTime(t));
    }

    next.positions.clear();
    next.velocities.clear();
    for (index, (&position, &velocity)) in current
        .positions
        .iter()
        .zip(&current.velocities)
        .enumerate()
    {
        let (position, velocity) = advance_particle(position, velocity, noise, t, params);
        if let Some(axis) = first_non_finite_axis(position, velocity) {
            return Err(SimulationError::NonFinite { index, axis });
        }
        next.positions.push(position);
        next.velocities.push(velocity);
    }

    Ok(())
}

/// Drift and bounce one particle.
///
/// Axes update in order x, y, z; the y and z samples read the x that was
/// just written.
fn advance_particle(
    mut position: Vec3,
    mut velocity: Vec3,
    noise: &NoiseField,
    t: f32,
    params: &StepParams,
) -> (Vec3, Vec3) {
    let s = params.noise_scale;
    let d = params.displacement_scale;
    let ts = t * s;

    position.x += velocity.x + d * noise.sample(ts, position.x * s, position.y * s);
    position.y += velocity.y + d * noise.sample(position.x * s, ts, position.z * s);
    position.z += velocity.z + d * noise.sample(position.z * s, position.x * s, ts);

    for axis in 0..3 {
        if position[axis].abs() > params.boundary {
            position[axis] *= -params.bounce_damping;
            velocity[axis] *= -params.bounce_damping;
        }
    }

    (position, velocity)
}

fn first_non_finite_axis(position: Vec3, velocity: Vec3) -> Option<usize> {
    (0..3).find(|&axis| !position[axis].is_finite() || !velocity[axis].is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_rejects_empty_field() {
        assert_eq!(
            initialize(0, 7.5, 0.01, 1).unwrap_err(),
            SimulationError::EmptyField
        );
    }

    #[test]
    fn test_initialize_rejects_negative_ranges() {
        assert!(matches!(
            initialize(10, -1.0, 0.01, 1),
            Err(SimulationError::InvalidParameter { .. })
        ));
        assert!(matches!(
            initialize(10, 1.0, f32::NAN, 1),
            Err(SimulationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_initialize_respects_ranges() {
        let buffer = initialize(500, 7.5, 0.01, 9).unwrap();
        assert_eq!(buffer.len(), 500);
        for (p, v) in buffer.positions.iter().zip(&buffer.velocities) {
            assert!(p.abs().max_element() <= 7.5);
            assert!(v.abs().max_element() <= 0.01);
        }
    }

    #[test]
    fn test_zero_ranges_place_particles_at_origin() {
        let buffer = initialize(3, 0.0, 0.0, 42).unwrap();
        assert!(buffer.positions.iter().all(|p| *p == Vec3::ZERO));
        assert!(buffer.velocities.iter().all(|v| *v == Vec3::ZERO));
    }

    #[test]
    fn test_step_params_validation() {
        assert!(StepParams::default().validate().is_ok());
        let bad = StepParams {
            bounce_damping: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = StepParams {
            boundary: -1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_containment_bound() {
        let bound = StepParams::default().containment_bound();
        assert!((bound - 7.0 / 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_step_rejects_non_finite_time() {
        let noise = NoiseField::new(1);
        let mut buffer = initialize(4, 1.0, 0.01, 1).unwrap();
        let before = buffer.clone();
        let err = step(&mut buffer, &noise, f32::INFINITY, &StepParams::default()).unwrap_err();
        assert!(err.is_transient());
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_step_is_all_or_nothing() {
        let noise = NoiseField::new(1);
        let mut buffer = initialize(8, 3.0, 0.01, 2).unwrap();
        buffer.velocities[5].y = f32::NAN;
        let before = buffer.clone();

        let err = step(&mut buffer, &noise, 0.5, &StepParams::default()).unwrap_err();
        assert_eq!(err, SimulationError::NonFinite { index: 5, axis: 1 });
        // Earlier particles were computed but must not have been written.
        assert_eq!(buffer.positions[..5], before.positions[..5]);
    }

    #[test]
    #[should_panic(expected = "malformed particle buffer")]
    fn test_step_panics_on_mismatched_buffer() {
        let noise = NoiseField::new(1);
        let mut buffer = ParticleBuffer {
            positions: vec![Vec3::ZERO; 3],
            velocities: vec![Vec3::ZERO; 2],
        };
        let _ = step(&mut buffer, &noise, 0.0, &StepParams::default());
    }
}
