use glam::Vec3;

/// Particle state, one entry per particle index in each vector.
///
/// Both vectors always have the same length; [`super::step`] panics
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleBuffer {
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
}

impl ParticleBuffer {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn is_well_formed(&self) -> bool {
        self.positions.len() == self.velocities.len()
    }

    /// Largest absolute coordinate across all particles and axes.
    pub fn max_extent(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| p.abs().max_element())
            .fold(0.0, f32::max)
    }
}
