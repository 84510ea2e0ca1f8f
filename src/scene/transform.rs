use glam::{Mat4, Vec3};

/// Idle motion of the mesh and its parent group at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeshTransform {
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub offset_y: f32,
    pub group_rotation_y: f32,
}

impl MeshTransform {
    pub fn at(t: f32) -> Self {
        Self {
            rotation_x: (t * 0.3).sin() * 0.2,
            rotation_y: (t * 0.2).cos() * 0.2,
            offset_y: (t * 0.5).sin() * 0.1,
            group_rotation_y: (t * 0.2).sin() * 0.3,
        }
    }

    /// Mesh-local to group space: translate after rotating X then Y.
    pub fn mesh_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, self.offset_y, 0.0))
            * Mat4::from_rotation_x(self.rotation_x)
            * Mat4::from_rotation_y(self.rotation_y)
    }

    /// Group space to world space. Particles and lights live in group space.
    pub fn group_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.group_rotation_y)
    }

    pub fn mesh_world_matrix(&self) -> Mat4 {
        self.group_matrix() * self.mesh_matrix()
    }
}
