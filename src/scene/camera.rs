use glam::{Mat4, Vec3, Vec4Swizzles};

/// Output size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// A point projected onto the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// Pixel coordinates, origin top-left.
    pub x: f32,
    pub y: f32,
    /// Normalized depth in `[0, 1]`.
    pub depth: f32,
    /// Clip-space w, used for perspective-correct interpolation.
    pub w: f32,
}

/// Perspective camera looking at a fixed target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Camera {
    /// Five units back on +Z, 75° vertical field of view.
    pub fn hero(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            aspect,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Right-handed projection with depth in `[0, 1]`.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world-space point with a precomputed view-projection.
    ///
    /// Returns `None` for points behind the near plane.
    pub fn project(view_projection: &Mat4, world: Vec3, viewport: Viewport) -> Option<ScreenPoint> {
        let clip = *view_projection * world.extend(1.0);
        if clip.w <= 0.0 || clip.z < 0.0 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(ScreenPoint {
            x: (ndc.x * 0.5 + 0.5) * viewport.width as f32,
            y: (0.5 - ndc.y * 0.5) * viewport.height as f32,
            depth: ndc.z,
            w: clip.w,
        })
    }
}
