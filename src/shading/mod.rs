//! Two-stage shading.
//!
//! The geometry stage displaces mesh vertices along their normals; the
//! coloring stage turns a point sprite coordinate into a glowing disc. Both
//! read the same [`ShaderUniforms`] and are pure, so the software renderer
//! calls them directly and the WGSL shaders repeat the same formulas.

pub mod lighting;

pub use lighting::{shade_phong, Lighting, PhongMaterial, PointLight, MAX_POINT_LIGHTS};

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

/// Values shared by both stages, refreshed once per frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ShaderUniforms {
    pub time: f32,
}

impl ShaderUniforms {
    pub fn at(time: f32) -> Self {
        Self { time }
    }
}

/// Colors blended by the coloring stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointPalette {
    pub base: Vec3,
    pub glow: Vec3,
}

impl Default for PointPalette {
    fn default() -> Self {
        Self {
            base: Vec3::new(0.6, 0.4, 1.0),
            glow: Vec3::new(0.8, 0.5, 1.0),
        }
    }
}

/// Breathing offset along the normal for a vertex at `position`.
pub fn breathing_displacement(position: Vec3, time: f32) -> f32 {
    (time * 2.0 + position.x * 2.0).sin() * 0.1 + (time * 1.5 + position.y * 2.0).cos() * 0.1
}

/// Geometry stage: push `position` along `normal` by the breathing offset.
pub fn geometry_stage(position: Vec3, normal: Vec3, uniforms: &ShaderUniforms) -> Vec3 {
    position + normal * breathing_displacement(position, uniforms.time)
}

/// Blend factor between the base and glow colors, in `[0, 1]`.
///
/// Periodic in `time` with period 4π.
pub fn color_breathing(time: f32) -> f32 {
    (time * 0.5).sin() * 0.5 + 0.5
}

/// Radial falloff of a point sprite: 1 at the center, cubic towards the edge.
pub fn point_strength(point_coord: Vec2) -> f32 {
    let distance = point_coord.distance(Vec2::splat(0.5));
    (1.0 - distance).clamp(0.0, 1.0).powi(3)
}

/// Coloring stage.
///
/// Returns RGB already scaled by the falloff, with the falloff in alpha. The
/// caller blends additively as `dst += rgb * a`.
pub fn coloring_stage(point_coord: Vec2, palette: &PointPalette, uniforms: &ShaderUniforms) -> Vec4 {
    let strength = point_strength(point_coord);
    let color = palette.base.lerp(palette.glow, color_breathing(uniforms.time));
    (color * strength).extend(strength)
}
