//! Blinn-Phong lighting for the decorative mesh.

use glam::{Mat4, Vec3};

/// Most point lights a [`Lighting`] rig may carry. The GPU uniform block is
/// sized for this many.
pub const MAX_POINT_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
        }
    }

    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

/// Ambient term plus a small set of point lights.
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    /// Ambient color, already scaled by its intensity.
    pub ambient: Vec3,
    pub points: Vec<PointLight>,
}

impl Default for Lighting {
    fn default() -> Self {
        let purple = Vec3::new(128.0, 0.0, 128.0) / 255.0;
        Self {
            ambient: Vec3::splat(0.5),
            points: vec![
                PointLight::new(Vec3::splat(10.0), Vec3::ONE, 2.0),
                PointLight::new(Vec3::splat(-10.0), purple, 1.0),
            ],
        }
    }
}

impl Lighting {
    /// Move every light by `matrix`, e.g. into the parent group's frame.
    pub fn transformed(&self, matrix: Mat4) -> Self {
        Self {
            ambient: self.ambient,
            points: self
                .points
                .iter()
                .map(|light| PointLight {
                    position: matrix.transform_point3(light.position),
                    ..*light
                })
                .collect(),
        }
    }
}

/// Phong material of the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongMaterial {
    pub albedo: Vec3,
    pub emissive: Vec3,
    pub emissive_intensity: f32,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            albedo: rgb8(0x9d, 0x6d, 0xff),
            emissive: rgb8(0x5c, 0x1e, 0xff),
            emissive_intensity: 0.5,
            specular: rgb8(0x11, 0x11, 0x11),
            shininess: 50.0,
        }
    }
}

fn rgb8(r: u8, g: u8, b: u8) -> Vec3 {
    Vec3::new(r as f32, g as f32, b as f32) / 255.0
}

/// Light a surface point.
///
/// `eye` is the camera position in the same space as `position`. No
/// distance attenuation is applied.
pub fn shade_phong(
    position: Vec3,
    normal: Vec3,
    eye: Vec3,
    material: &PhongMaterial,
    lighting: &Lighting,
) -> Vec3 {
    let n = normal.normalize_or_zero();
    let view = (eye - position).normalize_or_zero();

    let mut color = material.albedo * lighting.ambient + material.emissive * material.emissive_intensity;

    for light in lighting.points.iter().take(MAX_POINT_LIGHTS) {
        let to_light = (light.position - position).normalize_or_zero();
        let n_dot_l = n.dot(to_light).max(0.0);
        if n_dot_l <= 0.0 {
            continue;
        }
        let radiance = light.radiance();
        color += material.albedo * radiance * n_dot_l;

        let half = (to_light + view).normalize_or_zero();
        color += material.specular * radiance * n.dot(half).max(0.0).powf(material.shininess);
    }

    color
}
