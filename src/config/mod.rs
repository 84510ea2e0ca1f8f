//! Scene configuration.
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! yields a usable scene. Keys are camelCase.

use crate::postprocess::{AberrationSettings, BloomSettings, PostProcessConfig};
use crate::shading::PointPalette;
use crate::simulation::StepParams;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors raised while loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Particle count must be at least 1")]
    EmptyParticleField,
    #[error("Invalid {field}: {value} ({expected})")]
    InvalidValue {
        field: &'static str,
        value: f32,
        expected: &'static str,
    },
    #[error("Invalid {field} color: {value:?}")]
    InvalidColor { field: &'static str, value: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A color given either as linear RGB floats or as a `#rrggbb` string.
///
/// Hex strings quantize to 1/255 steps, so palette defaults are floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Rgb([f32; 3]),
    Hex(String),
}

impl ColorValue {
    pub fn to_rgb(&self) -> Option<[f32; 3]> {
        match self {
            Self::Rgb(rgb) => rgb.iter().all(|c| c.is_finite()).then_some(*rgb),
            Self::Hex(hex) => parse_hex_color(hex),
        }
    }
}

impl From<&str> for ColorValue {
    fn from(hex: &str) -> Self {
        Self::Hex(hex.to_string())
    }
}

impl From<[f32; 3]> for ColorValue {
    fn from(rgb: [f32; 3]) -> Self {
        Self::Rgb(rgb)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
    pub particle_count: u32,
    /// Half-width of the cube particles are spawned in.
    pub domain_half_width: f32,
    /// Full width of the initial per-axis velocity spread.
    pub velocity_scale: f32,
    pub boundary: f32,
    pub bloom_intensity: f32,
    pub bloom_threshold: f32,
    pub bloom_smoothing: f32,
    pub aberration_offset: [f32; 2],
    /// Seed for particle placement and noise. Drawn at random when absent.
    pub seed: Option<u64>,
    pub noise_scale: f32,
    pub displacement_scale: f32,
    pub bounce_damping: f32,
    /// Point sprite size in pixels.
    pub point_size: f32,
    pub base_color: ColorValue,
    pub glow_color: ColorValue,
    pub background: ColorValue,
    pub bloom_enabled: bool,
    pub aberration_enabled: bool,
    pub blur_passes: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_count: 3000,
            domain_half_width: 7.5,
            velocity_scale: 0.02,
            boundary: 7.0,
            bloom_intensity: 1.5,
            bloom_threshold: 0.5,
            bloom_smoothing: 0.9,
            aberration_offset: [0.002, 0.002],
            seed: None,
            noise_scale: 0.1,
            displacement_scale: 0.02,
            bounce_damping: 0.95,
            point_size: 2.0,
            base_color: ColorValue::Rgb([0.6, 0.4, 1.0]),
            glow_color: ColorValue::Rgb([0.8, 0.5, 1.0]),
            background: ColorValue::from("#000000"),
            bloom_enabled: true,
            aberration_enabled: true,
            blur_passes: 2,
        }
    }
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::EmptyParticleField);
        }

        let checks: [(&'static str, f32, bool, &'static str); 11] = [
            ("domainHalfWidth", self.domain_half_width, self.domain_half_width >= 0.0, "finite and >= 0"),
            ("velocityScale", self.velocity_scale, self.velocity_scale >= 0.0, "finite and >= 0"),
            ("boundary", self.boundary, self.boundary > 0.0, "finite and > 0"),
            ("bloomIntensity", self.bloom_intensity, self.bloom_intensity >= 0.0, "finite and >= 0"),
            ("bloomThreshold", self.bloom_threshold, true, "finite"),
            ("bloomSmoothing", self.bloom_smoothing, self.bloom_smoothing >= 0.0, "finite and >= 0"),
            ("noiseScale", self.noise_scale, true, "finite"),
            ("displacementScale", self.displacement_scale, true, "finite"),
            (
                "bounceDamping",
                self.bounce_damping,
                self.bounce_damping > 0.0 && self.bounce_damping <= 1.0,
                "in (0, 1]",
            ),
            ("pointSize", self.point_size, self.point_size > 0.0, "finite and > 0"),
            (
                "aberrationOffset",
                self.aberration_offset[0],
                self.aberration_offset[1].is_finite(),
                "finite",
            ),
        ];

        for (field, value, ok, expected) in checks {
            if !value.is_finite() || !ok {
                return Err(ConfigError::InvalidValue {
                    field,
                    value,
                    expected,
                });
            }
        }

        self.palette()?;
        self.background_rgb()?;
        Ok(())
    }

    /// The configured seed, or a fresh random one.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Half-range handed to particle initialization.
    pub fn velocity_half_range(&self) -> f32 {
        self.velocity_scale * 0.5
    }

    pub fn step_params(&self) -> StepParams {
        StepParams {
            noise_scale: self.noise_scale,
            displacement_scale: self.displacement_scale,
            bounce_damping: self.bounce_damping,
            boundary: self.boundary,
        }
    }

    pub fn post_process(&self) -> PostProcessConfig {
        PostProcessConfig {
            bloom: BloomSettings {
                enabled: self.bloom_enabled,
                threshold: self.bloom_threshold,
                smoothing: self.bloom_smoothing,
                intensity: self.bloom_intensity,
                blur_passes: self.blur_passes,
            },
            aberration: AberrationSettings {
                enabled: self.aberration_enabled,
                offset: Vec2::from_array(self.aberration_offset),
            },
        }
    }

    pub fn palette(&self) -> Result<PointPalette, ConfigError> {
        Ok(PointPalette {
            base: parse_color_field("baseColor", &self.base_color)?,
            glow: parse_color_field("glowColor", &self.glow_color)?,
        })
    }

    pub fn background_rgb(&self) -> Result<Vec3, ConfigError> {
        parse_color_field("background", &self.background)
    }
}

fn parse_color_field(field: &'static str, value: &ColorValue) -> Result<Vec3, ConfigError> {
    value
        .to_rgb()
        .map(Vec3::from_array)
        .ok_or_else(|| ConfigError::InvalidColor {
            field,
            value: match value {
                ColorValue::Hex(hex) => hex.clone(),
                ColorValue::Rgb(rgb) => format!("{rgb:?}"),
            },
        })
}

/// Parse `#rrggbb` (or `#rrggbbaa`, alpha ignored) into RGB floats.
pub fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let hex = hex.trim_start_matches('#');
    if (hex.len() != 6 && hex.len() != 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(|c| c as f32 / 255.0);
    Some([channel(0)?, channel(2)?, channel(4)?])
}
