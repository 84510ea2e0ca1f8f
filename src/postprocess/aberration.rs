//! Chromatic aberration: red and blue sampled on opposite sides of green.

use super::frame::{sample_bilinear, Frame};
use glam::Vec2;
use image::Rgba;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AberrationSettings {
    pub enabled: bool,
    /// Red/blue displacement in UV units.
    pub offset: Vec2,
}

impl Default for AberrationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            offset: Vec2::splat(0.002),
        }
    }
}

pub fn apply(frame: &Frame, settings: &AberrationSettings) -> Frame {
    let (width, height) = frame.dimensions();
    let offset = settings.offset;

    Frame::from_fn(width, height, |x, y| {
        let uv = Vec2::new(
            (x as f32 + 0.5) / width as f32,
            (y as f32 + 0.5) / height as f32,
        );
        let [_, g, _, a] = frame.get_pixel(x, y).0;
        let red = uv + offset;
        let blue = uv - offset;
        let r = sample_bilinear(frame, red.x, red.y)[0];
        let b = sample_bilinear(frame, blue.x, blue.y)[2];
        Rgba([r, g, b, a])
    })
}
