//! Threshold, blur, add.

use super::frame::{luminance, smoothstep, texel, Frame};
use image::Rgba;

/// Weights of the 9-tap Gaussian: center first, then each symmetric pair.
pub const BLUR_WEIGHTS: [f32; 5] = [0.227027, 0.1945946, 0.1216216, 0.054054, 0.016216];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    pub enabled: bool,
    /// Luminance where the glow starts.
    pub threshold: f32,
    /// Width of the ramp above `threshold`.
    pub smoothing: f32,
    /// Multiplier on the blurred glow when added back.
    pub intensity: f32,
    /// Number of horizontal + vertical blur rounds.
    pub blur_passes: u32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.5,
            smoothing: 0.9,
            intensity: 1.5,
            blur_passes: 2,
        }
    }
}

impl BloomSettings {
    /// How much of a pixel with luma `luma` feeds the glow.
    pub fn mask(&self, luma: f32) -> f32 {
        smoothstep(self.threshold, self.threshold + self.smoothing, luma)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurDirection {
    Horizontal,
    Vertical,
}

/// Keep only the bright parts of `frame`.
pub fn extract(frame: &Frame, settings: &BloomSettings) -> Frame {
    Frame::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b, _] = frame.get_pixel(x, y).0;
        let mask = settings.mask(luminance([r, g, b]));
        Rgba([r * mask, g * mask, b * mask, mask])
    })
}

/// One separable blur pass with clamp-to-edge addressing.
pub fn blur(frame: &Frame, direction: BlurDirection) -> Frame {
    let (dx, dy) = match direction {
        BlurDirection::Horizontal => (1, 0),
        BlurDirection::Vertical => (0, 1),
    };

    Frame::from_fn(frame.width(), frame.height(), |x, y| {
        let (x, y) = (x as i64, y as i64);
        let center = texel(frame, x, y);
        let mut sum = center.map(|c| c * BLUR_WEIGHTS[0]);
        for (i, weight) in BLUR_WEIGHTS.iter().enumerate().skip(1) {
            let i = i as i64;
            let ahead = texel(frame, x + dx * i, y + dy * i);
            let behind = texel(frame, x - dx * i, y - dy * i);
            for c in 0..4 {
                sum[c] += (ahead[c] + behind[c]) * weight;
            }
        }
        Rgba(sum)
    })
}

/// Full bloom: extract, blur `blur_passes` times, add back scaled by
/// `intensity`. The scene's alpha is kept.
pub fn apply(frame: &Frame, settings: &BloomSettings) -> Frame {
    let mut glow = extract(frame, settings);
    for _ in 0..settings.blur_passes {
        glow = blur(&glow, BlurDirection::Horizontal);
        glow = blur(&glow, BlurDirection::Vertical);
    }

    Frame::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b, a] = frame.get_pixel(x, y).0;
        let [gr, gg, gb, _] = glow.get_pixel(x, y).0;
        Rgba([
            r + gr * settings.intensity,
            g + gg * settings.intensity,
            b + gb * settings.intensity,
            a,
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postprocess::frame::solid;

    #[test]
    fn test_weights_sum_to_one() {
        let total = BLUR_WEIGHTS[0] + 2.0 * BLUR_WEIGHTS[1..].iter().sum::<f32>();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_mask_below_threshold_is_zero() {
        let settings = BloomSettings::default();
        assert_eq!(settings.mask(0.4), 0.0);
        assert_eq!(settings.mask(1.4), 1.0);
        assert!(settings.mask(0.9) > 0.0 && settings.mask(0.9) < 1.0);
    }

    #[test]
    fn test_blur_preserves_uniform_frame() {
        let frame = solid(8, 8, [0.4, 0.2, 0.1]);
        let blurred = blur(&frame, BlurDirection::Vertical);
        for p in blurred.pixels() {
            assert!((p.0[0] - 0.4).abs() < 1e-5);
        }
    }

    #[test]
    fn test_dim_frame_is_unchanged() {
        let frame = solid(6, 6, [0.2, 0.2, 0.2]);
        assert_eq!(apply(&frame, &BloomSettings::default()), frame);
    }

    #[test]
    fn test_bright_pixel_spreads() {
        let mut frame = solid(31, 31, [0.0; 3]);
        frame.put_pixel(15, 15, Rgba([4.0, 4.0, 4.0, 1.0]));
        let out = apply(&frame, &BloomSettings::default());

        assert!(out.get_pixel(15, 15).0[0] > 4.0);
        assert!(out.get_pixel(17, 15).0[0] > 0.0);
        assert!(out.get_pixel(15, 13).0[1] > 0.0);
        // Two rounds of a 4-texel radius reach 8 texels at most.
        assert_eq!(out.get_pixel(0, 0).0[0], 0.0);
        assert_eq!(out.get_pixel(15, 15).0[3], 1.0);
    }
}
