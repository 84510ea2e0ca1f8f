//! Frame compositor: bloom, then chromatic aberration.
//!
//! Both effects run on the host over a linear float [`Frame`]. The GPU
//! renderer has its own passes with the same math in
//! `gpu::postprocess`; this path is what the software renderer and the
//! tests use.

pub mod aberration;
pub mod bloom;
pub mod frame;

pub use aberration::AberrationSettings;
pub use bloom::{BloomSettings, BlurDirection, BLUR_WEIGHTS};
pub use frame::Frame;

/// Settings for the whole effect chain.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PostProcessConfig {
    pub bloom: BloomSettings,
    pub aberration: AberrationSettings,
}

impl PostProcessConfig {
    /// Both effects off.
    pub fn passthrough() -> Self {
        Self {
            bloom: BloomSettings {
                enabled: false,
                ..Default::default()
            },
            aberration: AberrationSettings {
                enabled: false,
                ..Default::default()
            },
        }
    }

    pub fn is_active(&self) -> bool {
        self.bloom.enabled || self.aberration.enabled
    }
}

/// Applies the configured effects in their fixed order.
#[derive(Debug, Clone)]
pub struct Compositor {
    config: PostProcessConfig,
}

impl Compositor {
    pub fn new(config: PostProcessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PostProcessConfig {
        &self.config
    }

    pub fn apply(&self, frame: &Frame) -> Frame {
        let bloomed;
        let mut current = frame;

        if self.config.bloom.enabled {
            bloomed = bloom::apply(current, &self.config.bloom);
            current = &bloomed;
        }

        if self.config.aberration.enabled {
            return aberration::apply(current, &self.config.aberration);
        }

        current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn test_frame() -> Frame {
        Frame::from_fn(12, 9, |x, y| {
            let v = ((x * 7 + y * 3) % 11) as f32 / 5.0;
            Rgba([v, v * 0.5, 1.0 - v.min(1.0), 1.0])
        })
    }

    #[test]
    fn test_passthrough_is_identity() {
        let frame = test_frame();
        let compositor = Compositor::new(PostProcessConfig::passthrough());
        assert!(!compositor.config().is_active());
        assert_eq!(compositor.apply(&frame), frame);
    }

    #[test]
    fn test_order_is_bloom_then_aberration() {
        let frame = test_frame();
        let config = PostProcessConfig::default();
        let expected = aberration::apply(&bloom::apply(&frame, &config.bloom), &config.aberration);
        assert_eq!(Compositor::new(config).apply(&frame), expected);
    }
}
