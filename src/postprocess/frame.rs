//! Linear float frames and the sampling helpers the effects share.

use image::{Rgba, Rgba32FImage, RgbaImage};

/// A rendered frame in linear RGBA float.
pub type Frame = Rgba32FImage;

/// A frame filled with one opaque color.
pub fn solid(width: u32, height: u32, rgb: [f32; 3]) -> Frame {
    Frame::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 1.0]))
}

/// Rec. 709 luma.
pub fn luminance(rgb: [f32; 3]) -> f32 {
    0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2]
}

/// Hermite step from `edge0` to `edge1`. Degenerates to a hard step when the
/// edges coincide.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Pixel at integer coordinates, clamped to the frame edges.
pub fn texel(frame: &Frame, x: i64, y: i64) -> [f32; 4] {
    let x = x.clamp(0, frame.width() as i64 - 1) as u32;
    let y = y.clamp(0, frame.height() as i64 - 1) as u32;
    frame.get_pixel(x, y).0
}

/// Bilinear sample at normalized `(u, v)` with clamp-to-edge addressing.
///
/// Texel centers sit at `(i + 0.5) / size`, matching GPU sampling.
pub fn sample_bilinear(frame: &Frame, u: f32, v: f32) -> [f32; 4] {
    let fx = u * frame.width() as f32 - 0.5;
    let fy = v * frame.height() as f32 - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let a = texel(frame, x0, y0);
    let b = texel(frame, x0 + 1, y0);
    let c = texel(frame, x0, y0 + 1);
    let d = texel(frame, x0 + 1, y0 + 1);

    std::array::from_fn(|i| {
        let top = a[i] + (b[i] - a[i]) * tx;
        let bottom = c[i] + (d[i] - c[i]) * tx;
        top + (bottom - top) * ty
    })
}

/// Quantize to 8-bit RGBA, clamping each channel to `[0, 1]`.
pub fn to_rgba8(frame: &Frame) -> RgbaImage {
    RgbaImage::from_fn(frame.width(), frame.height(), |x, y| {
        let p = frame.get_pixel(x, y).0;
        Rgba(p.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
    })
}

/// Expand tightly packed 8-bit RGBA into a float frame.
///
/// Returns `None` if `data` does not hold exactly `width * height` pixels.
pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Option<Frame> {
    let image = RgbaImage::from_raw(width, height, data)?;
    Some(Frame::from_fn(width, height, |x, y| {
        Rgba(image.get_pixel(x, y).0.map(|c| c as f32 / 255.0))
    }))
}
