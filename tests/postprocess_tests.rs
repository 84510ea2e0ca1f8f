//! Integration tests for the shading stages and the compositor.

use glam::{Vec2, Vec3};
use image::Rgba;
use prismfield::postprocess::{aberration, bloom, frame, Compositor, Frame, PostProcessConfig};
use prismfield::scene::Mesh;
use prismfield::shading::{coloring_stage, geometry_stage, PointPalette, ShaderUniforms};

fn dot_frame(size: u32, value: f32) -> Frame {
    let center = size / 2;
    Frame::from_fn(size, size, |x, y| {
        if x == center && y == center {
            Rgba([value, value, value, 1.0])
        } else {
            Rgba([0.0, 0.0, 0.0, 1.0])
        }
    })
}

fn max_abs_diff(a: &Frame, b: &Frame) -> f32 {
    a.pixels()
        .zip(b.pixels())
        .flat_map(|(p, q)| (0..4).map(move |c| (p.0[c] - q.0[c]).abs()))
        .fold(0.0, f32::max)
}

// ==================== Shading ====================

#[test]
fn test_geometry_stage_over_prism_stays_near_surface() {
    let mesh = Mesh::prism();
    for t in [0.0, 0.8, 3.3, 12.0] {
        let uniforms = ShaderUniforms::at(t);
        for vertex in &mesh.vertices {
            let moved = geometry_stage(vertex.position(), vertex.normal(), &uniforms);
            // Two bounded terms of 0.1 each along a unit normal.
            assert!(moved.distance(vertex.position()) <= 0.2 + 1e-5);
        }
    }
}

#[test]
fn test_coloring_stage_fades_to_edge() {
    let palette = PointPalette::default();
    let uniforms = ShaderUniforms::at(1.0);
    let center = coloring_stage(Vec2::splat(0.5), &palette, &uniforms);
    let off_center = coloring_stage(Vec2::new(0.8, 0.5), &palette, &uniforms);
    let corner = coloring_stage(Vec2::ZERO, &palette, &uniforms);

    assert!(center.w > off_center.w && off_center.w > corner.w);
    assert!(corner.w > 0.0);
    let rgb = center.truncate();
    assert!(rgb.cmpge(palette.base.min(palette.glow) - Vec3::splat(1e-6)).all());
    assert!(rgb.cmple(palette.base.max(palette.glow) + Vec3::splat(1e-6)).all());
}

// ==================== Compositor ====================

#[test]
fn test_dark_frame_passes_through() {
    let input = frame::solid(24, 24, [0.1, 0.05, 0.2]);
    let output = Compositor::new(PostProcessConfig::default()).apply(&input);
    assert!(max_abs_diff(&input, &output) < 1e-5);
}

#[test]
fn test_bright_dot_glows_into_neighbours() {
    let input = dot_frame(31, 1.0);
    let config = PostProcessConfig {
        aberration: prismfield::postprocess::AberrationSettings {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let output = Compositor::new(config).apply(&input);

    let center = output.get_pixel(15, 15).0;
    let neighbour = output.get_pixel(17, 15).0;
    assert!(center[0] > 1.0);
    assert!(neighbour[0] > 0.0);
    assert_eq!(output.get_pixel(0, 0).0[0], 0.0);
}

#[test]
fn test_effects_run_bloom_then_aberration() {
    let input = dot_frame(31, 2.0);
    let config = PostProcessConfig::default();

    let expected = aberration::apply(&bloom::apply(&input, &config.bloom), &config.aberration);
    let actual = Compositor::new(config).apply(&input);

    assert!(max_abs_diff(&expected, &actual) < 1e-6);
}

#[test]
fn test_passthrough_is_identity() {
    let input = dot_frame(9, 5.0);
    let output = Compositor::new(PostProcessConfig::passthrough()).apply(&input);
    assert_eq!(output, input);
}

#[test]
fn test_output_quantizes_with_clamp() {
    let input = dot_frame(5, 3.0);
    let image = frame::to_rgba8(&input);
    assert_eq!(image.get_pixel(2, 2).0, [255, 255, 255, 255]);
    assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
}
