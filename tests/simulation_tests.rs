//! Integration tests for the particle simulation.

use glam::{Vec2, Vec3};
use prismfield::noise::NoiseField;
use prismfield::postprocess::PostProcessConfig;
use prismfield::render::{FrameInput, FrameRenderer, SoftwareRenderer};
use prismfield::scene::{Camera, Mesh, MeshTransform, Viewport};
use prismfield::shading::{
    coloring_stage, geometry_stage, Lighting, PhongMaterial, PointPalette, ShaderUniforms,
};
use prismfield::simulation::{initialize, step, ParticleBuffer, ParticleField, StepParams};

fn single(position: Vec3, velocity: Vec3) -> ParticleBuffer {
    ParticleBuffer {
        positions: vec![position],
        velocities: vec![velocity],
    }
}

// ==================== Single Step Scenarios ====================

#[test]
fn test_resting_particle_at_origin_stays_put() {
    // Every noise lookup lands on a lattice point, which samples to zero.
    let noise = NoiseField::new(11);
    let mut buffer = single(Vec3::ZERO, Vec3::ZERO);

    step(&mut buffer, &noise, 0.0, &StepParams::default()).unwrap();

    assert_eq!(buffer.positions[0], Vec3::ZERO);
    assert_eq!(buffer.velocities[0], Vec3::ZERO);
}

#[test]
fn test_initialized_origin_particle_moves_by_noise_only() {
    let noise = NoiseField::new(42);
    let params = StepParams::default();
    let mut buffer = initialize(1, 0.0, 0.0, 42).unwrap();
    assert_eq!(buffer.positions[0], Vec3::ZERO);

    step(&mut buffer, &noise, 0.0, &params).unwrap();

    let drift = params.displacement_scale * noise.sample(0.0, 0.0, 0.0);
    assert_eq!(buffer.positions[0], Vec3::splat(drift));
    assert_eq!(buffer.velocities[0], Vec3::ZERO);
}

#[test]
fn test_particle_just_past_boundary_is_mirrored_and_damped() {
    let noise = NoiseField::new(42);
    let params = StepParams::default();
    let mut buffer = single(Vec3::new(7.01, 0.0, 0.0), Vec3::new(0.01, 0.0, 0.0));

    step(&mut buffer, &noise, 0.0, &params).unwrap();

    let s = params.noise_scale;
    let d = params.displacement_scale;
    let drifted = 7.01 + (0.01 + d * noise.sample(0.0, 7.01 * s, 0.0));
    assert_eq!(buffer.positions[0].x, -drifted * 0.95);
    assert!((buffer.velocities[0].x + 0.0095).abs() < 1e-6);
}

#[test]
fn test_particle_past_boundary_bounces_back() {
    let noise = NoiseField::new(4);
    let params = StepParams::default();
    let mut buffer = single(Vec3::new(7.5, 0.0, 0.0), Vec3::new(0.01, 0.0, 0.0));

    step(&mut buffer, &noise, 1.0, &params).unwrap();

    let x = buffer.positions[0].x;
    // 7.5 + 0.01 + drift within 0.02, then mirrored and damped.
    assert!(x < -7.0 && x > -7.2, "unexpected bounced x: {}", x);
    assert!((buffer.velocities[0].x + 0.0095).abs() < 1e-6);
    assert_eq!(buffer.velocities[0].y, 0.0);
}

#[test]
fn test_particle_inside_boundary_only_drifts() {
    let noise = NoiseField::new(4);
    let params = StepParams::default();
    let start = Vec3::new(1.25, -2.5, 3.75);
    let mut buffer = single(start, Vec3::ZERO);

    step(&mut buffer, &noise, 2.0, &params).unwrap();

    let moved = buffer.positions[0] - start;
    assert!(moved.abs().max_element() <= params.displacement_scale + 1e-6);
    assert_eq!(buffer.velocities[0], Vec3::ZERO);
}

#[test]
fn test_axis_updates_read_new_x() {
    let noise = NoiseField::new(21);
    let params = StepParams::default();
    let start = Vec3::new(0.3, 0.6, -0.9);
    let mut buffer = single(start, Vec3::new(0.004, 0.0, 0.0));

    step(&mut buffer, &noise, 0.5, &params).unwrap();

    let s = params.noise_scale;
    let d = params.displacement_scale;
    let x = start.x + (0.004 + d * noise.sample(0.5 * s, start.x * s, start.y * s));
    let y = start.y + d * noise.sample(x * s, 0.5 * s, start.z * s);
    let z = start.z + d * noise.sample(start.z * s, x * s, 0.5 * s);
    assert_eq!(buffer.positions[0], Vec3::new(x, y, z));
}

// ==================== Long-Running Behavior ====================

#[test]
fn test_field_stays_contained_over_many_steps() {
    let params = StepParams::default();
    let mut field = ParticleField::seeded(400, 7.5, 0.01, 99, params).unwrap();
    let bound = params.containment_bound();

    for frame in 0..600 {
        field.step(frame as f32 / 60.0).unwrap();
        let extent = field.buffer().max_extent();
        assert!(extent <= bound, "frame {}: extent {} exceeds {}", frame, extent, bound);
    }
    assert_eq!(field.steps(), 600);
}

#[test]
fn test_same_seed_replays_identically() {
    let params = StepParams::default();
    let mut a = ParticleField::seeded(128, 7.5, 0.01, 2024, params).unwrap();
    let mut b = ParticleField::seeded(128, 7.5, 0.01, 2024, params).unwrap();

    for frame in 0..120 {
        let t = frame as f32 / 30.0;
        a.step(t).unwrap();
        b.step(t).unwrap();
    }
    assert_eq!(a.buffer(), b.buffer());
}

#[test]
fn test_different_seeds_diverge() {
    let a = initialize(32, 7.5, 0.01, 1).unwrap();
    let b = initialize(32, 7.5, 0.01, 2).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_shading_and_rendering_do_not_mutate_particles() {
    let mut field = ParticleField::seeded(64, 7.5, 0.01, 5, StepParams::default()).unwrap();
    field.step(0.25).unwrap();
    let snapshot = field.buffer().clone();

    let viewport = Viewport::new(48, 32);
    let camera = Camera::hero(viewport.aspect());
    let transform = MeshTransform::at(0.25);
    let mesh = Mesh::prism();
    let material = PhongMaterial::default();
    let lighting = Lighting::default();
    let palette = PointPalette::default();
    let uniforms = ShaderUniforms::at(0.25);

    // Both stages over the particle positions.
    for &position in field.positions() {
        let displaced = geometry_stage(position, Vec3::Y, &uniforms);
        assert!(displaced.is_finite());
        let uv = Vec2::new(position.x.fract().abs(), position.y.fract().abs());
        assert!(coloring_stage(uv, &palette, &uniforms).is_finite());
    }

    let mut renderer = SoftwareRenderer::new(viewport, PostProcessConfig::default()).unwrap();
    let input = FrameInput {
        uniforms,
        camera: &camera,
        transform: &transform,
        mesh: &mesh,
        material: &material,
        lighting: &lighting,
        positions: field.positions(),
        positions_dirty: field.is_dirty(),
        palette: &palette,
        point_size: 2.0,
        background: Vec3::ZERO,
    };
    let frame = renderer.render(&input).unwrap();
    assert_eq!(frame.dimensions(), (48, 32));

    assert_eq!(field.buffer(), &snapshot);
    assert_eq!(field.steps(), 1);
}

#[test]
fn test_dirty_flag_follows_steps() {
    let mut field = ParticleField::seeded(8, 7.5, 0.01, 5, StepParams::default()).unwrap();
    assert!(field.take_dirty());
    assert!(!field.take_dirty());

    field.step(0.1).unwrap();
    assert!(field.is_dirty());
    assert!(field.take_dirty());

    assert!(field.step(f32::NAN).is_err());
    assert!(!field.is_dirty());
}
