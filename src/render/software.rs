//! Host rasterizer.
//!
//! Draws the mesh with per-pixel Phong shading and back-face culling, then
//! splats each particle as a square point sprite with additive blending.
//! There is no depth buffer: the mesh is convex and particles never occlude
//! anything.

use super::{check_viewport, FrameInput, FrameRenderer, RenderError};
use crate::postprocess::{frame, Compositor, Frame, PostProcessConfig};
use crate::scene::{Camera, ScreenPoint, Viewport};
use crate::shading::{coloring_stage, geometry_stage, shade_phong};
use glam::{Mat4, Vec2, Vec3};

pub struct SoftwareRenderer {
    viewport: Viewport,
    compositor: Compositor,
}

/// A mesh vertex after the geometry stage.
#[derive(Clone, Copy)]
struct ShadedVertex {
    screen: ScreenPoint,
    world: Vec3,
    normal: Vec3,
}

impl SoftwareRenderer {
    pub fn new(viewport: Viewport, post: PostProcessConfig) -> Result<Self, RenderError> {
        check_viewport(viewport)?;
        Ok(Self {
            viewport,
            compositor: Compositor::new(post),
        })
    }

    /// Render without post-processing.
    pub fn render_scene(&self, input: &FrameInput<'_>) -> Frame {
        let mut target = frame::solid(
            self.viewport.width,
            self.viewport.height,
            input.background.to_array(),
        );
        let view_projection = input.camera.view_projection();
        self.draw_mesh(&mut target, input, &view_projection);
        self.draw_particles(&mut target, input, &view_projection);
        target
    }

    fn draw_mesh(&self, target: &mut Frame, input: &FrameInput<'_>, view_projection: &Mat4) {
        let model = input.transform.mesh_world_matrix();
        let eye = input.camera.position;

        let vertices: Vec<Option<ShadedVertex>> = input
            .mesh
            .vertices
            .iter()
            .map(|v| {
                let local = geometry_stage(v.position(), v.normal(), &input.uniforms);
                let world = model.transform_point3(local);
                let normal = model.transform_vector3(v.normal()).normalize_or_zero();
                Camera::project(view_projection, world, self.viewport).map(|screen| ShadedVertex {
                    screen,
                    world,
                    normal,
                })
            })
            .collect();

        for tri in input.mesh.indices.chunks_exact(3) {
            let (Some(a), Some(b), Some(c)) = (
                vertices[tri[0] as usize],
                vertices[tri[1] as usize],
                vertices[tri[2] as usize],
            ) else {
                continue;
            };
            self.fill_triangle(target, [a, b, c], |world, normal| {
                shade_phong(world, normal, eye, input.material, input.lighting)
            });
        }
    }

    fn fill_triangle<F>(&self, target: &mut Frame, tri: [ShadedVertex; 3], shade: F)
    where
        F: Fn(Vec3, Vec3) -> Vec3,
    {
        let [p0, p1, p2] = tri.map(|v| Vec2::new(v.screen.x, v.screen.y));
        let area = edge(p0, p1, p2);
        // Screen y points down, so counter-clockwise front faces have
        // negative area here.
        if area >= 0.0 {
            return;
        }

        let min = p0.min(p1).min(p2).floor().max(Vec2::ZERO);
        let max = p0
            .max(p1)
            .max(p2)
            .ceil()
            .min(Vec2::new(self.viewport.width as f32, self.viewport.height as f32));
        if min.x >= max.x || min.y >= max.y {
            return;
        }

        let inv_w = tri.map(|v| 1.0 / v.screen.w);

        for y in min.y as u32..max.y as u32 {
            for x in min.x as u32..max.x as u32 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let b0 = edge(p1, p2, p) / area;
                let b1 = edge(p2, p0, p) / area;
                let b2 = edge(p0, p1, p) / area;
                if b0 < 0.0 || b1 < 0.0 || b2 < 0.0 {
                    continue;
                }

                // Perspective-correct weights.
                let (w0, w1, w2) = (b0 * inv_w[0], b1 * inv_w[1], b2 * inv_w[2]);
                let norm = w0 + w1 + w2;
                let world = (tri[0].world * w0 + tri[1].world * w1 + tri[2].world * w2) / norm;
                let normal = (tri[0].normal * w0 + tri[1].normal * w1 + tri[2].normal * w2) / norm;

                let color = shade(world, normal);
                target.put_pixel(x, y, image::Rgba([color.x, color.y, color.z, 1.0]));
            }
        }
    }

    fn draw_particles(&self, target: &mut Frame, input: &FrameInput<'_>, view_projection: &Mat4) {
        let group = input.transform.group_matrix();
        let size = input.point_size;
        let half = size * 0.5;
        let (width, height) = (self.viewport.width as i64, self.viewport.height as i64);

        for &position in input.positions {
            let world = group.transform_point3(position);
            let Some(center) = Camera::project(view_projection, world, self.viewport) else {
                continue;
            };
            if center.depth > 1.0 {
                continue;
            }

            let left = center.x - half;
            let top = center.y - half;
            let x_start = (left - 0.5).ceil() as i64;
            let y_start = (top - 0.5).ceil() as i64;
            let x_end = (left + size - 0.5).ceil() as i64;
            let y_end = (top + size - 0.5).ceil() as i64;

            for y in y_start.max(0)..y_end.min(height) {
                for x in x_start.max(0)..x_end.min(width) {
                    let point_coord = Vec2::new(
                        (x as f32 + 0.5 - left) / size,
                        (y as f32 + 0.5 - top) / size,
                    );
                    let color = coloring_stage(point_coord, input.palette, &input.uniforms);
                    let pixel = target.get_pixel_mut(x as u32, y as u32);
                    for c in 0..3 {
                        pixel.0[c] += color[c] * color.w;
                    }
                }
            }
        }
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

impl FrameRenderer for SoftwareRenderer {
    fn name(&self) -> &'static str {
        "software"
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        check_viewport(viewport)?;
        self.viewport = viewport;
        Ok(())
    }

    fn render(&mut self, input: &FrameInput<'_>) -> Result<Frame, RenderError> {
        let scene = self.render_scene(input);
        Ok(self.compositor.apply(&scene))
    }
}
