use rayon::prelude::*;

use super::camera::Camera;
use super::math::Vec3;
use super::tracer::{trace, RenderContext};

/// Sub-pixel offsets, in cell units, of the four anti-aliasing samples.
/// The first three samples share the same offset.
const QUAD_OFFSETS: [(f64, f64); 4] = [(0.25, 0.25), (0.25, 0.25), (0.25, 0.25), (0.75, 0.25)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// one ray through the cell center
    Single,
    /// four rays averaged together
    Quad,
}

/// Receives the finished color of every pixel.
pub trait ImageSink {
    fn put_pixel(&mut self, x: u32, y: u32, color: Vec3);
}

/// Color of the pixel (x, y), y = 0 being the top row.
pub fn pixel_color(ctx: &RenderContext, camera: &Camera, x: u32, y: u32, sampling: Sampling) -> Vec3 {
    let cell = camera.cell_size();
    let (xp, yp) = camera.cell_corner(x, y);
    match sampling {
        Sampling::Single => {
            let ray = camera.shoot_to(xp + 0.5 * cell, yp + 0.5 * cell);
            trace(ctx, &ray, 1)
        }
        Sampling::Quad => {
            let mut color = Vec3::zero();
            for (depth, (dx, dy)) in QUAD_OFFSETS.iter().enumerate() {
                let ray = camera.shoot_to(xp + dx * cell, yp + dy * cell);
                color += trace(ctx, &ray, depth as u32);
            }
            color * 0.25
        }
    }
}

/// Renders the whole frame, the rows are evaluated in parallel and then handed to the sink in order.
pub fn render(ctx: &RenderContext, camera: &Camera, sampling: Sampling, sink: &mut impl ImageSink) {
    let size = camera.divisions;
    let mut pixels = vec![Vec3::zero(); (size * size) as usize];
    pixels
        .par_chunks_mut(size as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = pixel_color(ctx, camera, x as u32, y as u32, sampling);
            }
        });

    for (i, color) in pixels.into_iter().enumerate() {
        let x = i as u32 % size;
        let y = i as u32 / size;
        sink.put_pixel(x, y, color.saturate());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raytracing::core::{Material, Scene, SceneObject, Solid};

    struct Collect {
        size: u32,
        pixels: Vec<Option<Vec3>>,
    }

    impl Collect {
        fn new(size: u32) -> Self {
            Collect {
                size,
                pixels: vec![None; (size * size) as usize],
            }
        }
    }

    impl ImageSink for Collect {
        fn put_pixel(&mut self, x: u32, y: u32, color: Vec3) {
            let slot = &mut self.pixels[(y * self.size + x) as usize];
            assert!(slot.is_none(), "pixel ({}, {}) written twice", x, y);
            *slot = Some(color);
        }
    }

    fn scene() -> Scene {
        let sphere = SceneObject::new(
            Solid::Sphere {
                center: Vec3::new(0.0, 0.0, -50.0),
                radius: 5.0,
            },
            Material::with_color(Vec3::new(1.0, 0.0, 0.0)),
        );
        Scene::new(vec![sphere], Vec3::new(0.0, 29.0, -40.0)).unwrap()
    }

    #[test]
    fn test_render_writes_every_pixel_once() {
        let scene = scene();
        let ctx = RenderContext::new(&scene);
        let camera = Camera::with_divisions(9);
        let mut sink = Collect::new(9);
        render(&ctx, &camera, Sampling::Quad, &mut sink);

        let pixels: Vec<Vec3> = sink.pixels.iter().map(|p| p.unwrap()).collect();
        // the sphere covers the middle of the frame and misses the corners
        assert!(pixels[4 * 9 + 4].x >= 0.2 - 1e-9);
        // the upper half faces the light
        assert!(pixels[3 * 9 + 4].x > 0.2);
        assert_eq!(pixels[0], Vec3::zero());
        assert_eq!(pixels[80], Vec3::zero());
        for p in pixels {
            assert!(p.x >= 0.0 && p.x <= 1.0);
        }
    }

    #[test]
    fn test_single_sample_matches_center_ray() {
        let scene = scene();
        let ctx = RenderContext::new(&scene);
        let camera = Camera::with_divisions(9);
        let color = pixel_color(&ctx, &camera, 4, 4, Sampling::Single);
        let expected = trace(&ctx, &camera.shoot_to(0.0, 0.0), 1);
        assert!((color - expected).len() < 1e-9);
    }

    #[test]
    fn test_quad_sampling_averages_offsets() {
        let scene = scene();
        let ctx = RenderContext::new(&scene);
        let camera = Camera::with_divisions(9);
        let (xp, yp) = camera.cell_corner(4, 4);
        let cell = camera.cell_size();
        let first = trace(&ctx, &camera.shoot_to(xp + 0.25 * cell, yp + 0.25 * cell), 0);
        let last = trace(&ctx, &camera.shoot_to(xp + 0.75 * cell, yp + 0.25 * cell), 3);
        let expected = (first * 3.0 + last) * 0.25;
        let color = pixel_color(&ctx, &camera, 4, 4, Sampling::Quad);
        assert!((color - expected).len() < 1e-9);
    }
}
