use super::core::{closest_hit, RaycastResult, Scene};
use super::math::{Ray, Vec3};
use super::shading::{checker_color, lighting, sphere_uv};
use super::texture::TextureSampler;

/// Maximum number of nested secondary rays.
pub const MAX_DEPTH: u32 = 5;
/// Index of refraction of refractive objects relative to the surrounding air.
pub const REFRACTIVE_INDEX: f64 = 1.01;
pub const BACKGROUND: Vec3 = Vec3::new(0.0, 0.0, 0.0);

const SHADOW_AMBIENT: f64 = 0.2;
const SHADOW_SURFACE_THROUGH: f64 = 0.85;
const SHADOW_OCCLUDER_THROUGH: f64 = 0.1;
const FOG_COLOR: Vec3 = Vec3::new(1.0, 1.0, 1.0);
const FOG_START_Z: f64 = -50.0;
const FOG_DEPTH: f64 = 200.0;

/// Everything a trace needs to read, shared by all the pixels of a frame.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub scene: &'a Scene,
    pub texture: Option<&'a dyn TextureSampler>,
    pub fog: bool,
}

impl<'a> RenderContext<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        RenderContext {
            scene,
            texture: None,
            fog: false,
        }
    }
}

/// Weight of the fog at the given depth: 0 up to z = -50, 1 from z = -250 onward.
pub fn fog_factor(z: f64) -> f64 {
    ((z - FOG_START_Z) / -FOG_DEPTH).clamp(0.0, 1.0)
}

/// Color of the hitted surface before lighting, patterned objects override the material color.
fn surface_color(ctx: &RenderContext, result: &RaycastResult) -> Vec3 {
    let object = result.hitted_object;
    if ctx.scene.floor == Some(result.index) {
        return checker_color(result.hit_point);
    }
    if ctx.scene.textured == Some(result.index) {
        if let Some(texture) = ctx.texture {
            let (u, v) = sphere_uv(object.solid.normal(result.hit_point));
            return texture.color_at(u, v);
        }
    }
    object.material.color
}

/// Computes the color seen along `ray`, spawning secondary rays while `depth < MAX_DEPTH`.
pub fn trace(ctx: &RenderContext, ray: &Ray, depth: u32) -> Vec3 {
    let Some(result) = closest_hit(ctx.scene, ray) else {
        return BACKGROUND;
    };
    let object = result.hitted_object;
    let material = &object.material;
    let hit_point = result.hit_point;
    let normal = object.solid.normal(hit_point);
    let light = ctx.scene.light.position;

    let surface = surface_color(ctx, &result);
    let mut color = lighting(surface, material, light, -ray.direction, hit_point, normal);

    // check if some other object occlude the light
    let light_vec = light - hit_point;
    let shadow_ray = Ray::new(hit_point, light_vec);
    if let Some(occlusion) = closest_hit(ctx.scene, &shadow_ray) {
        if occlusion.index != result.index && occlusion.distance < light_vec.len() {
            let occluder = &occlusion.hitted_object.material;
            color = if occluder.lets_light_through() {
                surface * SHADOW_SURFACE_THROUGH + occluder.color * SHADOW_OCCLUDER_THROUGH
            } else {
                surface * SHADOW_AMBIENT
            };
        }
    }

    if depth < MAX_DEPTH {
        if let Some(rho) = material.reflective {
            let reflected = Ray::new(hit_point, ray.direction.reflect(normal));
            color += trace(ctx, &reflected, depth + 1) * rho;
        }

        if let Some(rho) = material.transparent {
            // continue straight through the object and start again from where the ray leaves it
            let through = Ray::new(hit_point, ray.direction);
            let behind = match closest_hit(ctx.scene, &through) {
                Some(exit) => trace(ctx, &Ray::new(exit.hit_point, ray.direction), depth + 1),
                None => BACKGROUND,
            };
            color = color.lerp(behind, rho);
        }

        if material.refractive {
            color += refracted_color(ctx, &result, ray, normal, depth);
        }
    }

    if ctx.fog {
        color = color.lerp(FOG_COLOR, fog_factor(hit_point.z));
    }
    color
}

/// Bends the ray into the object, finds where it comes out and traces from there.
fn refracted_color(
    ctx: &RenderContext,
    result: &RaycastResult,
    ray: &Ray,
    normal: Vec3,
    depth: u32,
) -> Vec3 {
    let eta = 1.0 / REFRACTIVE_INDEX;
    let Some(inside) = ray.direction.refract(normal, eta) else {
        return BACKGROUND;
    };
    let Some(exit) = closest_hit(ctx.scene, &Ray::new(result.hit_point, inside)) else {
        return BACKGROUND;
    };
    let exit_normal = result.hitted_object.solid.normal(exit.hit_point);
    let Some(outside) = inside.normalize().refract(-exit_normal, 1.0 / eta) else {
        return BACKGROUND;
    };
    trace(ctx, &Ray::new(exit.hit_point, outside), depth + 1)
}
