use std::f64::consts::PI;

use super::core::Material;
use super::math::Vec3;

const AMBIENT: f64 = 0.2;
const CHECKER_SIZE: f64 = 5.0;
// shifts the checkerboard so that the floor edge starts on a whole cell
const CHECKER_X_OFFSET: f64 = 60.0;
const CHECKER_LIGHT: Vec3 = Vec3::new(1.0, 1.0, 1.0);
const CHECKER_DARK: Vec3 = Vec3::new(0.5, 0.5, 0.5);

/// Phong local illumination of a surface point lit by a white point light.
///
/// `color` is the surface color at the point, which can differ from the material
/// color for patterned or textured objects. `view` points from the surface toward the viewer.
pub fn lighting(
    color: Vec3,
    material: &Material,
    light: Vec3,
    view: Vec3,
    hit_point: Vec3,
    normal: Vec3,
) -> Vec3 {
    let light_dir = (light - hit_point).normalize();
    let diffuse = light_dir.dot(normal).max(0.0);

    let mut specular = Vec3::zero();
    if material.specular {
        let reflected = (-light_dir).reflect(normal);
        let r_dot_v = reflected.dot(view);
        if r_dot_v >= 0.0 {
            specular = Vec3::one() * r_dot_v.powf(material.shininess);
        }
    }

    color * AMBIENT + color * diffuse + specular
}

/// Two color checkerboard on the XZ plane.
pub fn checker_color(point: Vec3) -> Vec3 {
    // truncation toward zero, cells straddling the axes are wider
    let ix = ((point.x + CHECKER_X_OFFSET) / CHECKER_SIZE) as i64;
    let iz = (point.z / CHECKER_SIZE) as i64;
    if (ix + iz) % 2 == 0 {
        CHECKER_LIGHT
    } else {
        CHECKER_DARK
    }
}

/// Spherical texture coordinates of a unit normal, both in `[0, 1]`.
pub fn sphere_uv(normal: Vec3) -> (f64, f64) {
    let u = 0.5 + normal.z.atan2(normal.x) / (2.0 * PI);
    let v = 0.5 + normal.y.clamp(-1.0, 1.0).asin() / PI;
    (u, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_lighting_facing_light_without_specular() {
        let material = Material {
            specular: false,
            ..Material::with_color(Vec3::new(1.0, 0.0, 0.0))
        };
        let color = lighting(
            material.color,
            &material,
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::y_axis(),
            Vec3::zero(),
            Vec3::y_axis(),
        );
        assert!((color - Vec3::new(1.2, 0.0, 0.0)).len() < 1e-9);
    }

    #[test]
    fn test_lighting_back_side_is_ambient_only() {
        let material = Material::with_color(Vec3::new(0.0, 1.0, 0.0));
        let color = lighting(
            material.color,
            &material,
            Vec3::new(0.0, -10.0, 0.0),
            Vec3::y_axis(),
            Vec3::zero(),
            Vec3::y_axis(),
        );
        assert!((color - Vec3::new(0.0, 0.2, 0.0)).len() < 1e-9);
    }

    #[test]
    fn test_specular_highlight_is_white() {
        let material = Material::with_color(Vec3::zero());
        // light and viewer on the mirror direction of each other
        let color = lighting(
            material.color,
            &material,
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0).normalize(),
            Vec3::zero(),
            Vec3::y_axis(),
        );
        assert!((color - Vec3::one()).len() < 1e-9);
    }

    #[test]
    fn test_checker_alternates() {
        let a = checker_color(Vec3::new(1.0, -15.0, 1.0));
        let b = checker_color(Vec3::new(6.0, -15.0, 1.0));
        let c = checker_color(Vec3::new(6.0, -15.0, 6.0));
        assert_eq!(a, CHECKER_LIGHT);
        assert_eq!(b, CHECKER_DARK);
        assert_eq!(c, CHECKER_LIGHT);
    }

    #[test]
    fn test_checker_negative_odd_sum_is_dark() {
        // ix = -2, iz = 1, the remainder is -1
        assert_eq!(checker_color(Vec3::new(-70.0, 0.0, 6.0)), CHECKER_DARK);
    }

    #[test]
    fn test_sphere_uv_known_points() {
        let (u, v) = sphere_uv(Vec3::new(1.0, 0.0, 0.0));
        assert!((u - 0.5).abs() < 1e-9 && (v - 0.5).abs() < 1e-9);
        let (_, v) = sphere_uv(Vec3::y_axis());
        assert!((v - 1.0).abs() < 1e-9);
        let (u, _) = sphere_uv(Vec3::new(0.0, 0.0, 1.0));
        assert!((u - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_sphere_uv_in_unit_square() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let n = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if n.len() < 1e-3 {
                continue;
            }
            let (u, v) = sphere_uv(n.normalize());
            assert!((0.0..=1.0).contains(&u));
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
