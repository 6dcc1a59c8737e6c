use std::vec::Vec;

use thiserror::Error;

use super::math::{Ray, Vec3};

/// Intersections closer than this are discarded to avoid self intersection (shadow acne).
pub const EPSILON: f64 = 1e-3;

// below this value the quadratic is considered without real roots
const DISCRIMINANT_EPSILON: f64 = 1e-3;

// below this value a denominator is considered zero
const PARALLEL_EPSILON: f64 = 1e-4;

// points whose height is this close to the top of a cylinder are considered on the cap
const CAP_EPSILON: f64 = 1e-6;

pub const DEFAULT_SHININESS: f64 = 50.0;
pub const DEFAULT_COEFFICIENT: f64 = 0.8;

#[derive(Error, Debug, PartialEq)]
pub enum SceneError {
    #[error("object {index}: radius must be positive, got {radius}")]
    NonPositiveRadius { index: usize, radius: f64 },

    #[error("object {index}: height must be positive, got {height}")]
    NonPositiveHeight { index: usize, height: f64 },

    #[error("object {index}: the plane corners do not span a surface")]
    DegeneratePlane { index: usize },

    #[error("object {index}: {what} must be in [0, 1], got {value}")]
    CoefficientOutOfRange {
        index: usize,
        what: &'static str,
        value: f64,
    },

    #[error("object {index}: contains non finite values")]
    NonFinite { index: usize },

    #[error("{role} object index {index} is out of range ({count} objects)")]
    MissingObject {
        role: &'static str,
        index: usize,
        count: usize,
    },

    #[error("the textured object {index} must be a sphere")]
    TexturedNotSphere { index: usize },
}

pub struct Light {
    pub position: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Vec3,
    pub specular: bool,
    pub shininess: f64,
    /// reflection coefficient, `None` when the surface is not a mirror
    pub reflective: Option<f64>,
    /// transparency coefficient, `None` when the surface is opaque
    pub transparent: Option<f64>,
    pub refractive: bool,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            color: Vec3::one(),
            specular: true,
            shininess: DEFAULT_SHININESS,
            reflective: None,
            transparent: None,
            refractive: false,
        }
    }
}

impl Material {
    pub fn with_color(color: Vec3) -> Self {
        Material {
            color,
            ..Default::default()
        }
    }

    /// Transparent and refractive occluders let part of the light through.
    pub fn lets_light_through(&self) -> bool {
        self.refractive || self.transparent.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Solid {
    Sphere {
        center: Vec3,
        radius: f64,
    },
    /// A planar quadrilateral with corners given in winding order.
    Plane {
        corners: [Vec3; 4],
        normal: Vec3,
    },
    /// A vertical cylinder standing on `base` without the bottom cap.
    Cylinder {
        base: Vec3,
        radius: f64,
        height: f64,
    },
    /// A vertical cone with its circular base centered in `base` and the apex `height` above it.
    Cone {
        base: Vec3,
        radius: f64,
        height: f64,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct SceneObject {
    pub solid: Solid,
    pub material: Material,
}

impl SceneObject {
    pub fn new(solid: Solid, material: Material) -> Self {
        SceneObject { solid, material }
    }
}

pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub light: Light,
    /// object that receives the checkerboard pattern
    pub floor: Option<usize>,
    /// sphere that receives the texture
    pub textured: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct RaycastResult<'a> {
    pub index: usize,
    pub hitted_object: &'a SceneObject,
    pub hit_point: Vec3,
    pub distance: f64,
}

impl Solid {
    pub fn plane(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Solid {
        let normal = (b - a).cross(d - a).normalize();
        Solid::Plane {
            corners: [a, b, c, d],
            normal,
        }
    }

    /// Distance along the ray of the closest valid intersection.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let t = match *self {
            Solid::Sphere { center, radius } => intersect_sphere(center, radius, ray),
            Solid::Plane { corners, normal } => intersect_plane(&corners, normal, ray),
            Solid::Cylinder {
                base,
                radius,
                height,
            } => intersect_cylinder(base, radius, height, ray),
            Solid::Cone {
                base,
                radius,
                height,
            } => intersect_cone(base, radius, height, ray),
        }?;
        if t > EPSILON && t.is_finite() {
            Some(t)
        } else {
            None
        }
    }

    /// Unit normal at `point`, the point is assumed to lie on the surface.
    pub fn normal(&self, point: Vec3) -> Vec3 {
        match *self {
            Solid::Sphere { center, .. } => (point - center).normalize(),
            Solid::Plane { normal, .. } => normal,
            Solid::Cylinder { base, height, .. } => {
                if (point.y - (base.y + height)).abs() < CAP_EPSILON {
                    return Vec3::y_axis();
                }
                Vec3::new(point.x - base.x, 0.0, point.z - base.z).normalize()
            }
            Solid::Cone {
                base,
                radius,
                height,
            } => {
                let alpha = (point.x - base.x).atan2(point.z - base.z);
                let theta = (radius / height).atan();
                Vec3::new(
                    alpha.sin() * theta.cos(),
                    theta.sin(),
                    alpha.cos() * theta.cos(),
                )
            }
        }
    }

    fn validate(&self, index: usize) -> Result<(), SceneError> {
        let finite = match *self {
            Solid::Sphere { center, radius } => center.is_finite() && radius.is_finite(),
            Solid::Plane { corners, normal } => {
                corners.iter().all(|c| c.is_finite()) && normal.is_finite()
            }
            Solid::Cylinder {
                base,
                radius,
                height,
            }
            | Solid::Cone {
                base,
                radius,
                height,
            } => base.is_finite() && radius.is_finite() && height.is_finite(),
        };
        if !finite {
            // a plane with collinear corners ends up with a NaN normal
            if let Solid::Plane { corners, .. } = self {
                if corners.iter().all(|c| c.is_finite()) {
                    return Err(SceneError::DegeneratePlane { index });
                }
            }
            return Err(SceneError::NonFinite { index });
        }

        match *self {
            Solid::Sphere { radius, .. } if radius <= 0.0 => {
                Err(SceneError::NonPositiveRadius { index, radius })
            }
            Solid::Cylinder { radius, .. } | Solid::Cone { radius, .. } if radius <= 0.0 => {
                Err(SceneError::NonPositiveRadius { index, radius })
            }
            Solid::Cylinder { height, .. } | Solid::Cone { height, .. } if height <= 0.0 => {
                Err(SceneError::NonPositiveHeight { index, height })
            }
            _ => Ok(()),
        }
    }
}

fn intersect_sphere(center: Vec3, radius: f64, ray: &Ray) -> Option<f64> {
    // the ray direction is unit length so the quadratic has a = 1
    let oc = ray.origin - center;
    let b = ray.direction.dot(oc);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - c;
    if discriminant.abs() < DISCRIMINANT_EPSILON || discriminant < 0.0 {
        return None;
    }

    let t1 = -b - discriminant.sqrt();
    let t2 = -b + discriminant.sqrt();
    [t1, t2].into_iter().find(|t| *t > EPSILON)
}

fn intersect_plane(corners: &[Vec3; 4], normal: Vec3, ray: &Ray) -> Option<f64> {
    let dv = ray.direction.dot(normal);
    if dv.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = (corners[0] - ray.origin).dot(normal) / dv;
    if t < 0.0 {
        return None;
    }
    let point = ray.at(t);
    if is_inside_quad(corners, normal, point) {
        Some(t)
    } else {
        None
    }
}

/// The point is inside when it lies on the same side of every edge.
fn is_inside_quad(corners: &[Vec3; 4], normal: Vec3, point: Vec3) -> bool {
    (0..4).all(|i| {
        let from = corners[i];
        let to = corners[(i + 1) % 4];
        (to - from).cross(point - from).dot(normal) > 0.0
    })
}

fn intersect_cylinder(base: Vec3, radius: f64, height: f64, ray: &Ray) -> Option<f64> {
    let (o, d) = (ray.origin, ray.direction);
    let dx = o.x - base.x;
    let dz = o.z - base.z;
    let a = d.x * d.x + d.z * d.z;
    let b = 2.0 * (d.x * dx + d.z * dz);
    let c = dx * dx + dz * dz - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < DISCRIMINANT_EPSILON {
        return None;
    }

    let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
    let t2 = (-b + discriminant.sqrt()) / (2.0 * a);
    let top = base.y + height;
    let within = |t: f64| {
        let h = o.y + t * d.y;
        h >= base.y && h <= top
    };

    if within(t1) && t1 > EPSILON {
        return Some(t1);
    }
    if within(t2) && t2 > EPSILON {
        // seen from inside, the far wall is replaced by the plane of the top cap
        if d.y.abs() < PARALLEL_EPSILON {
            return None;
        }
        return Some((top - o.y) / d.y);
    }
    None
}

fn intersect_cone(base: Vec3, radius: f64, height: f64, ray: &Ray) -> Option<f64> {
    let (o, d) = (ray.origin, ray.direction);
    let dx = o.x - base.x;
    let dz = o.z - base.z;
    // distance of the origin from the apex along the axis
    let yd = height - o.y + base.y;
    let tan = (radius / height) * (radius / height);

    let a = d.x * d.x + d.z * d.z - tan * d.y * d.y;
    let b = 2.0 * (dx * d.x + dz * d.z + tan * yd * d.y);
    let c = dx * dx + dz * dz - tan * yd * yd;
    let within = |t: f64| {
        let h = o.y + t * d.y;
        h >= base.y && h <= base.y + height
    };

    // parallel to a side of the cone: the quadratic degenerates to b t + c = 0
    if a.abs() < PARALLEL_EPSILON {
        if b.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = -c / b;
        return Some(t).filter(|t| *t > EPSILON && within(*t));
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < DISCRIMINANT_EPSILON {
        return None;
    }

    let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
    let t2 = (-b + discriminant.sqrt()) / (2.0 * a);
    let (near, far) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
    [near, far]
        .into_iter()
        .find(|t| *t > EPSILON && within(*t))
}

impl Scene {
    pub fn new(objects: Vec<SceneObject>, light: Vec3) -> Result<Scene, SceneError> {
        for (index, object) in objects.iter().enumerate() {
            object.solid.validate(index)?;
            let m = &object.material;
            for (what, value) in [("reflection", m.reflective), ("transparency", m.transparent)] {
                if let Some(value) = value {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(SceneError::CoefficientOutOfRange { index, what, value });
                    }
                }
            }
        }
        Ok(Scene {
            objects,
            light: Light { position: light },
            floor: None,
            textured: None,
        })
    }

    /// Marks the object that is painted with the checkerboard pattern.
    pub fn with_floor(mut self, index: usize) -> Result<Scene, SceneError> {
        self.check_index("floor", index)?;
        self.floor = Some(index);
        Ok(self)
    }

    /// Marks the sphere that is painted with the texture.
    pub fn with_textured(mut self, index: usize) -> Result<Scene, SceneError> {
        self.check_index("textured", index)?;
        if !matches!(self.objects[index].solid, Solid::Sphere { .. }) {
            return Err(SceneError::TexturedNotSphere { index });
        }
        self.textured = Some(index);
        Ok(self)
    }

    fn check_index(&self, role: &'static str, index: usize) -> Result<(), SceneError> {
        if index >= self.objects.len() {
            return Err(SceneError::MissingObject {
                role,
                index,
                count: self.objects.len(),
            });
        }
        Ok(())
    }
}

/// Finds the closest object hit by the ray, on equal distances the first object in the scene wins.
pub fn closest_hit<'a>(scene: &'a Scene, ray: &Ray) -> Option<RaycastResult<'a>> {
    let mut closest: Option<(usize, f64)> = None;
    for (index, object) in scene.objects.iter().enumerate() {
        if let Some(t) = object.solid.intersect(ray) {
            if closest.map_or(true, |(_, closest_t)| t < closest_t) {
                closest = Some((index, t));
            }
        }
    }

    closest.map(|(index, distance)| RaycastResult {
        index,
        hitted_object: &scene.objects[index],
        hit_point: ray.at(distance),
        distance,
    })
}
