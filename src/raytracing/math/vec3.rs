use std::ops;

/// A three component vector, used both for points/directions and for RGB colors.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<[f64; 3]> for Vec3 {
    #[inline(always)]
    fn from(value: [f64; 3]) -> Self {
        Vec3::new(value[0], value[1], value[2])
    }
}

impl ops::Add<Vec3> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Vec3) -> Self::Output {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl ops::AddAssign<Vec3> for Vec3 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl ops::Sub<Vec3> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Vec3) -> Self::Output {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl ops::Neg for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl ops::Mul<f64> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: f64) -> Self::Output {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl ops::Mul<Vec3> for f64 {
    type Output = Vec3;

    #[inline(always)]
    fn mul(self, rhs: Vec3) -> Self::Output {
        rhs * self
    }
}

impl ops::Mul<Vec3> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Vec3) -> Self::Output {
        Vec3::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl ops::Div<f64> for Vec3 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: f64) -> Self::Output {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Vec3 {
    #[inline(always)]
    pub const fn new(x: f64, y: f64, z: f64) -> Vec3 {
        Vec3 { x, y, z }
    }

    #[inline(always)]
    pub const fn zero() -> Vec3 {
        Vec3::new(0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn one() -> Vec3 {
        Vec3::new(1.0, 1.0, 1.0)
    }

    #[inline(always)]
    pub const fn y_axis() -> Vec3 {
        Vec3::new(0.0, 1.0, 0.0)
    }

    #[inline(always)]
    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline(always)]
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline(always)]
    pub fn len(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[inline(always)]
    pub fn normalize(self) -> Vec3 {
        self / self.len()
    }

    /// Mirror this direction about `axis` (expected to be unit length).
    #[inline(always)]
    pub fn reflect(self, axis: Vec3) -> Vec3 {
        self - axis * 2.0 * self.dot(axis)
    }

    /// Bend this (unit) direction through a surface with unit `normal`, where `eta` is the
    /// ratio of the refractive indices. Returns `None` on total internal reflection.
    pub fn refract(self, normal: Vec3, eta: f64) -> Option<Vec3> {
        let cos_i = normal.dot(self);
        let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
        if k < 0.0 {
            return None;
        }
        Some(self * eta - normal * (eta * cos_i + k.sqrt()))
    }

    /// Linear interpolation: `t = 0` gives `self`, `t = 1` gives `other`.
    #[inline(always)]
    pub fn lerp(self, other: Vec3, t: f64) -> Vec3 {
        self * (1.0 - t) + other * t
    }

    /// Clamp each component into `[0, 1]`.
    pub fn saturate(self) -> Vec3 {
        Vec3::new(
            self.x.clamp(0.0, 1.0),
            self.y.clamp(0.0, 1.0),
            self.z.clamp(0.0, 1.0),
        )
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).len() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_reflect_flips_normal_component() {
        let d = Vec3::new(1.0, -1.0, 0.0);
        assert_close(d.reflect(Vec3::y_axis()), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_refract_with_unit_ratio_keeps_direction() {
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let refracted = d.refract(Vec3::y_axis(), 1.0).unwrap();
        assert_close(refracted, d);
    }

    #[test]
    fn test_refract_bends_toward_normal_when_entering() {
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let refracted = d.refract(Vec3::y_axis(), 1.0 / 1.5).unwrap();
        assert!((refracted.len() - 1.0).abs() < 1e-9);
        // smaller tangential component than the incoming ray
        assert!(refracted.x < d.x);
        assert!(refracted.y < 0.0);
    }

    #[test]
    fn test_total_internal_reflection() {
        let grazing = Vec3::new(1.0, -0.05, 0.0).normalize();
        assert!(grazing.refract(Vec3::y_axis(), 1.5).is_none());
    }

    #[test]
    fn test_lerp_and_saturate() {
        let a = Vec3::zero();
        let b = Vec3::new(2.0, 4.0, -2.0);
        assert_close(a.lerp(b, 0.5), Vec3::new(1.0, 2.0, -1.0));
        assert_close(b.saturate(), Vec3::new(1.0, 1.0, 0.0));
    }
}
