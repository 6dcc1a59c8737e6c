use super::math::{Ray, Vec3};

pub const DEFAULT_DIVISIONS: u32 = 500;

/// A pinhole camera looking down the negative z axis through a square image plane.
///
/// The image plane spans `[min, max]` on both axes at `distance` in front of the eye and
/// is split in `divisions` x `divisions` cells, one per output pixel.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub eye: Vec3,
    pub distance: f64,
    pub min: f64,
    pub max: f64,
    pub divisions: u32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            eye: Vec3::new(0.0, 0.0, 40.0),
            distance: 40.0,
            min: -10.0,
            max: 10.0,
            divisions: DEFAULT_DIVISIONS,
        }
    }
}

impl Camera {
    pub fn with_divisions(divisions: u32) -> Self {
        Camera {
            divisions,
            ..Default::default()
        }
    }

    /// Side of a single cell of the image plane.
    pub fn cell_size(&self) -> f64 {
        (self.max - self.min) / self.divisions as f64
    }

    /// Bottom left corner of the cell shown by pixel (x, y), where y = 0 is the top row.
    pub fn cell_corner(&self, x: u32, y: u32) -> (f64, f64) {
        let cell = self.cell_size();
        let row_from_bottom = self.divisions - 1 - y;
        (
            self.min + x as f64 * cell,
            self.min + row_from_bottom as f64 * cell,
        )
    }

    /// Create a primary ray from the eye through the point (px, py) of the image plane.
    pub fn shoot_to(&self, px: f64, py: f64) -> Ray {
        Ray::new(self.eye, Vec3::new(px, py, -self.distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_corners() {
        let camera = Camera::with_divisions(4);
        assert!((camera.cell_size() - 5.0).abs() < 1e-12);
        assert_eq!(camera.cell_corner(0, 3), (-10.0, -10.0));
        assert_eq!(camera.cell_corner(3, 0), (5.0, 5.0));
    }

    #[test]
    fn test_center_ray_points_down_z() {
        let camera = Camera::default();
        let ray = camera.shoot_to(0.0, 0.0);
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 40.0));
        assert!((ray.direction - Vec3::new(0.0, 0.0, -1.0)).len() < 1e-12);
    }
}
