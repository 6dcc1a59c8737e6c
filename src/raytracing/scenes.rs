use super::core::{Material, Scene, SceneError, SceneObject, Solid, DEFAULT_COEFFICIENT};
use super::math::Vec3;

/// Image mapped on the textured sphere of the room.
pub const CLASSROOM_TEXTURE: &str = "Disco.bmp";

/// A closed room with a checkered floor, two mirror walls and a few objects in front of the camera.
pub fn classroom() -> Result<Scene, SceneError> {
    let matte = |color: Vec3| Material {
        specular: false,
        ..Material::with_color(color)
    };
    let mirror = Material {
        specular: false,
        reflective: Some(DEFAULT_COEFFICIENT),
        ..Material::with_color(Vec3::zero())
    };
    let wall = |a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3], material: Material| {
        SceneObject::new(
            Solid::plane(a.into(), b.into(), c.into(), d.into()),
            material,
        )
    };

    let objects = vec![
        // textured sphere
        SceneObject::new(
            Solid::Sphere {
                center: Vec3::new(-5.0, 0.0, -90.0),
                radius: 4.0,
            },
            Material::with_color(Vec3::new(0.0, 0.0, 1.0)),
        ),
        SceneObject::new(
            Solid::Sphere {
                center: Vec3::new(5.0, 5.0, -70.0),
                radius: 4.0,
            },
            Material {
                shininess: 5.0,
                transparent: Some(0.8),
                ..Material::with_color(Vec3::new(1.0, 0.0, 0.0))
            },
        ),
        SceneObject::new(
            Solid::Sphere {
                center: Vec3::new(0.0, -10.0, -45.0),
                radius: 5.0,
            },
            Material {
                refractive: true,
                ..Material::with_color(Vec3::zero())
            },
        ),
        // floor
        wall(
            [-40.0, -15.0, 40.0],
            [40.0, -15.0, 40.0],
            [40.0, -15.0, -220.0],
            [-40.0, -15.0, -220.0],
            Material::default(),
        ),
        // roof
        wall(
            [-40.0, 30.0, 40.0],
            [40.0, 30.0, 40.0],
            [40.0, 30.0, -220.0],
            [-40.0, 30.0, -220.0],
            matte(Vec3::one()),
        ),
        // left
        wall(
            [-40.0, 30.0, 40.0],
            [-40.0, -15.0, 40.0],
            [-40.0, -15.0, -220.0],
            [-40.0, 30.0, -220.0],
            matte(Vec3::new(0.8, 0.0, 0.0)),
        ),
        // right
        wall(
            [40.0, 30.0, 40.0],
            [40.0, 30.0, -220.0],
            [40.0, -15.0, -220.0],
            [40.0, -15.0, 40.0],
            matte(Vec3::new(0.0, 0.0, 0.8)),
        ),
        // back
        wall(
            [-40.0, 30.0, -220.0],
            [-40.0, -15.0, -220.0],
            [40.0, -15.0, -220.0],
            [40.0, 30.0, -220.0],
            mirror,
        ),
        // behind the camera
        wall(
            [-40.0, 30.0, 40.0],
            [40.0, 30.0, 40.0],
            [40.0, -15.0, 40.0],
            [-40.0, -15.0, 40.0],
            Material {
                specular: true,
                ..mirror
            },
        ),
        SceneObject::new(
            Solid::Cylinder {
                base: Vec3::new(18.0, -15.0, -60.0),
                radius: 5.0,
                height: 5.0,
            },
            Material::with_color(Vec3::new(0.0, 0.0, 1.0)),
        ),
        SceneObject::new(
            Solid::Cone {
                base: Vec3::new(-30.0, -15.0, -160.0),
                radius: 5.0,
                height: 10.0,
            },
            Material::with_color(Vec3::new(0.0, 1.0, 0.0)),
        ),
    ];

    Scene::new(objects, Vec3::new(0.0, 29.0, -40.0))?
        .with_textured(0)?
        .with_floor(3)
}
