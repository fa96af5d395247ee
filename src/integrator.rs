use std::ops::Range;

use crate::{Color, CrateRng, Hittable, Ray};

/// Rays ignore hits closer than this to their origin to avoid shadow acne.
pub const T_MIN: f64 = 0.001;

/// Estimates the radiance arriving along `ray`, following at most `depth` bounces.
///
/// The box has no sky, so a ray escaping the scene carries no light.
pub fn ray_color(ray: &Ray, world: &dyn Hittable, depth: u32, rng: &mut CrateRng) -> Color {
    if depth == 0 {
        return Color::BLACK;
    }

    let hit_time: Range<f64> = T_MIN..f64::INFINITY;
    let hit = match world.hit(ray, &hit_time) {
        Some(hit) => hit,
        None => return Color::BLACK,
    };

    if let Some(emitted) = hit.material.emitted() {
        return emitted;
    }

    match hit.material.scatter(ray, &hit, rng) {
        Some(scatter) => {
            scatter.attenuation * ray_color(&scatter.ray, world, depth - 1, rng)
        }
        None => Color::BLACK,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::SeedableRng;

    use super::*;
    use crate::material::{DiffuseLight, Lambertian, Metal};
    use crate::shape::{AxisAlignedRect, Sphere};
    use crate::{HitList, Material, Vec3};

    fn rng() -> CrateRng {
        CrateRng::seed_from_u64(3)
    }

    fn light(intensity: f64) -> Arc<Material> {
        Arc::new(DiffuseLight::new(Color::WHITE, intensity).into())
    }

    #[test]
    fn zero_depth_is_black() {
        let mut world = HitList::new();
        world.push(Sphere::from([0., 0., 0.], 1., light(15.)));
        let ray = Ray::new(Vec3::new(0., 0., -5.), Vec3::UNIT_Z);
        assert_eq!(ray_color(&ray, &world, 0, &mut rng()), Color::BLACK);
    }

    #[test]
    fn miss_is_black() {
        let world = HitList::new();
        let ray = Ray::new(Vec3::ORIGIN, Vec3::UNIT_Z);
        assert_eq!(ray_color(&ray, &world, 5, &mut rng()), Color::BLACK);
    }

    #[test]
    fn light_returns_emission_directly() {
        let mut world = HitList::new();
        world.push(Sphere::from([0., 0., 0.], 1., light(7.)));
        let ray = Ray::new(Vec3::new(0., 0., -5.), Vec3::UNIT_Z);
        assert_eq!(
            ray_color(&ray, &world, 1, &mut rng()),
            Color::new(7., 7., 7.)
        );
    }

    #[test]
    fn diffuse_surface_needs_a_second_bounce() {
        let mut world = HitList::new();
        world.push(Sphere::from(
            [0., 0., 0.],
            1.,
            Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)).into()),
        ));
        let ray = Ray::new(Vec3::new(0., 0., -5.), Vec3::UNIT_Z);
        assert_eq!(ray_color(&ray, &world, 1, &mut rng()), Color::BLACK);
    }

    #[test]
    fn mirror_attenuates_reflected_light() {
        // A mirror floor reflecting a light panel straight above the camera's aim point
        let mut world = HitList::new();
        world.push(AxisAlignedRect::xz(
            (-10., 10.),
            (-10., 10.),
            0.,
            Arc::new(Metal::from([0.5, 0.25, 1.], 0.).into()),
        ));
        world.push(AxisAlignedRect::xz((-100., 100.), (-100., 100.), 10., light(2.)));

        let ray = Ray::new(Vec3::new(0., 5., -5.), Vec3::new(0., -1., 1.));
        let color = ray_color(&ray, &world, 2, &mut rng());
        assert_eq!(color, Color::new(1., 0.5, 2.));

        // One bounce only reaches the mirror
        assert_eq!(ray_color(&ray, &world, 1, &mut rng()), Color::BLACK);
    }
}
