use std::ops::Range;
use std::sync::Arc;

use crate::{Axis, Hit, HitList, Hittable, Material, Ray, Vec3};

#[derive(Debug)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
    pub material: Arc<Material>,
}
impl Sphere {
    pub fn new(center: Vec3, radius: f64, material: Arc<Material>) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
    pub fn from(c: [f64; 3], radius: f64, material: Arc<Material>) -> Self {
        Self::new(c.into(), radius, material)
    }
}
impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, hit_time: &Range<f64>) -> Option<Hit> {
        let oc = ray.origin - self.center;
        let a = ray.dir.norm_squared();
        let half_b = oc.dot(ray.dir);
        let c = oc.norm_squared() - self.radius.powi(2);
        let disciminant = half_b.powi(2) - a * c;

        if disciminant < 0. {
            return None;
        }

        let root = disciminant.sqrt();
        let hit = |t| {
            let outward_normal = (ray.at(t) - self.center) / self.radius;
            Some(Hit::ray(t, outward_normal, ray, &self.material))
        };

        // Prefer the nearer root
        let t = (-half_b - root) / a;
        if hit_time.contains(&t) {
            return hit(t);
        }

        let t = (-half_b + root) / a;
        if hit_time.contains(&t) {
            return hit(t);
        }

        None
    }
}

/// The coordinate plane an `AxisAlignedRect` lies parallel to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Plane {
    XY,
    XZ,
    YZ,
}
impl Plane {
    /// The two in-plane axes followed by the fixed axis.
    pub fn axes(self) -> (Axis, Axis, Axis) {
        match self {
            Plane::XY => (Axis::X, Axis::Y, Axis::Z),
            Plane::XZ => (Axis::X, Axis::Z, Axis::Y),
            Plane::YZ => (Axis::Y, Axis::Z, Axis::X),
        }
    }
}

/// Rectangle `a0..=a1` by `b0..=b1` on the plane where the fixed axis equals `k`.
/// `a` and `b` are the in-plane axes in the order given by `Plane::axes`.
#[derive(Debug)]
pub struct AxisAlignedRect {
    pub plane: Plane,
    pub a0: f64,
    pub a1: f64,
    pub b0: f64,
    pub b1: f64,
    pub k: f64,
    pub material: Arc<Material>,
}
impl AxisAlignedRect {
    pub fn new(plane: Plane, a: (f64, f64), b: (f64, f64), k: f64, material: Arc<Material>) -> Self {
        Self {
            plane,
            a0: a.0,
            a1: a.1,
            b0: b.0,
            b1: b.1,
            k,
            material,
        }
    }

    pub fn xy(x: (f64, f64), y: (f64, f64), z: f64, material: Arc<Material>) -> Self {
        Self::new(Plane::XY, x, y, z, material)
    }

    pub fn xz(x: (f64, f64), z: (f64, f64), y: f64, material: Arc<Material>) -> Self {
        Self::new(Plane::XZ, x, z, y, material)
    }

    pub fn yz(y: (f64, f64), z: (f64, f64), x: f64, material: Arc<Material>) -> Self {
        Self::new(Plane::YZ, y, z, x, material)
    }
}
impl Hittable for AxisAlignedRect {
    fn hit(&self, ray: &Ray, hit_time: &Range<f64>) -> Option<Hit> {
        let (a_axis, b_axis, k_axis) = self.plane.axes();

        // A ray parallel to the plane gives an infinite or NaN `t`, which no range contains
        let t = (self.k - ray.origin[k_axis]) / ray.dir[k_axis];
        if !hit_time.contains(&t) {
            return None;
        }

        let a = ray.origin[a_axis] + t * ray.dir[a_axis];
        let b = ray.origin[b_axis] + t * ray.dir[b_axis];
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return None;
        }

        let mut outward_normal = Vec3::ORIGIN;
        outward_normal[k_axis] = 1.;
        Some(Hit::ray(t, outward_normal, ray, &self.material))
    }
}

/// Axis-aligned box made of six rectangles spanning two opposite corners.
#[derive(Debug)]
pub struct Cuboid {
    pub min: Vec3,
    pub max: Vec3,
    sides: HitList,
}
impl Cuboid {
    /// `p0` and `p1` are any two opposite corners.
    pub fn new(p0: Vec3, p1: Vec3, material: Arc<Material>) -> Self {
        let min = Vec3::new(p0.x.min(p1.x), p0.y.min(p1.y), p0.z.min(p1.z));
        let max = Vec3::new(p0.x.max(p1.x), p0.y.max(p1.y), p0.z.max(p1.z));
        let (p0, p1) = (min, max);

        let mut sides = HitList::new();
        let (x, y, z) = ((p0.x, p1.x), (p0.y, p1.y), (p0.z, p1.z));

        sides.push(AxisAlignedRect::xy(x, y, p1.z, material.clone()));
        sides.push(AxisAlignedRect::xy(x, y, p0.z, material.clone()));

        sides.push(AxisAlignedRect::xz(x, z, p1.y, material.clone()));
        sides.push(AxisAlignedRect::xz(x, z, p0.y, material.clone()));

        sides.push(AxisAlignedRect::yz(y, z, p1.x, material.clone()));
        sides.push(AxisAlignedRect::yz(y, z, p0.x, material));

        Self { min, max, sides }
    }

    pub fn from(p0: [f64; 3], p1: [f64; 3], material: Arc<Material>) -> Self {
        Self::new(p0.into(), p1.into(), material)
    }
}
impl Hittable for Cuboid {
    fn hit(&self, ray: &Ray, hit_time: &Range<f64>) -> Option<Hit> {
        self.sides.hit(ray, hit_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{DiffuseLight, Lambertian};
    use crate::Color;

    const ALL: Range<f64> = 0.001..f64::INFINITY;

    fn white() -> Arc<Material> {
        Arc::new(Lambertian::new(Color::new(0.73, 0.73, 0.73)).into())
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn sphere_entry_hit() {
        let sphere = Sphere::from([0., 0., 0.], 1., white());
        let ray = Ray::new(Vec3::new(0., 0., -5.), Vec3::UNIT_Z);

        let hit = sphere.hit(&ray, &ALL).unwrap();
        assert!((hit.t - 4.).abs() < 1e-9);
        assert!(approx(hit.normal, Vec3::new(0., 0., -1.)));
        assert!(hit.front_face);
    }

    #[test]
    fn sphere_hit_with_unnormalized_direction() {
        let sphere = Sphere::from([0., 0., 0.], 1., white());
        let ray = Ray::new(Vec3::new(0., 0., -5.), Vec3::new(0., 0., 2.));

        let hit = sphere.hit(&ray, &ALL).unwrap();
        assert!((hit.t - 2.).abs() < 1e-9);
        assert!(approx(hit.point, Vec3::new(0., 0., -1.)));
    }

    #[test]
    fn sphere_miss() {
        let sphere = Sphere::from([0., 0., 0.], 1., white());
        let ray = Ray::new(Vec3::new(5., 5., 5.), Vec3::UNIT_Z);
        assert!(sphere.hit(&ray, &ALL).is_none());
    }

    #[test]
    fn sphere_falls_back_to_far_root() {
        let sphere = Sphere::from([0., 0., 0.], 1., white());
        let ray = Ray::new(Vec3::new(0., 0., -5.), Vec3::UNIT_Z);

        // Nearer root at t = 4 is excluded
        let hit = sphere.hit(&ray, &(4.5..f64::INFINITY)).unwrap();
        assert!((hit.t - 6.).abs() < 1e-9);
        assert!(!hit.front_face);
        assert!(approx(hit.normal, Vec3::new(0., 0., -1.)));

        assert!(sphere.hit(&ray, &(0.001..3.)).is_none());
    }

    #[test]
    fn light_rect_hit_from_above() {
        let light = Arc::new(DiffuseLight::new(Color::WHITE, 15.).into());
        let rect = AxisAlignedRect::xz((213., 343.), (227., 332.), 554., light);
        let ray = Ray::new(Vec3::new(278., 1000., 278.), -Vec3::UNIT_Y);

        let hit = rect.hit(&ray, &ALL).unwrap();
        assert!((hit.point.y - 554.).abs() < 1e-9);
        assert!((hit.t - 446.).abs() < 1e-9);
        assert!(approx(hit.normal, Vec3::UNIT_Y));
        assert!(hit.material.emitted().is_some());
    }

    #[test]
    fn rect_rejects_outside_bounds_and_parallel_rays() {
        let rect = AxisAlignedRect::xz((213., 343.), (227., 332.), 554., white());

        let outside = Ray::new(Vec3::new(100., 1000., 278.), -Vec3::UNIT_Y);
        assert!(rect.hit(&outside, &ALL).is_none());

        let parallel = Ray::new(Vec3::new(0., 554., 278.), Vec3::UNIT_X);
        assert!(rect.hit(&parallel, &ALL).is_none());

        let behind = Ray::new(Vec3::new(278., 1000., 278.), Vec3::UNIT_Y);
        assert!(rect.hit(&behind, &ALL).is_none());
    }

    #[test]
    fn rect_normal_faces_the_ray() {
        let rect = AxisAlignedRect::yz((0., 555.), (0., 555.), 555., white());
        let ray = Ray::new(Vec3::new(278., 278., 278.), Vec3::UNIT_X);

        let hit = rect.hit(&ray, &ALL).unwrap();
        assert!(!hit.front_face);
        assert!(approx(hit.normal, -Vec3::UNIT_X));
    }

    #[test]
    fn cuboid_returns_nearest_face() {
        let cuboid = Cuboid::from([130., 0., 65.], [295., 330., 230.], white());
        let ray = Ray::new(Vec3::new(200., 100., -800.), Vec3::UNIT_Z);

        let hit = cuboid.hit(&ray, &ALL).unwrap();
        assert!((hit.point.z - 65.).abs() < 1e-9);
        assert!(approx(hit.normal, -Vec3::UNIT_Z));
    }

    #[test]
    fn cuboid_miss() {
        let cuboid = Cuboid::from([130., 0., 65.], [295., 330., 230.], white());
        let ray = Ray::new(Vec3::new(500., 100., -800.), Vec3::UNIT_Z);
        assert!(cuboid.hit(&ray, &ALL).is_none());
    }

    #[test]
    fn cuboid_corners_in_any_order() {
        let cuboid = Cuboid::from([295., 330., 65.], [130., 0., 230.], white());
        assert_eq!(cuboid.min, Vec3::new(130., 0., 65.));
        assert_eq!(cuboid.max, Vec3::new(295., 330., 230.));

        let ray = Ray::new(Vec3::new(200., 100., -800.), Vec3::UNIT_Z);
        let hit = cuboid.hit(&ray, &ALL).unwrap();
        assert!((hit.point.z - 65.).abs() < 1e-9);
        assert!(approx(hit.normal, -Vec3::UNIT_Z));
    }
}
