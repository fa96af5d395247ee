use std::fmt::Debug;
use std::ops::Range;

use crate::{Material, Ray, Vec3};

pub struct Hit<'a> {
    pub point: Vec3,
    /// A unit-length normal vector, always pointing against the incident ray
    pub normal: Vec3,
    /// Ray parameter of the hit
    pub t: f64,
    /// Hit the front face or back face of object
    pub front_face: bool,
    /// The material that was hit
    pub material: &'a Material,
}
impl<'a> Hit<'a> {
    pub fn new(
        point: Vec3,
        normal: Vec3,
        t: f64,
        front_face: bool,
        material: &'a Material,
    ) -> Self {
        Self {
            point,
            normal,
            t,
            front_face,
            material,
        }
    }

    /// Builds the hit at `t` along `ray`, orienting the unit `outward_normal` of the surface.
    pub fn ray(t: f64, mut outward_normal: Vec3, ray: &Ray, material: &'a Material) -> Self {
        // Dot product is negative when ray hits front face
        let front_face = ray.dir.dot(outward_normal) < 0.;
        // Make suface normal always point against incident ray
        if !front_face {
            outward_normal *= -1.;
        }
        Self::new(ray.at(t), outward_normal, t, front_face, material)
    }
}

pub trait Hittable: Send + Sync + Debug {
    /// Returns the closest hit along `ray` whose `t` lies in `hit_time`, or `None`.
    fn hit(&self, ray: &Ray, hit_time: &Range<f64>) -> Option<Hit>;
}

/// A scene is a flat list of objects scanned linearly.
#[derive(Default, Debug)]
pub struct HitList(pub Vec<Box<dyn Hittable>>);
impl HitList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push<T: Hittable + 'static>(&mut self, val: T) {
        self.0.push(Box::new(val))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl Hittable for HitList {
    fn hit(&self, ray: &Ray, hit_time: &Range<f64>) -> Option<Hit> {
        let mut range = hit_time.clone();
        let mut closest = None;
        for obj in &self.0 {
            if let Some(hit) = obj.hit(ray, &range) {
                // Later objects must be closer to replace this one
                range.end = hit.t;
                closest = Some(hit);
            }
        }
        closest
    }
}
