use crate::Vec3;

/// `dir` isn't required to be unit length.
#[derive(Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}
impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    /// The point reached after travelling `t` lengths of `dir` from `origin`.
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + t * self.dir
    }
}
