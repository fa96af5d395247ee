use anyhow::{ensure, Context, Result};

use crate::{Ray, Vec3};

/// Pinhole camera. Every ray starts at `origin`.
#[derive(Clone, Debug)]
pub struct Camera {
    pub origin: Vec3,
    pub horiz: Vec3,
    pub vert: Vec3,
    pub lower_left: Vec3,

    /// Width part of the orthonormal basis.
    pub u: Vec3,
    /// Height part of the orthonormal basis.
    pub v: Vec3,
    /// Depth part of the orthonormal basis. Points away from the scene.
    pub w: Vec3,
}
impl Camera {
    pub fn builder() -> CameraBuilder {
        CameraBuilder::default()
    }

    /// `s` runs left to right and `t` bottom to top across the viewport, both in `[0, 1]`.
    pub fn get_ray(&self, s: f64, t: f64) -> Ray {
        Ray::new(
            self.origin,
            self.lower_left + s * self.horiz + t * self.vert - self.origin,
        )
    }
}

#[derive(Debug)]
pub struct CameraBuilder {
    origin: Vec3,
    look_at: Vec3,
    view_up: Vec3,
    vfov_degrees: f64,
    aspect_ratio: f64,
}
impl CameraBuilder {
    pub fn build(&self) -> Result<Camera> {
        ensure!(
            self.vfov_degrees > 0. && self.vfov_degrees < 180.,
            "Camera's vertical field of view must be in (0, 180) degrees: {}",
            self.vfov_degrees
        );
        ensure!(
            self.aspect_ratio > 0. && self.aspect_ratio.is_finite(),
            "Camera's aspect ratio must be positive: {}",
            self.aspect_ratio
        );

        let theta = self.vfov_degrees.to_radians() / 2.;
        let half_height = theta.tan();
        let half_width = self.aspect_ratio * half_height;

        // Project view_up onto the plane of the camera and form the orthonormal basis.
        // Also deal with bad camera configurations.

        // Error if camera's origin and look_at are the same.
        let w = Vec3::checked_normalized(self.origin - self.look_at).with_context(|| {
            format!(
                "Camera's origin and look_at vectors are the same.\nOrigin: {:?}",
                self.origin,
            )
        })?;

        // Error if look_at and view_up are parallel, or view_up has length 0.
        let u = Vec3::checked_normalized(self.view_up.cross(w)).with_context(|| {
            format!(
                "Camera's view direction and view_up vector are parallel.\nResp.: {:?} || {:?}",
                w, self.view_up,
            )
        })?;

        let v = w.cross(u);
        let horiz = 2. * half_width * u;
        let vert = 2. * half_height * v;
        let lower_left = self.origin - horiz / 2. - vert / 2. - w;

        Ok(Camera {
            origin: self.origin,
            horiz,
            vert,
            lower_left,
            u,
            v,
            w,
        })
    }
    // ===== Builder Methods =====
    pub fn origin<T: Into<Vec3>>(&mut self, origin: T) -> &mut Self {
        self.origin = origin.into();
        self
    }
    pub fn look_at<T: Into<Vec3>>(&mut self, look_at: T) -> &mut Self {
        self.look_at = look_at.into();
        self
    }
    pub fn vfov_degrees(&mut self, vfov: f64) -> &mut Self {
        self.vfov_degrees = vfov;
        self
    }
    pub fn aspect_ratio(&mut self, aspect_ratio: f64) -> &mut Self {
        self.aspect_ratio = aspect_ratio;
        self
    }
    pub fn view_up<T: Into<Vec3>>(&mut self, view_up: T) -> &mut Self {
        self.view_up = view_up.into();
        self
    }
}
impl Default for CameraBuilder {
    fn default() -> Self {
        Self {
            origin: Vec3::ORIGIN,
            look_at: Vec3::new(0., 0., -1.),
            view_up: Vec3::UNIT_Y,
            vfov_degrees: 60.,
            aspect_ratio: 1.,
        }
    }
}
