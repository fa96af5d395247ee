use std::sync::Arc;

use anyhow::anyhow;
use strum::VariantNames;
use strum_macros::{Display as StrumDisplay, EnumString, EnumVariantNames};

use crate::material::{Dielectric, DiffuseLight, Lambertian, Metal};
use crate::shape::{AxisAlignedRect, Cuboid};
use crate::{Camera, Color, HitList, Material, RenderError, Vec3};

/// Side length of the box. Walls span `0..=BOX_SIZE` on every axis.
pub const BOX_SIZE: f64 = 555.;
/// Height of the plane through the middle of the box.
const CENTER: f64 = 278.;

const RED: Color = Color::new(0.65, 0.05, 0.05);
const WHITE: Color = Color::new(0.73, 0.73, 0.73);
const GREEN: Color = Color::new(0.12, 0.45, 0.15);

/// What the two boxes standing on the floor are made of.
#[derive(Copy, Clone, Debug, StrumDisplay, EnumString, EnumVariantNames, PartialEq)]
pub enum BoxMaterial {
    #[strum(serialize = "lambertian")]
    Lambertian,
    #[strum(serialize = "metal")]
    Metal,
    #[strum(serialize = "glass")]
    Glass,
}
impl BoxMaterial {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        s.parse::<Self>().map_err(|_| {
            anyhow!(
                "\"{}\" isn't a box material.\nPossible values: {:?}",
                s,
                Self::VARIANTS
            )
        })
    }

    pub fn material(self) -> Material {
        match self {
            BoxMaterial::Lambertian => Lambertian::new(WHITE).into(),
            BoxMaterial::Metal => Metal::new(WHITE, 0.1).into(),
            BoxMaterial::Glass => Dielectric::new(1.5).into(),
        }
    }
}

/// Toggles for the Cornell box contents. Applied by rebuilding the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub show_boxes: bool,
    pub show_light: bool,
    pub light_intensity: f64,
    /// The tall box
    pub left_box: BoxMaterial,
    /// The short box
    pub right_box: BoxMaterial,
}
impl SceneConfig {
    pub fn validate(&self) -> Result<(), RenderError> {
        if !(self.light_intensity > 0. && self.light_intensity.is_finite()) {
            return Err(RenderError::InvalidConfig(format!(
                "light intensity must be positive, got {}",
                self.light_intensity
            )));
        }
        Ok(())
    }
}
impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            show_boxes: true,
            show_light: true,
            light_intensity: 15.,
            left_box: BoxMaterial::Lambertian,
            right_box: BoxMaterial::Lambertian,
        }
    }
}

/// Builds the Cornell box described by `config`.
pub fn build_scene(config: &SceneConfig) -> HitList {
    let red: Arc<Material> = Arc::new(Lambertian::new(RED).into());
    let white: Arc<Material> = Arc::new(Lambertian::new(WHITE).into());
    let green: Arc<Material> = Arc::new(Lambertian::new(GREEN).into());
    let full = (0., BOX_SIZE);

    let mut world = HitList::new();
    world.push(AxisAlignedRect::yz(full, full, BOX_SIZE, green));
    world.push(AxisAlignedRect::yz(full, full, 0., red));
    if config.show_light {
        let light = DiffuseLight::new(Color::WHITE, config.light_intensity);
        // Just below the ceiling so it isn't coplanar with it
        world.push(AxisAlignedRect::xz(
            (213., 343.),
            (227., 332.),
            BOX_SIZE - 1.,
            Arc::new(light.into()),
        ));
    }
    // Floor, ceiling, back wall
    world.push(AxisAlignedRect::xz(full, full, 0., white.clone()));
    world.push(AxisAlignedRect::xz(full, full, BOX_SIZE, white.clone()));
    world.push(AxisAlignedRect::xy(full, full, BOX_SIZE, white));

    if config.show_boxes {
        world.push(Cuboid::from(
            [130., 0., 65.],
            [295., 330., 230.],
            Arc::new(config.left_box.material()),
        ));
        world.push(Cuboid::from(
            [265., 0., 295.],
            [430., 165., 460.],
            Arc::new(config.right_box.material()),
        ));
    }

    world
}

/// Where the camera sits in front of the open side of the box.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraSettings {
    pub vfov_degrees: f64,
    /// The camera is `50 * distance` units in front of the box's open face.
    pub distance: f64,
}
impl CameraSettings {
    pub fn camera(&self, aspect_ratio: f64) -> Result<Camera, RenderError> {
        if !(self.distance > 0. && self.distance.is_finite()) {
            return Err(RenderError::InvalidConfig(format!(
                "camera distance must be positive, got {}",
                self.distance
            )));
        }

        Camera::builder()
            .origin([CENTER, CENTER, -self.distance * 50.])
            .look_at([CENTER, CENTER, 0.])
            .view_up(Vec3::UNIT_Y)
            .vfov_degrees(self.vfov_degrees)
            .aspect_ratio(aspect_ratio)
            .build()
            .map_err(|err| RenderError::InvalidCamera(format!("{:#}", err)))
    }
}
impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            vfov_degrees: 40.,
            distance: 15.,
        }
    }
}
