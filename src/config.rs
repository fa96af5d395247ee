use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use log::LevelFilter;
use structopt::StructOpt;
use strum::VariantNames;
use strum_macros::Display as StrumDisplay;
use strum_macros::{EnumString, EnumVariantNames};

use crate::{BoxMaterial, CameraSettings, RenderSettings, SceneConfig};

#[derive(Clone, Debug, StructOpt)]
#[structopt(name = "cornell", about = "Progressive path tracer for the Cornell box")]
pub struct Config {
    #[structopt(short, long, default_value = "600", display_order = 0)]
    /// Width of render
    pub width: NonZeroUsize,

    #[structopt(long, default_value = "600", display_order = 1)]
    /// Height of render
    pub height: NonZeroUsize,

    #[structopt(short, long, default_value = "10")]
    /// Number of samples per pixel
    pub samples: NonZeroU32,

    #[structopt(short, long, default_value = "5")]
    /// Maximum ray bounce depth
    pub max_depth: u32,

    #[structopt(short, long, parse(try_from_str = parse_preset))]
    /// Quality preset. Overrides width, height, samples and max depth
    pub preset: Option<Preset>,

    #[structopt(long, default_value = "40")]
    /// Vertical field of view in degrees
    pub fov: f64,

    #[structopt(long, default_value = "15")]
    /// Camera distance from the box, in units of 50
    pub distance: f64,

    #[structopt(long, default_value = "5")]
    /// Scan lines traced between two display updates
    pub batch_rows: NonZeroUsize,

    #[structopt(short = "r", long = "rng")]
    /// Use a specific seed for the rng.
    pub seed: Option<u64>,

    #[structopt(long)]
    /// Leave the two boxes out
    pub no_boxes: bool,

    #[structopt(long)]
    /// Leave the ceiling light out
    pub no_light: bool,

    #[structopt(long, default_value = "15")]
    /// Brightness of the ceiling light
    pub light_intensity: f64,

    #[structopt(long, default_value = "lambertian", parse(try_from_str = BoxMaterial::parse))]
    /// Material of the tall box
    pub left_box: BoxMaterial,

    #[structopt(long, default_value = "lambertian", parse(try_from_str = BoxMaterial::parse))]
    /// Material of the short box
    pub right_box: BoxMaterial,

    #[structopt(short, long, parse(from_os_str))]
    /// Save the finished image as PNG
    pub output: Option<PathBuf>,

    #[structopt(long)]
    /// Render without opening a window
    pub headless: bool,

    #[structopt(long, default_value = "info")]
    /// Logging level (off, error, warn, info, debug, trace)
    pub log_level: LevelFilter,
}
impl Config {
    pub fn render_settings(&self) -> RenderSettings {
        let mut settings = RenderSettings {
            width: self.width.get(),
            height: self.height.get(),
            samples_per_pixel: self.samples.get(),
            max_depth: self.max_depth,
            batch_rows: self.batch_rows.get(),
            seed: self.seed,
        };
        if let Some(preset) = self.preset {
            preset.apply(&mut settings);
        }
        settings
    }

    pub fn camera_settings(&self) -> CameraSettings {
        CameraSettings {
            vfov_degrees: self.fov,
            distance: self.distance,
        }
    }

    pub fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            show_boxes: !self.no_boxes,
            show_light: !self.no_light,
            light_intensity: self.light_intensity,
            left_box: self.left_box,
            right_box: self.right_box,
        }
    }
}

fn parse_preset(s: &str) -> Result<Preset> {
    s.parse::<Preset>().map_err(|_| {
        anyhow!(
            "\"{}\" isn't a Preset.\nPossible values: {:?}",
            s,
            Preset::VARIANTS
        )
    })
}

/// Square image quality presets.
#[derive(Copy, Clone, Debug, StrumDisplay, EnumString, EnumVariantNames, PartialEq)]
pub enum Preset {
    #[strum(serialize = "fast")]
    Fast,
    #[strum(serialize = "balanced")]
    Balanced,
    #[strum(serialize = "quality")]
    Quality,
}
impl Preset {
    /// `(samples per pixel, max depth, side length)`
    pub fn values(self) -> (u32, u32, usize) {
        match self {
            Preset::Fast => (5, 3, 300),
            Preset::Balanced => (10, 5, 600),
            Preset::Quality => (50, 10, 800),
        }
    }

    pub fn apply(self, settings: &mut RenderSettings) {
        let (samples, depth, size) = self.values();
        settings.samples_per_pixel = samples;
        settings.max_depth = depth;
        settings.width = size;
        settings.height = size;
    }
}
