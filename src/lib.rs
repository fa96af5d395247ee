//! Progressive Monte Carlo path tracer for the Cornell box.

pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod hit;
pub mod integrator;
pub mod logger;
pub mod material;
pub mod ray;
pub mod render;
pub mod scene;
pub mod screen;
pub mod shape;
pub mod vec3;

pub use camera::Camera;
pub use color::Color;
pub use error::RenderError;
pub use hit::{Hit, HitList, Hittable};
pub use material::Material;
pub use ray::Ray;
pub use render::{Progress, RenderSettings, RenderSink, RenderState, Renderer, Status, StopHandle};
pub use scene::{build_scene, BoxMaterial, CameraSettings, SceneConfig};
pub use screen::Screen;
pub use vec3::{Axis, Vec3};

/// The generator threaded through every stochastic operation.
pub type CrateRng = rand::rngs::SmallRng;
