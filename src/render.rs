//! Progressive render driver.
//!
//! A render advances one batch of scan lines per [`Renderer::step`]. Between two steps the
//! caller is free to repaint, poll input, or stop the render; nothing inside a batch ever
//! waits on the caller.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use strum_macros::Display as StrumDisplay;

use crate::integrator::ray_color;
use crate::scene::{build_scene, CameraSettings, SceneConfig};
use crate::{Camera, Color, CrateRng, HitList, RenderError, Screen};

/// Scan lines traced between two yield points.
pub const DEFAULT_BATCH_ROWS: usize = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub width: usize,
    pub height: usize,
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth. `0` renders black.
    pub max_depth: u32,
    pub batch_rows: usize,
    /// Seed for a reproducible render. Drawn from entropy when `None`.
    pub seed: Option<u64>,
}
impl RenderSettings {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        let invalid = |msg: String| Err(RenderError::InvalidConfig(msg));
        if self.width == 0 || self.height == 0 {
            return invalid(format!(
                "image must have a non-zero area, got {}x{}",
                self.width, self.height
            ));
        }
        if self.samples_per_pixel == 0 {
            return invalid("samples per pixel must be at least 1".to_string());
        }
        if self.batch_rows == 0 {
            return invalid("batch size must be at least 1 row".to_string());
        }
        Ok(())
    }

    fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}
impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            samples_per_pixel: 10,
            max_depth: 5,
            batch_rows: DEFAULT_BATCH_ROWS,
            seed: None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, StrumDisplay)]
pub enum Status {
    #[strum(serialize = "Rendering...")]
    Rendering,
    Complete,
    Stopped,
}

/// Reported after every batch and once more when the render ends.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Progress {
    /// `0.0` to `100.0`, rounded to one decimal
    pub percent: f64,
    /// Rounded to one decimal
    pub elapsed_secs: f64,
    pub status: Status,
}
impl Progress {
    fn new(rows_done: usize, height: usize, elapsed: Duration, status: Status) -> Self {
        Self {
            percent: round_tenth(rows_done as f64 / height as f64 * 100.),
            elapsed_secs: round_tenth(elapsed.as_secs_f64()),
            status,
        }
    }
}

fn round_tenth(x: f64) -> f64 {
    (x * 10.).round() / 10.
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Rendering,
    Complete,
    Stopped,
}

/// Requests a stop of the render it was handed out for. Can be sent to other threads.
#[derive(Clone, Debug)]
pub struct StopHandle(Arc<AtomicBool>);
impl StopHandle {
    /// Takes effect at the next batch boundary.
    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Receives the output of [`Renderer::run`].
pub trait RenderSink {
    /// Called with the frame buffer after every batch.
    fn present(&mut self, _screen: &Screen, _stop: &StopHandle) {}

    fn progress(&mut self, progress: &Progress);
}
impl<F: FnMut(&Progress)> RenderSink for F {
    fn progress(&mut self, progress: &Progress) {
        self(progress)
    }
}

struct RenderSession {
    next_row: usize,
    running: StopHandle,
    started: Instant,
    seed: u64,
}

pub struct Renderer {
    settings: RenderSettings,
    camera_settings: CameraSettings,
    scene: SceneConfig,
    camera: Camera,
    world: HitList,
    screen: Screen,
    state: RenderState,
    session: Option<RenderSession>,
}
impl Renderer {
    pub fn new(
        settings: RenderSettings,
        camera_settings: CameraSettings,
        scene: SceneConfig,
    ) -> Result<Self, RenderError> {
        settings.validate()?;
        scene.validate()?;
        let camera = camera_settings.camera(settings.aspect_ratio())?;

        Ok(Self {
            screen: Screen::new(settings.width, settings.height),
            world: build_scene(&scene),
            settings,
            camera_settings,
            scene,
            camera,
            state: RenderState::Idle,
            session: None,
        })
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Begins a new render from a black frame, restarting any render in progress.
    pub fn start_render(&mut self) -> StopHandle {
        if let Some(session) = &self.session {
            warn!("Restarting render at row {}", session.next_row);
            session.running.stop();
        }

        // The scene is rebuilt so that it always matches the current configuration
        self.world = build_scene(&self.scene);
        self.screen.clear();
        self.screen.set_samples(self.settings.samples_per_pixel);

        let seed = self.settings.seed.unwrap_or_else(rand::random);
        let running = StopHandle(Arc::new(AtomicBool::new(true)));
        self.session = Some(RenderSession {
            next_row: 0,
            running: running.clone(),
            started: Instant::now(),
            seed,
        });
        self.state = RenderState::Rendering;

        info!(
            "Rendering {}x{} at {} samples per pixel, max depth {} (seed {})",
            self.settings.width,
            self.settings.height,
            self.settings.samples_per_pixel,
            self.settings.max_depth,
            seed
        );
        running
    }

    /// Advances the render by one batch of rows.
    ///
    /// Returns `None` when no render is running. The report after the last batch still says
    /// `Rendering...`; the following call ends the render and reports `Complete`.
    pub fn step(&mut self) -> Option<Progress> {
        let session = self.session.as_mut()?;
        let height = self.screen.height;

        if !session.running.is_running() {
            let progress = Progress::new(
                session.next_row,
                height,
                session.started.elapsed(),
                Status::Stopped,
            );
            warn!("Render stopped at {}%", progress.percent);
            self.finish(RenderState::Stopped);
            return Some(progress);
        }

        if session.next_row >= height {
            let progress = Progress::new(height, height, session.started.elapsed(), Status::Complete);
            info!("Render complete in {}s", progress.elapsed_secs);
            self.finish(RenderState::Complete);
            return Some(progress);
        }

        let rows = session.next_row..(session.next_row + self.settings.batch_rows).min(height);
        trace_rows(
            &mut self.screen,
            &self.camera,
            &self.world,
            &self.settings,
            rows.clone(),
            session.seed,
        );
        session.next_row = rows.end;

        let progress = Progress::new(
            session.next_row,
            height,
            session.started.elapsed(),
            Status::Rendering,
        );
        debug!("Rows {:?} done ({}%)", rows, progress.percent);
        Some(progress)
    }

    /// Stops the running render at its next batch boundary.
    pub fn stop_render(&self) {
        if let Some(session) = &self.session {
            session.running.stop();
        }
    }

    /// Renders a full frame, handing every batch to `sink` and yielding the thread in between.
    pub fn run<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> Progress {
        let stop = self.start_render();
        let mut last = Progress::new(0, self.screen.height, Duration::default(), Status::Rendering);
        while let Some(progress) = self.step() {
            sink.present(&self.screen, &stop);
            sink.progress(&progress);
            last = progress;
            thread::yield_now();
        }
        last
    }

    /// Reallocates a cleared frame buffer. Not allowed while rendering.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), RenderError> {
        if self.state == RenderState::Rendering {
            warn!("Ignoring resize to {}x{} during a render", width, height);
            return Err(RenderError::ResizeWhileRendering);
        }

        let settings = RenderSettings {
            width,
            height,
            ..self.settings.clone()
        };
        settings.validate()?;
        self.camera = self.camera_settings.camera(settings.aspect_ratio())?;
        self.settings = settings;
        self.screen = Screen::new(width, height);
        self.state = RenderState::Idle;
        Ok(())
    }

    pub fn set_scene(&mut self, scene: SceneConfig) -> Result<(), RenderError> {
        self.ensure_idle()?;
        scene.validate()?;
        self.world = build_scene(&scene);
        self.scene = scene;
        Ok(())
    }

    pub fn set_camera(&mut self, camera_settings: CameraSettings) -> Result<(), RenderError> {
        self.ensure_idle()?;
        self.camera = camera_settings.camera(self.settings.aspect_ratio())?;
        self.camera_settings = camera_settings;
        Ok(())
    }

    pub fn set_quality(&mut self, samples_per_pixel: u32, max_depth: u32) -> Result<(), RenderError> {
        self.ensure_idle()?;
        let settings = RenderSettings {
            samples_per_pixel,
            max_depth,
            ..self.settings.clone()
        };
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), RenderError> {
        if self.state == RenderState::Rendering {
            warn!("Ignoring reconfiguration during a render");
            return Err(RenderError::Busy);
        }
        Ok(())
    }

    fn finish(&mut self, state: RenderState) {
        self.session = None;
        self.state = state;
    }
}

/// Independent, reproducible generator for one scan line.
fn row_rng(seed: u64, y: usize) -> CrateRng {
    CrateRng::seed_from_u64(seed ^ (y as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Traces every pixel of `rows`, one scan line per rayon task.
fn trace_rows(
    screen: &mut Screen,
    camera: &Camera,
    world: &HitList,
    settings: &RenderSettings,
    rows: Range<usize>,
    seed: u64,
) {
    let (width, height) = (screen.width, screen.height);
    let samples = settings.samples_per_pixel;
    // A single pixel wide or high image samples the whole viewport span
    let u_span = (width.max(2) - 1) as f64;
    let v_span = (height.max(2) - 1) as f64;
    let first = rows.start;

    screen
        .par_rows_mut(rows)
        .enumerate()
        .for_each(|(i, (accum, rgba))| {
            let y = first + i;
            let mut rng = row_rng(seed, y);
            let row_v = (height - 1 - y) as f64;

            for (x, (sum, px)) in accum.iter_mut().zip(rgba.chunks_exact_mut(4)).enumerate() {
                let mut color = Color::BLACK;
                for _ in 0..samples {
                    let s = (x as f64 + rng.gen::<f64>()) / u_span;
                    let t = (row_v + rng.gen::<f64>()) / v_span;
                    let ray = camera.get_ray(s, t);
                    color += ray_color(&ray, world, settings.max_depth, &mut rng);
                }
                *sum = color;
                px.copy_from_slice(&color.to_rgba8(samples));
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(size: usize, samples: u32, max_depth: u32, scene: SceneConfig) -> Renderer {
        let settings = RenderSettings {
            samples_per_pixel: samples,
            max_depth,
            seed: Some(1234),
            ..RenderSettings::new(size, size)
        };
        Renderer::new(settings, CameraSettings::default(), scene).unwrap()
    }

    fn no_boxes() -> SceneConfig {
        SceneConfig {
            show_boxes: false,
            ..SceneConfig::default()
        }
    }

    #[test]
    fn status_labels() {
        assert_eq!(Status::Rendering.to_string(), "Rendering...");
        assert_eq!(Status::Complete.to_string(), "Complete");
        assert_eq!(Status::Stopped.to_string(), "Stopped");
    }

    #[test]
    fn rejects_invalid_settings() {
        let zero_area = RenderSettings::new(0, 10);
        assert!(zero_area.validate().is_err());

        let no_samples = RenderSettings {
            samples_per_pixel: 0,
            ..RenderSettings::default()
        };
        assert!(Renderer::new(no_samples, CameraSettings::default(), SceneConfig::default()).is_err());

        let no_batch = RenderSettings {
            batch_rows: 0,
            ..RenderSettings::default()
        };
        assert!(no_batch.validate().is_err());

        assert!(RenderSettings::default().validate().is_ok());
    }

    #[test]
    fn only_light_is_lit_after_one_bounce() {
        let mut renderer = renderer(60, 1, 1, no_boxes());
        let progress = renderer.run(&mut |_: &Progress| {});
        assert_eq!(progress.status, Status::Complete);
        assert_eq!(renderer.state(), RenderState::Complete);

        let screen = renderer.screen();
        let mut lit = 0;
        for px in screen.as_rgba().chunks_exact(4) {
            match px {
                [0, 0, 0, 255] => {}
                [255, 255, 255, 255] => lit += 1,
                other => panic!("unexpected pixel {:?}", other),
            }
        }
        assert!(lit > 0);
        assert_eq!(screen.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(screen.pixel(59, 59), [0, 0, 0, 255]);
    }

    #[test]
    fn zero_depth_renders_black() {
        let mut renderer = renderer(8, 2, 0, SceneConfig::default());
        renderer.run(&mut |_: &Progress| {});
        assert!(renderer
            .screen()
            .as_rgba()
            .chunks_exact(4)
            .all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let mut a = renderer(16, 2, 4, SceneConfig::default());
        let mut b = renderer(16, 2, 4, SceneConfig::default());
        a.run(&mut |_: &Progress| {});
        b.run(&mut |_: &Progress| {});
        assert_eq!(a.screen().as_rgba(), b.screen().as_rgba());
        // The walls receive bounced light
        assert!(a.screen().as_rgba().chunks_exact(4).any(|px| px[..3] != [0, 0, 0]));
    }

    #[test]
    fn progress_is_monotonic_and_ends_complete() {
        let mut renderer = renderer(12, 1, 2, SceneConfig::default());
        let mut reports = Vec::new();
        renderer.run(&mut |p: &Progress| reports.push(*p));

        let percents: Vec<f64> = reports.iter().map(|p| p.percent).collect();
        assert_eq!(percents, vec![41.7, 83.3, 100., 100.]);
        for pair in reports.windows(2) {
            assert!(pair[0].percent <= pair[1].percent);
            assert!(pair[0].elapsed_secs <= pair[1].elapsed_secs);
        }

        let statuses: Vec<Status> = reports.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![
                Status::Rendering,
                Status::Rendering,
                Status::Rendering,
                Status::Complete
            ]
        );
        assert_eq!(renderer.step(), None);
    }

    #[test]
    fn stop_takes_effect_at_next_batch() {
        let mut renderer = renderer(20, 1, 2, SceneConfig::default());
        let handle = renderer.start_render();

        let first = renderer.step().unwrap();
        assert_eq!(first.status, Status::Rendering);
        assert_eq!(first.percent, 25.);

        handle.stop();
        let last = renderer.step().unwrap();
        assert_eq!(last.status, Status::Stopped);
        assert_eq!(last.percent, 25.);
        assert_eq!(renderer.state(), RenderState::Stopped);
        assert_eq!(renderer.step(), None);

        // Rows after the stop were never traced
        assert_eq!(renderer.screen().pixel(10, 19), [0, 0, 0, 255]);
    }

    #[test]
    fn stop_from_sink_ends_run_early() {
        struct StopAfterFirst {
            reports: Vec<Progress>,
        }
        impl RenderSink for StopAfterFirst {
            fn present(&mut self, _screen: &Screen, stop: &StopHandle) {
                stop.stop();
            }

            fn progress(&mut self, progress: &Progress) {
                self.reports.push(*progress);
            }
        }

        let mut renderer = renderer(20, 1, 2, SceneConfig::default());
        let mut sink = StopAfterFirst {
            reports: Vec::new(),
        };
        let last = renderer.run(&mut sink);

        assert_eq!(last.status, Status::Stopped);
        assert!(last.percent < 100.);
        assert_eq!(sink.reports.len(), 2);
    }

    #[test]
    fn stop_via_renderer() {
        let mut renderer = renderer(20, 1, 1, SceneConfig::default());
        renderer.start_render();
        renderer.step();
        renderer.stop_render();
        assert_eq!(renderer.step().map(|p| p.status), Some(Status::Stopped));
    }

    #[test]
    fn resize_rejected_while_rendering() {
        let mut renderer = renderer(10, 1, 1, SceneConfig::default());
        renderer.start_render();
        assert!(matches!(
            renderer.resize(20, 20),
            Err(RenderError::ResizeWhileRendering)
        ));
        assert!(matches!(
            renderer.set_scene(SceneConfig::default()),
            Err(RenderError::Busy)
        ));
        assert_eq!(renderer.screen().width, 10);

        renderer.stop_render();
        renderer.step();
        assert!(renderer.resize(20, 20).is_ok());
    }

    #[test]
    fn repeated_resize_gives_cleared_buffer() {
        let mut renderer = renderer(16, 2, 3, SceneConfig::default());
        renderer.run(&mut |_: &Progress| {});
        assert!(renderer
            .screen()
            .as_rgba()
            .chunks_exact(4)
            .any(|px| px != [0, 0, 0, 255]));

        renderer.resize(24, 18).unwrap();
        renderer.resize(24, 18).unwrap();

        let screen = renderer.screen();
        assert_eq!((screen.width, screen.height), (24, 18));
        assert_eq!(screen.as_rgba().len(), 24 * 18 * 4);
        assert!(screen.as_rgba().chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
        assert_eq!(renderer.state(), RenderState::Idle);
        assert!((renderer.camera().horiz.norm() / renderer.camera().vert.norm() - 24. / 18.).abs() < 1e-9);
    }

    #[test]
    fn reconfigure_between_renders() {
        let mut renderer = renderer(8, 1, 1, SceneConfig::default());
        renderer
            .set_scene(SceneConfig {
                show_light: false,
                ..SceneConfig::default()
            })
            .unwrap();
        renderer.set_quality(3, 2).unwrap();
        assert!(renderer.set_quality(0, 2).is_err());
        renderer
            .set_camera(CameraSettings {
                vfov_degrees: 60.,
                distance: 10.,
            })
            .unwrap();

        renderer.run(&mut |_: &Progress| {});
        assert_eq!(renderer.screen().samples(), 3);
        // No light, nothing to see
        assert!(renderer
            .screen()
            .as_rgba()
            .chunks_exact(4)
            .all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn single_pixel_image() {
        let mut renderer = renderer(1, 1, 1, SceneConfig::default());
        let progress = renderer.run(&mut |_: &Progress| {});
        assert_eq!(progress.status, Status::Complete);
        assert_eq!(renderer.screen().pixel(0, 0)[3], 255);
    }
}
