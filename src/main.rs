use std::io::{self, Write};

use anyhow::{Context, Result};
use log::info;
use structopt::StructOpt;

use cornell::config::Config;
use cornell::logger::init_logger;
use cornell::{Progress, RenderSink, Renderer, Status};

fn main() -> Result<()> {
    let config = Config::from_args();
    init_logger(config.log_level);

    let mut renderer = Renderer::new(
        config.render_settings(),
        config.camera_settings(),
        config.scene_config(),
    )
    .context("Can't set up the renderer")?;

    let progress = if config.headless {
        renderer.run(&mut Console)
    } else {
        run_windowed(&mut renderer)?
    };
    info!(
        "{} at {}% after {}s",
        progress.status, progress.percent, progress.elapsed_secs
    );

    if let Some(path) = &config.output {
        renderer
            .screen()
            .save_png(path)
            .with_context(|| format!("Couldn't save {}", path.display()))?;
        info!("Saved {}", path.display());
    }
    Ok(())
}

/// Prints progress on a single terminal line.
struct Console;
impl RenderSink for Console {
    fn progress(&mut self, progress: &Progress) {
        // Best effort: a closed stderr must not abort the render
        let mut stderr = io::stderr();
        let _ = write!(
            stderr,
            "\r{:>5.1}%  {:>6.1}s  {:<12}",
            progress.percent, progress.elapsed_secs, progress.status
        );
        if progress.status != Status::Rendering {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}

#[cfg(feature = "window")]
fn run_windowed(renderer: &mut Renderer) -> Result<Progress> {
    window::run(renderer)
}

#[cfg(not(feature = "window"))]
fn run_windowed(renderer: &mut Renderer) -> Result<Progress> {
    log::warn!("Built without the `window` feature, rendering headless");
    Ok(renderer.run(&mut Console))
}

#[cfg(feature = "window")]
mod window {
    use std::time::Duration;

    use anyhow::{anyhow, Result};
    use log::warn;
    use minifb::{Key, Window, WindowOptions};

    use cornell::{Progress, RenderSink, Renderer, Screen, StopHandle};

    use super::Console;

    struct WindowSink {
        window: Window,
        console: Console,
    }
    impl WindowSink {
        fn wants_close(&self) -> bool {
            !self.window.is_open() || self.window.is_key_down(Key::Escape)
        }
    }
    impl RenderSink for WindowSink {
        fn present(&mut self, screen: &Screen, stop: &StopHandle) {
            if self.wants_close() {
                stop.stop();
                return;
            }
            if let Err(err) = self
                .window
                .update_with_buffer(&screen.encode(), screen.width, screen.height)
            {
                warn!("Window update failed, stopping: {}", err);
                stop.stop();
            }
        }

        fn progress(&mut self, progress: &Progress) {
            self.console.progress(progress);
        }
    }

    pub fn run(renderer: &mut Renderer) -> Result<Progress> {
        let (width, height) = (renderer.screen().width, renderer.screen().height);
        let window = Window::new("Cornell box", width, height, WindowOptions::default())
            .map_err(|err| anyhow!("Couldn't open window: {}", err))?;
        let mut sink = WindowSink {
            window,
            console: Console,
        };

        let progress = renderer.run(&mut sink);

        // Keep showing the finished frame until the window is closed, at 30 fps
        sink.window
            .limit_update_rate(Some(Duration::from_secs_f64(1. / 30.)));
        let buffer = renderer.screen().encode();
        while !sink.wants_close() {
            sink.window
                .update_with_buffer(&buffer, width, height)
                .map_err(|err| anyhow!("Window update failed: {}", err))?;
        }
        Ok(progress)
    }
}
