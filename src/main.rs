//! Starfield Runner entry point
//!
//! Creates the window and forwards winit events to the app lifecycle.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use starfield_runner::error::SetupError;
use starfield_runner::{Lifecycle, Settings, StarfieldApp};

struct Host {
    app: StarfieldApp,
    window: Option<Arc<Window>>,
    window_size: PhysicalSize<u32>,
    last_frame: Instant,
    /// First fatal error, reported after the loop exits
    error: Option<SetupError>,
}

impl Host {
    fn new(settings: Settings) -> Self {
        let window_size = PhysicalSize::new(settings.window_width, settings.window_height);
        Self {
            app: StarfieldApp::new(settings),
            window: None,
            window_size,
            last_frame: Instant::now(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SetupError) {
        self.record(err);
        event_loop.exit();
    }

    /// Keep the first fatal error; later ones are only logged
    fn record(&mut self, err: SetupError) {
        log::error!("{err}");
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Exit status once the event loop has returned
    fn finish(self) -> anyhow::Result<()> {
        match self.error {
            Some(err) => Err(err).context("setup failed"),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for Host {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("Starfield Runner")
            .with_inner_size(self.window_size);
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail(event_loop, err.into());
                return;
            }
        };
        log::info!(
            "Window created: {}x{}",
            self.window_size.width,
            self.window_size.height
        );

        if let Err(err) = self.app.initialize(window.clone()) {
            self.fail(event_loop, err);
            return;
        }
        self.window = Some(window);
        self.last_frame = Instant::now();
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                self.app.resize(size.width, size.height);
            }

            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.app.handle_key(key);
                    if self.app.should_quit() {
                        event_loop.exit();
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;

                if let Err(err) = self.app.paint(dt) {
                    self.fail(event_loop, err);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.app.terminate();
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings_path = Settings::locate(std::env::args());
    let settings = Settings::load(settings_path.as_deref()).context("failed to load settings")?;
    log::info!("Starfield Runner starting (assets: {})", settings.assets_dir.display());

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut host = Host::new(settings);
    event_loop.run_app(&mut host).context("event loop error")?;
    host.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_exit_succeeds() {
        assert!(Host::new(Settings::default()).finish().is_ok());
    }

    #[test]
    fn test_recorded_failure_fails_process() {
        let mut host = Host::new(Settings::default());
        host.record(SetupError::InvalidSetting("window_width must be positive"));
        host.record(SetupError::NotInitialized);

        let err = host.finish().unwrap_err();
        assert_eq!(err.to_string(), "setup failed");
        let cause = err.root_cause().to_string();
        assert!(cause.contains("window_width"), "first error kept: {cause}");
    }
}
