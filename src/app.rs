//! Application lifecycle
//!
//! `StarfieldApp` owns the whole game: GPU context, scene resources,
//! simulation state, shading configuration and pending input. The native
//! host drives it through the `Lifecycle` trait.

use std::sync::Arc;

use winit::keyboard::KeyCode;
use winit::window::Window;

use crate::assets::AssetLoader;
use crate::error::SetupError;
use crate::renderer::{GpuContext, Scene, ShadingModel, SurfaceErrorAction};
use crate::settings::Settings;
use crate::sim::{GameEvent, SimState, TickInput, tick};
use crate::ui::{HudReadout, ShadingConfig, UiAction, action_for_key};

/// Hooks called by the host loop, in this order: `initialize` once, then
/// `resize`/`paint` as events arrive, then `terminate` once.
pub trait Lifecycle {
    fn initialize(&mut self, window: Arc<Window>) -> Result<(), SetupError>;
    /// Advance by `dt` seconds and draw a frame
    fn paint(&mut self, dt: f32) -> Result<(), SetupError>;
    fn resize(&mut self, width: u32, height: u32);
    fn terminate(&mut self);
}

pub struct StarfieldApp {
    settings: Settings,
    assets: AssetLoader,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    scene: Option<Scene>,
    pub sim: SimState,
    pub config: ShadingConfig,
    input: TickInput,
    /// Base seed; scene `n` uses `base_seed + n`
    base_seed: u64,
    scenes_started: u64,
    quit_requested: bool,
    title: String,
}

impl StarfieldApp {
    pub fn new(settings: Settings) -> Self {
        let base_seed = settings.seed.unwrap_or_else(clock_seed);
        log::info!("Obstacle seed: {base_seed}");

        Self {
            assets: AssetLoader::new(&settings.assets_dir),
            window: None,
            gpu: None,
            scene: None,
            sim: SimState::new(base_seed, settings.initial_lives),
            config: ShadingConfig::new(settings.fov_degrees, false),
            input: TickInput::default(),
            base_seed,
            scenes_started: 0,
            quit_requested: false,
            title: String::new(),
            settings,
        }
    }

    /// Tear down and rebuild everything: startup and restart share this path
    pub fn reset_scene(&mut self) -> Result<(), SetupError> {
        let gpu = self.gpu.as_ref().ok_or(SetupError::NotInitialized)?;

        if let Some(old) = self.scene.take() {
            old.release();
        }
        let scene = Scene::load(gpu, &self.assets)?;
        let has_uvs = scene.obstacle_has_uvs();
        self.scene = Some(scene);

        self.reset_state(has_uvs);
        log::info!("Scene reset (seed {})", self.sim.seed);
        Ok(())
    }

    /// Fresh simulation, default UI selections and no pending input
    fn reset_state(&mut self, mesh_has_uvs: bool) {
        let seed = self.base_seed.wrapping_add(self.scenes_started);
        self.scenes_started += 1;

        self.sim = SimState::new(seed, self.settings.initial_lives);
        self.config = ShadingConfig::new(self.settings.fov_degrees, mesh_has_uvs);
        self.input.clear();
    }

    /// Run one simulation step with the input gathered since the last one
    ///
    /// Returns `true` when the scene has to be rebuilt.
    pub fn update(&mut self, dt: f32) -> bool {
        let events = tick(&mut self.sim, &self.input, dt);
        self.input.clear();

        let mut restart = false;
        for event in events {
            match event {
                GameEvent::Hit { lives_left } => log::info!("Hit! {lives_left} lives left"),
                GameEvent::Lost => log::info!("Game lost"),
                GameEvent::RestartRequested => restart = true,
            }
        }
        restart
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        let Some(action) = action_for_key(key) else {
            return;
        };

        match action {
            UiAction::Move(dir) => self.input.moves.push(dir),
            UiAction::SelectProgram(index) => {
                if let (Some(gpu), Some(scene)) = (self.gpu.as_ref(), self.scene.as_mut()) {
                    scene.select_program(&gpu.device, index);
                }
            }
            UiAction::Quit => self.quit_requested = true,
            _ => {
                let has_uvs = self.mesh_has_uvs();
                self.config.apply(action, has_uvs);
            }
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit_requested
    }

    fn mesh_has_uvs(&self) -> bool {
        self.scene.as_ref().is_some_and(|s| s.obstacle_has_uvs())
    }

    pub fn hud(&self) -> HudReadout {
        HudReadout {
            program: self
                .scene
                .as_ref()
                .map(|s| s.active_model())
                .unwrap_or(ShadingModel::Texture),
            uv_mapping: self.config.uv_mapping,
            projection: self.config.camera.projection,
            fov_degrees: self.config.camera.fov_degrees,
            lives: self.sim.lives,
            lost: self.sim.is_lost(),
            mesh_has_uvs: self.mesh_has_uvs(),
        }
    }

    fn render(&mut self) -> Result<(), SetupError> {
        let (Some(gpu), Some(scene)) = (self.gpu.as_mut(), self.scene.as_ref()) else {
            return Ok(());
        };

        if let Err(err) = scene.render(gpu, &self.sim, &self.config.camera, self.config.uv_mapping) {
            log::warn!("Surface error: {err}");
            match gpu.handle_surface_error(err) {
                SurfaceErrorAction::Reconfigured => log::warn!("Surface reconfigured"),
                SurfaceErrorAction::SkipFrame => log::warn!("Skipping frame"),
                SurfaceErrorAction::Fatal => {
                    log::error!("Out of GPU memory");
                    return Err(SetupError::OutOfMemory);
                }
            }
        }
        Ok(())
    }

    fn refresh_title(&mut self) {
        let title = self.hud().title();
        if title != self.title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.title = title;
        }
    }
}

impl Lifecycle for StarfieldApp {
    fn initialize(&mut self, window: Arc<Window>) -> Result<(), SetupError> {
        let gpu = pollster::block_on(GpuContext::new(
            window.clone(),
            self.settings.present_mode(),
        ))?;
        self.gpu = Some(gpu);
        self.window = Some(window);

        self.reset_scene()?;
        self.refresh_title();
        Ok(())
    }

    fn paint(&mut self, dt: f32) -> Result<(), SetupError> {
        if self.update(dt) {
            self.reset_scene()?;
        }
        self.render()?;
        self.refresh_title();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(width, height);
        }
    }

    fn terminate(&mut self) {
        if let Some(scene) = self.scene.take() {
            scene.release();
        }
        self.gpu = None;
        log::info!("Terminated");
    }
}

/// Seed from the wall clock when none is configured
fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{INITIAL_LIVES, RESTART_DELAY_SECS};
    use crate::renderer::UvMapping;
    use crate::sim::GamePhase;

    fn app() -> StarfieldApp {
        StarfieldApp::new(Settings {
            seed: Some(42),
            ..Default::default()
        })
    }

    fn lose(app: &mut StarfieldApp) {
        app.sim.lives = 0;
        app.sim.phase = GamePhase::Lost;
        app.sim.ship.park();
        app.sim.restart_timer.restart();
    }

    #[test]
    fn test_movement_keys_queue_input() {
        let mut app = app();
        app.handle_key(KeyCode::KeyD);
        app.handle_key(KeyCode::KeyD);
        assert!(!app.update(0.5));
        assert!((app.sim.ship.position.x - 4.0).abs() < 1e-5);

        // Input is consumed by the tick
        app.update(0.5);
        assert!((app.sim.ship.position.x - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_restart_requested_after_delay() {
        let mut app = app();
        lose(&mut app);

        assert!(!app.update(RESTART_DELAY_SECS - 1.0));
        assert!(app.update(1.0));
    }

    #[test]
    fn test_reset_state_restores_defaults() {
        let mut app = app();
        app.handle_key(KeyCode::KeyP);
        app.handle_key(KeyCode::KeyU);
        app.handle_key(KeyCode::ArrowUp);
        lose(&mut app);
        app.reset_state(true);
        assert_eq!(app.sim.phase, GamePhase::Playing);
        assert_eq!(app.sim.lives, INITIAL_LIVES);
        assert_eq!(app.config, ShadingConfig::new(168.0, true));
        assert_eq!(app.config.uv_mapping, UvMapping::FromMesh);
        assert!(app.input.moves.is_empty());

        // Startup scene uses the configured seed, restarts move past it
        assert_eq!(app.sim.seed, 42);
        app.reset_state(true);
        assert_eq!(app.sim.seed, 43);
    }

    #[test]
    fn test_escape_requests_quit() {
        let mut app = app();
        assert!(!app.should_quit());
        app.handle_key(KeyCode::Escape);
        assert!(app.should_quit());
    }

    #[test]
    fn test_program_switch_needs_scene() {
        let mut app = app();
        app.handle_key(KeyCode::Digit3);
        assert_eq!(app.hud().program, ShadingModel::Texture);
    }

    #[test]
    fn test_hud_reports_loss() {
        let mut app = app();
        lose(&mut app);
        let hud = app.hud();
        assert!(hud.lost);
        assert_eq!(hud.lives, 0);
        assert!(hud.title().contains("Lose"));
    }

    #[test]
    fn test_reset_scene_without_gpu_fails() {
        let mut app = app();
        assert!(matches!(app.reset_scene(), Err(SetupError::NotInitialized)));
    }
}
