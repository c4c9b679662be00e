//! Keyboard controls and HUD readout
//!
//! There is no widget toolkit: settings are driven from the keyboard and the
//! readout is written into the window title.

use winit::keyboard::KeyCode;

use crate::camera::{Camera, ProjectionKind};
use crate::renderer::{ShadingModel, UvMapping};
use crate::sim::ShipInput;

/// FOV change per bracket key press (degrees)
pub const FOV_STEP: f32 = 5.0;

/// Camera and UV mapping choices
///
/// The active program is owned by the scene's selector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingConfig {
    pub uv_mapping: UvMapping,
    pub camera: Camera,
}

impl ShadingConfig {
    pub fn new(fov_degrees: f32, mesh_has_uvs: bool) -> Self {
        Self {
            uv_mapping: UvMapping::initial(mesh_has_uvs),
            camera: Camera::new(fov_degrees),
        }
    }

    /// Apply a settings action that needs no GPU work
    ///
    /// Returns `false` when the action does not change anything here.
    pub fn apply(&mut self, action: UiAction, mesh_has_uvs: bool) -> bool {
        match action {
            UiAction::ToggleProjection => {
                self.camera.projection = self.camera.projection.toggled();
                true
            }
            UiAction::AdjustFov(delta) => {
                // The FOV control only exists in perspective
                if self.camera.projection != ProjectionKind::Perspective {
                    return false;
                }
                let before = self.camera.fov_degrees;
                self.camera.set_fov(before + delta);
                self.camera.fov_degrees != before
            }
            UiAction::CycleUvMapping => {
                self.uv_mapping = self.uv_mapping.next(mesh_has_uvs);
                true
            }
            UiAction::SelectProgram(_) | UiAction::Move(_) | UiAction::Quit => false,
        }
    }
}

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    Move(ShipInput),
    ToggleProjection,
    AdjustFov(f32),
    SelectProgram(usize),
    CycleUvMapping,
    Quit,
}

pub fn action_for_key(key: KeyCode) -> Option<UiAction> {
    let action = match key {
        KeyCode::ArrowUp | KeyCode::KeyW => UiAction::Move(ShipInput::Up),
        KeyCode::ArrowDown | KeyCode::KeyS => UiAction::Move(ShipInput::Down),
        KeyCode::ArrowLeft | KeyCode::KeyA => UiAction::Move(ShipInput::Left),
        KeyCode::ArrowRight | KeyCode::KeyD => UiAction::Move(ShipInput::Right),
        KeyCode::KeyP => UiAction::ToggleProjection,
        KeyCode::BracketLeft => UiAction::AdjustFov(-FOV_STEP),
        KeyCode::BracketRight => UiAction::AdjustFov(FOV_STEP),
        KeyCode::Digit1 => UiAction::SelectProgram(0),
        KeyCode::Digit2 => UiAction::SelectProgram(1),
        KeyCode::Digit3 => UiAction::SelectProgram(2),
        KeyCode::Digit4 => UiAction::SelectProgram(3),
        KeyCode::Digit5 => UiAction::SelectProgram(4),
        KeyCode::Digit6 => UiAction::SelectProgram(5),
        KeyCode::KeyU => UiAction::CycleUvMapping,
        KeyCode::Escape => UiAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// Snapshot of everything shown to the player
#[derive(Debug, Clone, PartialEq)]
pub struct HudReadout {
    pub program: ShadingModel,
    pub uv_mapping: UvMapping,
    pub projection: ProjectionKind,
    pub fov_degrees: f32,
    pub lives: u32,
    pub lost: bool,
    pub mesh_has_uvs: bool,
}

impl HudReadout {
    pub fn title(&self) -> String {
        let mut title = format!(
            "Starfield Runner | {} | UV: {} | {}",
            self.program.name(),
            self.uv_mapping.as_str(),
            self.projection.as_str(),
        );
        if self.projection == ProjectionKind::Perspective {
            title.push_str(&format!(" {:.0}°", self.fov_degrees));
        }
        title.push_str(&format!(" | Lives: {}", self.lives));
        if !self.mesh_has_uvs {
            title.push_str(" | Mesh has no UV coords");
        }
        if self.lost {
            title.push_str(" | *Lose!*");
        }
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readout() -> HudReadout {
        HudReadout {
            program: ShadingModel::BlinnPhong,
            uv_mapping: UvMapping::FromMesh,
            projection: ProjectionKind::Perspective,
            fov_degrees: 168.0,
            lives: 3,
            lost: false,
            mesh_has_uvs: true,
        }
    }

    #[test]
    fn test_movement_keys() {
        assert_eq!(action_for_key(KeyCode::KeyW), Some(UiAction::Move(ShipInput::Up)));
        assert_eq!(action_for_key(KeyCode::ArrowLeft), Some(UiAction::Move(ShipInput::Left)));
        assert_eq!(action_for_key(KeyCode::Digit6), Some(UiAction::SelectProgram(5)));
        assert_eq!(action_for_key(KeyCode::KeyZ), None);
    }

    #[test]
    fn test_fov_only_adjusts_in_perspective() {
        let mut config = ShadingConfig::new(90.0, true);
        assert!(config.apply(UiAction::AdjustFov(FOV_STEP), true));
        assert_eq!(config.camera.fov_degrees, 95.0);

        assert!(config.apply(UiAction::ToggleProjection, true));
        assert!(!config.apply(UiAction::AdjustFov(FOV_STEP), true));
        assert_eq!(config.camera.fov_degrees, 95.0);
    }

    #[test]
    fn test_fov_stops_at_limit() {
        let mut config = ShadingConfig::new(179.0, true);
        assert!(!config.apply(UiAction::AdjustFov(FOV_STEP), true));
        assert_eq!(config.camera.fov_degrees, 179.0);
    }

    #[test]
    fn test_uv_cycle_skips_from_mesh_without_uvs() {
        let mut config = ShadingConfig::new(90.0, false);
        assert_eq!(config.uv_mapping, UvMapping::Triplanar);
        for _ in 0..3 {
            config.apply(UiAction::CycleUvMapping, false);
            assert_ne!(config.uv_mapping, UvMapping::FromMesh);
        }
        assert_eq!(config.uv_mapping, UvMapping::Triplanar);
    }

    #[test]
    fn test_title_contents() {
        let title = readout().title();
        assert!(title.contains("blinnphong"));
        assert!(title.contains("From mesh"));
        assert!(title.contains("168°"));
        assert!(title.contains("Lives: 3"));
        assert!(!title.contains("Lose"));
    }

    #[test]
    fn test_title_lose_and_missing_uvs() {
        let hud = HudReadout {
            projection: ProjectionKind::Orthographic,
            lost: true,
            lives: 0,
            mesh_has_uvs: false,
            ..readout()
        };
        let title = hud.title();
        assert!(title.contains("*Lose!*"));
        assert!(title.contains("no UV"));
        assert!(!title.contains('°'));
    }
}
