//! Keyboard/scroll camera controller for the city view

use crate::core::camera::{CameraState, CameraUpdate};
use crate::core::input::InputState;
use crate::core::types::Vec2;
use winit::keyboard::KeyCode;

/// Tuning for [`CameraController`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerSettings {
    /// Pan speed in pixels per frame at distance 1.0
    pub move_speed: f32,
    /// Angle change per frame while a tilt key is held, in radians
    pub tilt_step: f32,
    /// Distance change per scroll line
    pub zoom_step: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            move_speed: 10.0,
            tilt_step: 0.1,
            zoom_step: 0.1,
        }
    }
}

/// Pan/zoom/tilt controller.
///
/// W/S/A/D pan (scaled by the current zoom), U/J tilt, the scroll wheel zooms.
/// Produces at most one [`CameraUpdate`] per frame.
#[derive(Default)]
pub struct CameraController {
    pub settings: ControllerSettings,
}

impl CameraController {
    /// Create new controller
    pub fn new(settings: ControllerSettings) -> Self {
        Self { settings }
    }

    /// Translate this frame's input into a camera update (empty if idle)
    pub fn frame_update(&self, camera: &CameraState, input: &InputState) -> CameraUpdate {
        let mut update = CameraUpdate::new();

        let mut tilt = 0.0;
        if input.is_key_pressed(KeyCode::KeyU) {
            tilt += self.settings.tilt_step;
        }
        if input.is_key_pressed(KeyCode::KeyJ) {
            tilt -= self.settings.tilt_step;
        }
        if tilt != 0.0 {
            update = update.angle(camera.angle() + tilt);
        }

        let scroll = input.scroll_delta();
        if scroll != 0.0 {
            update = update.distance(camera.distance() + scroll.signum() * self.settings.zoom_step);
        }

        let mut direction = Vec2::ZERO;
        if input.is_key_pressed(KeyCode::KeyW) {
            direction.y += 1.0;
        }
        if input.is_key_pressed(KeyCode::KeyS) {
            direction.y -= 1.0;
        }
        if input.is_key_pressed(KeyCode::KeyA) {
            direction.x += 1.0;
        }
        if input.is_key_pressed(KeyCode::KeyD) {
            direction.x -= 1.0;
        }
        if direction != Vec2::ZERO {
            let step = (direction * self.settings.move_speed * camera.distance()).trunc();
            update = update.offset(camera.offset() + step);
        }

        update
    }

    /// Apply this frame's input to the camera. Returns whether it changed.
    pub fn update(&self, camera: &mut CameraState, input: &InputState) -> bool {
        let update = self.frame_update(camera, input);
        if update.is_empty() {
            return false;
        }
        camera.apply(update)
    }
}
