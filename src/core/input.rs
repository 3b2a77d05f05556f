//! Input state tracking

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixels of touchpad scroll treated as one wheel notch
const PIXELS_PER_SCROLL_LINE: f32 = 40.0;

/// Tracks keyboard, pointer and scroll input between frames
pub struct InputState {
    /// Currently pressed keys
    keys_pressed: HashSet<KeyCode>,
    /// Keys pressed this frame
    keys_just_pressed: HashSet<KeyCode>,
    /// Current pointer position in window pixels
    pointer_position: (f32, f32),
    /// Vertical scroll accumulated this frame, in wheel lines (positive = up)
    scroll_delta: f32,
    /// Currently pressed mouse buttons
    mouse_buttons: HashSet<MouseButton>,
    /// Mouse buttons pressed this frame
    mouse_just_pressed: HashSet<MouseButton>,
}

impl InputState {
    /// Create new input state
    pub fn new() -> Self {
        Self {
            keys_pressed: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            pointer_position: (0.0, 0.0),
            scroll_delta: 0.0,
            mouse_buttons: HashSet::new(),
            mouse_just_pressed: HashSet::new(),
        }
    }

    /// Process a window event
    pub fn process_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(key_code),
                    state,
                    ..
                },
                ..
            } => match state {
                ElementState::Pressed => self.press_key(*key_code),
                ElementState::Released => self.release_key(*key_code),
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_position = (position.x as f32, position.y as f32);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_SCROLL_LINE,
                };
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.press_mouse_button(*button),
                ElementState::Released => self.release_mouse_button(*button),
            },
            _ => {}
        }
    }

    /// Record a key press
    pub fn press_key(&mut self, key: KeyCode) {
        if self.keys_pressed.insert(key) {
            self.keys_just_pressed.insert(key);
        }
    }

    /// Record a key release
    pub fn release_key(&mut self, key: KeyCode) {
        self.keys_pressed.remove(&key);
    }

    /// Record a mouse button press
    pub fn press_mouse_button(&mut self, button: MouseButton) {
        if self.mouse_buttons.insert(button) {
            self.mouse_just_pressed.insert(button);
        }
    }

    /// Record a mouse button release
    pub fn release_mouse_button(&mut self, button: MouseButton) {
        self.mouse_buttons.remove(&button);
    }

    /// Record a wheel movement in lines (positive = up)
    pub fn scroll(&mut self, lines: f32) {
        self.scroll_delta += lines;
    }

    /// Record a pointer move
    pub fn move_pointer(&mut self, x: f32, y: f32) {
        self.pointer_position = (x, y);
    }

    /// Call at end of frame to reset per-frame state
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
        self.mouse_just_pressed.clear();
        self.scroll_delta = 0.0;
    }

    /// Check if key is currently pressed
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if key was just pressed this frame
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.keys_just_pressed.contains(&key)
    }

    /// Scroll accumulated this frame
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Get current pointer position
    pub fn pointer_position(&self) -> (f32, f32) {
        self.pointer_position
    }

    /// Check if mouse button is pressed
    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    /// Check if mouse button went down this frame
    pub fn is_mouse_button_just_pressed(&self, button: MouseButton) -> bool {
        self.mouse_just_pressed.contains(&button)
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
