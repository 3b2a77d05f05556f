//! Core engine types and utilities

pub mod types;
pub mod error;
pub mod logging;
pub mod camera;
pub mod input;
pub mod camera_controller;

pub use types::*;
pub use error::Error;
pub use camera::{CameraLimits, CameraState, CameraUpdate};
pub use camera_controller::{CameraController, ControllerSettings};
pub use input::InputState;
