//! Configuration for the city view

use glam::Vec2;

use crate::core::camera::CameraLimits;
use crate::core::camera_controller::ControllerSettings;
use crate::core::types::Result;
use crate::generation::GenerationConfig;
use crate::render::projection::TileMetrics;

/// Configuration for a city scene
#[derive(Clone, Debug)]
pub struct SceneConfig {
    /// City size, seed and road parameters
    pub generation: GenerationConfig,
    /// Window size in pixels
    pub screen_size: Vec2,
    pub metrics: TileMetrics,
    pub camera_limits: CameraLimits,
    pub controller: ControllerSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            screen_size: Vec2::new(1280.0, 720.0),
            metrics: TileMetrics::default(),
            camera_limits: CameraLimits::default(),
            controller: ControllerSettings::default(),
        }
    }
}

impl SceneConfig {
    /// Check the parts that can be misconfigured
    pub fn validate(&self) -> Result<()> {
        self.camera_limits.validate()
    }
}
