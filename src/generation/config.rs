//! Map size presets and generation settings

use serde::{Deserialize, Serialize};

use crate::core::types::Result;
use crate::terrain::{GenerationReport, RoadNetworkGenerator, RoadParams, TileGrid};

/// Preset city dimensions offered by the new-city menu
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitySize {
    #[default]
    Small,
    Medium,
    Large,
}

impl CitySize {
    pub const ALL: [CitySize; 3] = [CitySize::Small, CitySize::Medium, CitySize::Large];

    /// Grid `(width, height)` of the preset
    pub fn dims(self) -> (i32, i32) {
        match self {
            CitySize::Small => (30, 30),
            CitySize::Medium => (50, 50),
            CitySize::Large => (80, 80),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CitySize::Small => "small",
            CitySize::Medium => "medium",
            CitySize::Large => "large",
        }
    }

    /// Parse a preset name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.name().eq_ignore_ascii_case(name))
    }
}

/// Everything needed to grow one city
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Grid `(width, height)`
    pub size: (i32, i32),
    /// PRNG seed; `None` draws one at generation time
    pub seed: Option<u64>,
    #[serde(default)]
    pub road_params: RoadParams,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::from_preset(CitySize::default(), None)
    }
}

impl GenerationConfig {
    /// Config for a size preset with default road parameters
    pub fn from_preset(size: CitySize, seed: Option<u64>) -> Self {
        Self {
            size: size.dims(),
            seed,
            road_params: RoadParams::default(),
        }
    }

    /// Grow the city described by this config
    pub fn generate(&self) -> Result<(TileGrid, GenerationReport)> {
        RoadNetworkGenerator::new(self.road_params.clone()).generate_with_report(self.size, self.seed)
    }
}
