//! Serializable description of a generated city
//!
//! A city is fully determined by its size, seed and road parameters, so the
//! descriptor stores those instead of the tiles.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::config::GenerationConfig;
use crate::core::types::Result;
use crate::terrain::{GenerationReport, RoadParams, TileGrid};

/// Name plus the inputs that reproduce a city's grid
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CityDescriptor {
    pub name: String,
    pub seed: u64,
    /// Grid `(width, height)`
    pub size: (i32, i32),
    #[serde(default)]
    pub road_params: RoadParams,
}

impl CityDescriptor {
    /// Descriptor for a finished generator run
    pub fn from_report(name: impl Into<String>, config: &GenerationConfig, report: &GenerationReport) -> Self {
        Self {
            name: name.into(),
            seed: report.seed,
            size: config.size,
            road_params: config.road_params.clone(),
        }
    }

    /// Config that regenerates this city
    pub fn config(&self) -> GenerationConfig {
        GenerationConfig {
            size: self.size,
            seed: Some(self.seed),
            road_params: self.road_params.clone(),
        }
    }

    /// Rebuild the grid
    pub fn regenerate(&self) -> Result<TileGrid> {
        Ok(self.config().generate()?.0)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the descriptor as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a descriptor written by [`save`](Self::save)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}
