//! City generation settings and reproducible city descriptors

pub mod config;
pub mod descriptor;

pub use config::{CitySize, GenerationConfig};
pub use descriptor::CityDescriptor;
