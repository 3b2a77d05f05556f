//! The interactive city view

pub mod config;
pub mod city;

pub use config::SceneConfig;
pub use city::CityScene;
