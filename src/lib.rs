//! Isocity - spatial engine for an isometric city builder

pub mod core;
pub mod math;
pub mod terrain;
pub mod generation;
pub mod render;
pub mod scene;
