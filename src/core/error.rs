//! Error types for the isocity engine

use thiserror::Error;

use crate::terrain::grid::{MAX_TILE_COUNT, MIN_GRID_SIDE};

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "invalid grid size {width}x{height}: sides must be at least {min} and the grid at most {max} tiles",
        min = MIN_GRID_SIDE,
        max = MAX_TILE_COUNT
    )]
    InvalidSize { width: i32, height: i32 },

    #[error("corrupt grid: expected {expected} tiles, found {found}")]
    TileCountMismatch { expected: usize, found: usize },

    #[error("invalid camera limits: {0}")]
    InvalidCameraLimits(String),

    #[error("descriptor error: {0}")]
    Descriptor(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
