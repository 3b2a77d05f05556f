//! City terrain: the tile grid and procedural road generation

pub mod kind;
pub mod grid;
pub mod direction;
pub mod generator;

pub use kind::TerrainKind;
pub use grid::{TileCoord, TileGrid, MAX_TILE_COUNT, MIN_GRID_SIDE};
pub use direction::Direction;
pub use generator::{generate, GenerationReport, RoadNetworkGenerator, RoadParams};
