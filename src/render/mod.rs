//! Projection, viewport culling and CPU previews of the city view

pub mod projection;
pub mod culling;
pub mod preview;

pub use projection::{IsometricProjector, TileMetrics};
pub use culling::{CullStats, TileSprite, ViewportCuller, VisibleSet, MIN_VISIT_BUDGET};
pub use preview::{outline_polygon, render_sprites, save_png};
