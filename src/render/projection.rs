//! Isometric projection between tile coordinates and screen pixels
//!
//! A tile `(x, y)` is anchored at `offset + x*U + y*V` with the oblique basis
//! `U = (dx, -dy)` and `V = (dx, dy)`, where `(dx, dy)` is the tile's projected
//! half extent. The anchor is the top-left corner of the tile's bounding box;
//! the diamond itself is centered at `anchor + (dx, dy)`.

use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::core::camera::CameraState;
use crate::core::types::Vec2;
use crate::math::ScreenRect;
use crate::terrain::TileCoord;

/// Static size of one tile before zoom and tilt
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileMetrics {
    /// Tile side in art pixels
    pub tile_size: f32,
    /// Screen pixels per art pixel
    pub pixel_size: f32,
}

impl TileMetrics {
    /// Unscaled tile edge length in screen pixels
    pub fn scale(&self) -> f32 {
        self.tile_size * self.pixel_size
    }
}

impl Default for TileMetrics {
    fn default() -> Self {
        Self {
            tile_size: 10.0,
            pixel_size: 4.0,
        }
    }
}

/// Forward/inverse isometric transform for one camera state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsometricProjector {
    metrics: TileMetrics,
    offset: Vec2,
    distance: f32,
    angle: f32,
}

impl IsometricProjector {
    /// Projector for the camera's current offset, zoom and angle
    pub fn new(metrics: TileMetrics, camera: &CameraState) -> Self {
        Self::with_view(metrics, camera.offset(), camera.distance(), camera.angle())
    }

    /// Projector for explicit view parameters. The values are not clamped;
    /// use [`is_valid`](Self::is_valid) before relying on the inverse.
    pub fn with_view(metrics: TileMetrics, offset: Vec2, distance: f32, angle: f32) -> Self {
        Self { metrics, offset, distance, angle }
    }

    pub fn metrics(&self) -> TileMetrics {
        self.metrics
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Whether the view parameters give an invertible, finite projection
    pub fn is_valid(&self) -> bool {
        let half = self.half_extent();
        self.offset.is_finite()
            && self.distance.is_finite()
            && self.distance > 0.0
            && self.angle > 0.0
            && self.angle < FRAC_PI_2
            && half.is_finite()
            && half.x > 0.0
            && half.y > 0.0
    }

    /// Half width and half height of one projected tile diamond, in pixels
    pub fn half_extent(&self) -> Vec2 {
        let scale = self.metrics.scale() * self.distance;
        Vec2::new(scale * self.angle.cos(), scale * self.angle.sin())
    }

    /// Screen anchor (bounding-box top-left) of a tile
    pub fn forward(&self, coord: TileCoord) -> Vec2 {
        let half = self.half_extent();
        let (x, y) = (coord.x as f32, coord.y as f32);
        self.offset + Vec2::new(half.x * (x + y), half.y * (y - x))
    }

    /// Tile whose anchor lattice point is nearest to `point`.
    ///
    /// Solves `point - forward(0, 0) = k1*U + k2*V` by Cramer's rule and rounds
    /// both coefficients. Returns `None` for a degenerate view.
    pub fn inverse(&self, point: Vec2) -> Option<TileCoord> {
        if !self.is_valid() || !point.is_finite() {
            return None;
        }
        let half = self.half_extent();
        let (dx, dy) = (half.x as f64, half.y as f64);
        let (ux, uy) = (dx, -dy);
        let (vx, vy) = (dx, dy);
        let wx = point.x as f64 - self.offset.x as f64;
        let wy = point.y as f64 - self.offset.y as f64;

        // Proportional to sin(2 * angle)
        let det = ux * vy - uy * vx;
        if det.abs() <= f64::EPSILON {
            return None;
        }
        let k1 = (wx * vy - wy * vx) / det;
        let k2 = (ux * wy - uy * wx) / det;

        Some(TileCoord::new(round_to_i32(k1)?, round_to_i32(k2)?))
    }

    /// Tile whose diamond contains `point` (pointer picking).
    ///
    /// The diamond of a tile maps to the unit square centered on its
    /// coordinates once the point is taken relative to the diamond center, so
    /// rounding alone selects the right tile without any correction step.
    pub fn pick(&self, point: Vec2) -> Option<TileCoord> {
        self.inverse(point - self.half_extent())
    }

    /// Diamond corners relative to a tile's anchor: top, left, bottom, right
    pub fn tile_diamond(&self) -> [Vec2; 4] {
        let half = self.half_extent();
        [
            Vec2::new(half.x, 0.0),
            Vec2::new(0.0, half.y),
            Vec2::new(half.x, 2.0 * half.y),
            Vec2::new(2.0 * half.x, half.y),
        ]
    }

    /// Screen-space bounding box of a tile
    pub fn tile_bounds(&self, coord: TileCoord) -> ScreenRect {
        let anchor = self.forward(coord);
        ScreenRect::new(anchor, anchor + 2.0 * self.half_extent())
    }

    /// Screen position of a tile's diamond center
    pub fn tile_center(&self, coord: TileCoord) -> Vec2 {
        self.forward(coord) + self.half_extent()
    }

    /// Camera offset that puts the center of `coord` at `screen_point`
    pub fn offset_centering(&self, coord: TileCoord, screen_point: Vec2) -> Vec2 {
        screen_point - (self.tile_center(coord) - self.offset)
    }
}

fn round_to_i32(value: f64) -> Option<i32> {
    let rounded = value.round();
    if rounded.is_finite() && rounded >= i32::MIN as f64 && rounded <= i32::MAX as f64 {
        Some(rounded as i32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::{CameraLimits, CameraUpdate};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::f32::consts::FRAC_PI_4;

    fn projector(offset: Vec2, distance: f32, angle: f32) -> IsometricProjector {
        IsometricProjector::with_view(TileMetrics::default(), offset, distance, angle)
    }

    #[test]
    fn test_half_extent() {
        let p = projector(Vec2::ZERO, 2.0, FRAC_PI_4);
        let half = p.half_extent();
        let expected = 10.0 * 4.0 * 2.0 * FRAC_PI_4.cos();
        assert!((half.x - expected).abs() < 1e-4);
        assert!((half.y - expected).abs() < 1e-4);
    }

    #[test]
    fn test_forward_basis() {
        let p = projector(Vec2::new(100.0, 50.0), 1.0, 0.5);
        let half = p.half_extent();

        assert_eq!(p.forward(TileCoord::new(0, 0)), Vec2::new(100.0, 50.0));
        let u = p.forward(TileCoord::new(1, 0)) - p.forward(TileCoord::new(0, 0));
        let v = p.forward(TileCoord::new(0, 1)) - p.forward(TileCoord::new(0, 0));
        assert!((u - Vec2::new(half.x, -half.y)).length() < 1e-4);
        assert!((v - Vec2::new(half.x, half.y)).length() < 1e-4);
    }

    #[test]
    fn test_roundtrip_random_cameras() {
        let limits = CameraLimits::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        let mut camera = CameraState::new(limits);

        for _ in 0..1000 {
            camera.apply(
                CameraUpdate::new()
                    .offset(Vec2::new(rng.gen_range(-2000.0..2000.0), rng.gen_range(-2000.0..2000.0)))
                    .distance(rng.gen_range(limits.min_distance..=limits.max_distance))
                    .angle(rng.gen_range(limits.min_angle..=limits.max_angle)),
            );
            let p = IsometricProjector::new(TileMetrics::default(), &camera);
            let coord = TileCoord::new(rng.gen_range(0..80), rng.gen_range(0..80));

            assert_eq!(p.inverse(p.forward(coord)), Some(coord));
            assert_eq!(p.pick(p.tile_center(coord)), Some(coord));
        }
    }

    #[test]
    fn test_pick_inside_diamond_corners() {
        let p = projector(Vec2::new(640.0, 360.0), 1.0, 0.6);
        let coord = TileCoord::new(4, -3);
        let anchor = p.forward(coord);

        // Points just inside each corner still pick the same tile
        let center = p.tile_center(coord);
        for corner in p.tile_diamond() {
            let inside = center + (anchor + corner - center) * 0.9;
            assert_eq!(p.pick(inside), Some(coord));
        }
    }

    #[test]
    fn test_pick_bounding_box_corner_belongs_to_neighbor() {
        let p = projector(Vec2::ZERO, 1.0, FRAC_PI_4);
        let coord = TileCoord::new(2, 2);
        let half = p.half_extent();

        // The top-left of the bounding box lies outside the diamond, in the
        // tile to the upper left (one step along -V)
        let near_anchor = p.forward(coord) + half * 0.1;
        assert_eq!(p.pick(near_anchor), Some(TileCoord::new(2, 1)));
    }

    #[test]
    fn test_degenerate_angle_has_no_inverse() {
        for angle in [0.0, FRAC_PI_2, -0.3, 2.0, f32::NAN] {
            let p = projector(Vec2::ZERO, 1.0, angle);
            assert_eq!(p.inverse(Vec2::new(10.0, 10.0)), None, "angle {}", angle);
            assert!(!p.is_valid());
        }
        assert_eq!(projector(Vec2::ZERO, 0.0, 0.5).pick(Vec2::ZERO), None);
        assert_eq!(projector(Vec2::ZERO, 1.0, 0.5).pick(Vec2::new(f32::NAN, 0.0)), None);
    }

    #[test]
    fn test_tile_diamond_inside_bounds() {
        let p = projector(Vec2::new(5.0, 7.0), 1.3, 0.4);
        let coord = TileCoord::new(1, 2);
        let bounds = p.tile_bounds(coord);
        let anchor = p.forward(coord);
        let [top, left, bottom, right] = p.tile_diamond();

        let expected = [
            (top, Vec2::new(bounds.center().x, bounds.min.y)),
            (left, Vec2::new(bounds.min.x, bounds.center().y)),
            (bottom, Vec2::new(bounds.center().x, bounds.max.y)),
            (right, Vec2::new(bounds.max.x, bounds.center().y)),
        ];
        for (corner, point) in expected {
            assert!(((anchor + corner) - point).length() < 1e-3);
        }
    }

    #[test]
    fn test_offset_centering() {
        let p = projector(Vec2::new(13.0, -8.0), 1.0, 0.5);
        let coord = TileCoord::new(15, 15);
        let target = Vec2::new(400.0, 300.0);

        let centered = projector(p.offset_centering(coord, target), 1.0, 0.5);
        assert!((centered.tile_center(coord) - target).length() < 1e-3);
        assert_eq!(centered.pick(target), Some(coord));
    }
}
