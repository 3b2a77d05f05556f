//! CPU-side viewport culling and the per-tile render cache

use std::collections::HashMap;

use glam::Vec2;

use crate::math::ScreenRect;
use crate::render::projection::IsometricProjector;
use crate::terrain::{TerrainKind, TileCoord, TileGrid};

/// Lower bound on the number of tiles one recompute may visit. The actual
/// budget is the larger of this and the grid's tile count.
pub const MIN_VISIT_BUDGET: usize = 16_384;

/// Largest |x+y| or |y-x| the culler will walk to
const COORD_LIMIT: f64 = (i32::MAX / 4) as f64;

/// Render object for one visible tile
#[derive(Clone, Debug, PartialEq)]
pub struct TileSprite {
    pub coord: TileCoord,
    pub terrain: TerrainKind,
    /// Screen-space top-left of the tile's bounding box
    pub anchor: Vec2,
    pub fill: [u8; 4],
    /// Diamond corners relative to `anchor` (top, left, bottom, right)
    pub diamond: [Vec2; 4],
}

impl TileSprite {
    fn new(coord: TileCoord, terrain: TerrainKind, projector: &IsometricProjector) -> Self {
        Self {
            coord,
            terrain,
            anchor: projector.forward(coord),
            fill: terrain.fill_color(coord),
            diamond: projector.tile_diamond(),
        }
    }

    /// Absolute diamond corners
    pub fn corners(&self) -> [Vec2; 4] {
        self.diamond.map(|corner| self.anchor + corner)
    }

    /// Half width and half height of the diamond
    pub fn half_extent(&self) -> Vec2 {
        Vec2::new(self.diamond[0].x, self.diamond[1].y)
    }

    /// Diamond center
    pub fn center(&self) -> Vec2 {
        self.anchor + self.half_extent()
    }

    /// Screen-space bounding box
    pub fn bounds(&self) -> ScreenRect {
        ScreenRect::new(self.anchor, self.anchor + 2.0 * self.half_extent())
    }
}

/// Visible tiles keyed by coordinate
pub type VisibleSet = HashMap<TileCoord, TileSprite>;

/// Counters from the last recompute
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CullStats {
    pub visible: usize,
    /// Cached sprites carried over (only moved)
    pub reused: usize,
    /// Sprites built from the grid
    pub created: usize,
    /// Cached sprites discarded
    pub dropped: usize,
    /// Candidate tiles tested against the screen
    pub visited: usize,
    pub budget_exhausted: bool,
}

/// Integer ranges of `s = x + y` and `t = y - x` whose tiles can overlap the
/// screen. A tile's box spans `[ox + dx*s, ox + dx*(s+2))` horizontally and
/// `[oy + dy*t, oy + dy*(t+2))` vertically, so each screen axis bounds one of
/// the two diagonals.
#[derive(Clone, Copy, Debug)]
struct VisibleBounds {
    s_min: i64,
    s_max: i64,
    t_min: i64,
    t_max: i64,
}

impl VisibleBounds {
    fn compute(projector: &IsometricProjector, screen: &ScreenRect) -> Option<Self> {
        let half = projector.half_extent();
        let offset = projector.offset();
        let (dx, dy) = (half.x as f64, half.y as f64);

        let s_min = ((screen.min.x as f64 - offset.x as f64) / dx - 2.0).floor() + 1.0;
        let s_max = ((screen.max.x as f64 - offset.x as f64) / dx).ceil() - 1.0;
        let t_min = ((screen.min.y as f64 - offset.y as f64) / dy - 2.0).floor() + 1.0;
        let t_max = ((screen.max.y as f64 - offset.y as f64) / dy).ceil() - 1.0;

        let all = [s_min, s_max, t_min, t_max];
        if all.iter().any(|v| !v.is_finite() || v.abs() > COORD_LIMIT) {
            return None;
        }
        if s_min > s_max || t_min > t_max {
            return None;
        }
        Some(Self {
            s_min: s_min as i64,
            s_max: s_max as i64,
            t_min: t_min as i64,
            t_max: t_max as i64,
        })
    }

    /// Inclusive `y` range of rows holding at least one visible tile
    fn rows(&self) -> (i64, i64) {
        (
            (self.s_min + self.t_min + 1).div_euclid(2),
            (self.s_max + self.t_max).div_euclid(2),
        )
    }

    /// Inclusive `x` range of visible tiles in row `y` (may be empty)
    fn columns(&self, y: i64) -> (i64, i64) {
        (
            (self.s_min - y).max(y - self.t_max),
            (self.s_max - y).min(y - self.t_min),
        )
    }
}

/// State of one expansion pass
struct Walk<'a> {
    projector: &'a IsometricProjector,
    screen: ScreenRect,
    grid: &'a TileGrid,
    previous: VisibleSet,
    next: VisibleSet,
    stats: CullStats,
    budget: usize,
}

impl Walk<'_> {
    /// Test one tile; admit it if its box overlaps the screen
    fn visit(&mut self, x: i64, y: i64) -> bool {
        if self.stats.visited >= self.budget {
            self.stats.budget_exhausted = true;
            return false;
        }
        self.stats.visited += 1;

        let coord = TileCoord::new(x as i32, y as i32);
        if !self.projector.tile_bounds(coord).intersects(&self.screen) {
            return false;
        }

        let sprite = match self.previous.remove(&coord) {
            Some(mut sprite) => {
                sprite.anchor = self.projector.forward(coord);
                self.stats.reused += 1;
                sprite
            }
            None => {
                self.stats.created += 1;
                let terrain = self.grid.get(coord).unwrap_or(TerrainKind::OUT_OF_BOUNDS);
                TileSprite::new(coord, terrain, self.projector)
            }
        };
        self.next.insert(coord, sprite);
        true
    }

    /// Walk one row outward from the column nearest `seed_x`
    fn walk_row(&mut self, y: i64, lo: i64, hi: i64, seed_x: i64) {
        let preferred = seed_x.clamp(lo, hi);
        let start = if self.visit(preferred, y) {
            preferred
        } else {
            match (lo..=hi).find(|&x| x != preferred && self.visit(x, y)) {
                Some(x) => x,
                None => return,
            }
        };

        let mut x = start + 1;
        while x <= hi && self.visit(x, y) {
            x += 1;
        }
        let mut x = start - 1;
        while x >= lo && self.visit(x, y) {
            x -= 1;
        }
    }
}

/// Computes the visible tile set and caches tile sprites across frames.
///
/// Re-uses sprites across recomputes as long as the tile shape (zoom and
/// angle) is unchanged, so a pan only moves existing sprites.
pub struct ViewportCuller {
    visible: VisibleSet,
    /// Visible coordinates sorted top-to-bottom, left-to-right
    draw_order: Vec<TileCoord>,
    /// Half extent the cached sprites were built for
    shape: Option<Vec2>,
    stats: CullStats,
}

impl ViewportCuller {
    pub fn new() -> Self {
        Self {
            visible: VisibleSet::new(),
            draw_order: Vec::new(),
            shape: None,
            stats: CullStats::default(),
        }
    }

    /// Rebuild the visible set for the projector's camera and a screen of
    /// `screen_size` pixels.
    ///
    /// Rows are walked from the tile under the screen center along `+y` then
    /// `-y`; within a row, `+x` then `-x`, each branch stopping at the first
    /// tile whose bounding box misses the screen. A degenerate camera yields an
    /// empty set.
    pub fn recompute(&mut self, projector: &IsometricProjector, screen_size: Vec2, grid: &TileGrid) -> &VisibleSet {
        let mut dropped = 0;
        let half = projector.half_extent();
        if self.shape != Some(half) {
            dropped += self.visible.len();
            self.visible.clear();
            self.shape = Some(half);
        }

        let screen = ScreenRect::from_size(screen_size);
        let bounds = if projector.is_valid() && screen_size.is_finite() && !screen.is_empty() {
            VisibleBounds::compute(projector, &screen)
        } else {
            None
        };

        let mut walk = Walk {
            projector,
            screen,
            grid,
            previous: std::mem::take(&mut self.visible),
            next: VisibleSet::new(),
            stats: CullStats::default(),
            // The visible set includes the water around the grid, so a small
            // city zoomed out shows more tiles than it has
            budget: grid.tile_count().max(MIN_VISIT_BUDGET),
        };

        if let Some(bounds) = bounds {
            walk.next.reserve(walk.previous.len());
            let (y_min, y_max) = bounds.rows();
            let (seed_x, seed_y) = match projector.pick(screen.center()) {
                Some(seed) => (seed.x as i64, seed.y as i64),
                None => {
                    let y = (y_min + y_max).div_euclid(2);
                    let (lo, hi) = bounds.columns(y);
                    ((lo + hi).div_euclid(2), y)
                }
            };

            // One row and column of slack absorbs float disagreement between the
            // closed-form bounds and the per-tile box test
            let seed_y = seed_y.clamp(y_min - 1, y_max + 1);
            let rows = (seed_y..=y_max + 1).chain((y_min - 1..seed_y).rev());
            for y in rows {
                if walk.stats.budget_exhausted {
                    break;
                }
                let (lo, hi) = bounds.columns(y);
                let (lo, hi) = (lo - 1, hi + 1);
                if lo <= hi {
                    walk.walk_row(y, lo, hi, seed_x);
                }
            }
        }

        let mut stats = walk.stats;
        stats.dropped = dropped + walk.previous.len();
        stats.visible = walk.next.len();
        if stats.budget_exhausted {
            log::warn!(
                "Viewport walk stopped after {} tiles; camera offset {:?} may be degenerate",
                stats.visited,
                projector.offset()
            );
        }
        log::debug!(
            "Viewport recompute: {} visible ({} reused, {} created, {} dropped, {} visited)",
            stats.visible, stats.reused, stats.created, stats.dropped, stats.visited
        );

        self.visible = walk.next;
        self.draw_order.clear();
        self.draw_order.extend(self.visible.keys().copied());
        self.draw_order
            .sort_unstable_by_key(|c| (c.y as i64 - c.x as i64, c.x as i64 + c.y as i64));
        self.stats = stats;
        &self.visible
    }

    /// Drop every cached sprite (e.g. after the grid was regenerated)
    pub fn invalidate(&mut self) {
        self.visible.clear();
        self.draw_order.clear();
        self.shape = None;
    }

    /// Re-read one tile's terrain from the grid if it is currently visible
    pub fn refresh_tile(&mut self, coord: TileCoord, grid: &TileGrid) {
        if let Some(sprite) = self.visible.get_mut(&coord) {
            sprite.terrain = grid.get(coord).unwrap_or(TerrainKind::OUT_OF_BOUNDS);
            sprite.fill = sprite.terrain.fill_color(coord);
        }
    }

    /// The set computed by the last recompute
    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    pub fn get(&self, coord: TileCoord) -> Option<&TileSprite> {
        self.visible.get(&coord)
    }

    /// Visible sprites ordered top-to-bottom on screen
    pub fn draw_order(&self) -> impl Iterator<Item = &TileSprite> + '_ {
        self.draw_order.iter().filter_map(|coord| self.visible.get(coord))
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn last_stats(&self) -> CullStats {
        self.stats
    }
}

impl Default for ViewportCuller {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::projection::TileMetrics;
    use crate::terrain::generate;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    const SCREEN: Vec2 = Vec2::new(800.0, 600.0);

    fn centered(grid: &TileGrid, distance: f32, angle: f32, nudge: Vec2) -> IsometricProjector {
        let metrics = TileMetrics::default();
        let base = IsometricProjector::with_view(metrics, Vec2::ZERO, distance, angle);
        let offset = base.offset_centering(grid.center(), SCREEN * 0.5 + nudge);
        IsometricProjector::with_view(metrics, offset, distance, angle)
    }

    fn brute_force(projector: &IsometricProjector, screen: Vec2, window: i32) -> HashSet<TileCoord> {
        let rect = ScreenRect::from_size(screen);
        let mut out = HashSet::new();
        for x in -window..window {
            for y in -window..window {
                let coord = TileCoord::new(x, y);
                if projector.tile_bounds(coord).intersects(&rect) {
                    out.insert(coord);
                }
            }
        }
        out
    }

    #[test]
    fn test_visible_set_matches_brute_force() {
        let grid = generate((30, 30), Some(1)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut culler = ViewportCuller::new();

        for _ in 0..25 {
            let distance = rng.gen_range(0.5..=2.0);
            let angle = rng.gen_range(0.3..=std::f32::consts::FRAC_PI_4);
            let nudge = Vec2::new(rng.gen_range(-300.0..300.0), rng.gen_range(-300.0..300.0));
            let projector = centered(&grid, distance, angle, nudge);

            let visible: HashSet<TileCoord> = culler.recompute(&projector, SCREEN, &grid).keys().copied().collect();
            let expected = brute_force(&projector, SCREEN, 150);

            assert_eq!(visible, expected, "distance {} angle {} nudge {:?}", distance, angle, nudge);
        }
    }

    #[test]
    fn test_contains_tile_under_screen_center() {
        let grid = generate((30, 30), Some(2)).unwrap();
        let projector = centered(&grid, 1.0, 0.5, Vec2::new(3.3, -7.1));
        let mut culler = ViewportCuller::new();
        culler.recompute(&projector, SCREEN, &grid);

        let seed = projector.pick(SCREEN * 0.5).unwrap();
        assert!(culler.get(seed).is_some());

        let screen = ScreenRect::from_size(SCREEN);
        for sprite in culler.visible().values() {
            assert!(sprite.bounds().intersects(&screen), "{:?} is off screen", sprite.coord);
        }
    }

    #[test]
    fn test_terrain_resolved_from_grid_or_water() {
        let grid = generate((5, 5), Some(1)).unwrap();
        let projector = centered(&grid, 1.0, 0.5, Vec2::ZERO);
        let mut culler = ViewportCuller::new();
        culler.recompute(&projector, SCREEN, &grid);

        let outside = culler.get(TileCoord::new(-1, -1)).expect("ring around a small grid is visible");
        assert_eq!(outside.terrain, TerrainKind::Water);

        for (coord, kind) in grid.iter() {
            let sprite = culler.get(coord).expect("whole 5x5 grid fits on screen");
            assert_eq!(sprite.terrain, kind);
            assert_eq!(sprite.fill, kind.fill_color(coord));
        }
    }

    #[test]
    fn test_pan_reuses_cached_tiles() {
        let grid = generate((30, 30), Some(3)).unwrap();
        let projector = centered(&grid, 1.0, 0.6, Vec2::ZERO);
        let mut culler = ViewportCuller::new();
        culler.recompute(&projector, SCREEN, &grid);
        let first = culler.last_stats();
        assert_eq!(first.reused, 0);
        assert_eq!(first.created, first.visible);

        let panned = IsometricProjector::with_view(
            projector.metrics(),
            projector.offset() + Vec2::new(7.5, 0.0),
            1.0,
            0.6,
        );
        culler.recompute(&panned, SCREEN, &grid);
        let stats = culler.last_stats();

        assert!(stats.reused > stats.created, "a small pan should mostly reuse sprites: {:?}", stats);
        assert_eq!(stats.reused + stats.created, stats.visible);
        assert_eq!(first.visible + stats.created, stats.visible + stats.dropped);
        for sprite in culler.visible().values() {
            assert_eq!(sprite.anchor, panned.forward(sprite.coord));
        }
    }

    #[test]
    fn test_zoom_invalidates_cache() {
        let grid = generate((30, 30), Some(4)).unwrap();
        let mut culler = ViewportCuller::new();
        culler.recompute(&centered(&grid, 1.0, 0.6, Vec2::ZERO), SCREEN, &grid);
        let before = culler.len();

        culler.recompute(&centered(&grid, 1.2, 0.6, Vec2::ZERO), SCREEN, &grid);
        let stats = culler.last_stats();
        assert_eq!(stats.reused, 0);
        assert_eq!(stats.created, stats.visible);
        assert_eq!(stats.dropped, before);

        let half = culler.visible().values().next().unwrap().half_extent();
        assert!((half.x - 40.0 * 1.2 * 0.6_f32.cos()).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_camera_yields_empty_set() {
        let grid = generate((10, 10), Some(5)).unwrap();
        let mut culler = ViewportCuller::new();
        culler.recompute(&centered(&grid, 1.0, 0.6, Vec2::ZERO), SCREEN, &grid);
        assert!(!culler.is_empty());

        let flat = IsometricProjector::with_view(TileMetrics::default(), Vec2::ZERO, 1.0, 0.0);
        culler.recompute(&flat, SCREEN, &grid);
        assert!(culler.is_empty());

        let lost = IsometricProjector::with_view(TileMetrics::default(), Vec2::new(f32::NAN, 0.0), 1.0, 0.5);
        culler.recompute(&lost, SCREEN, &grid);
        assert!(culler.is_empty());
        assert_eq!(culler.draw_order().count(), 0);
    }

    #[test]
    fn test_walk_is_bounded() {
        crate::core::logging::init_for_tests();
        let grid = generate((5, 5), Some(6)).unwrap();
        let projector = IsometricProjector::with_view(TileMetrics::default(), Vec2::ZERO, 0.5, 0.3);
        let mut culler = ViewportCuller::new();

        culler.recompute(&projector, Vec2::splat(1.0e6), &grid);
        let stats = culler.last_stats();
        assert!(stats.budget_exhausted);
        assert!(stats.visited <= MIN_VISIT_BUDGET);
        assert!(culler.len() <= MIN_VISIT_BUDGET);
    }

    #[test]
    fn test_small_grid_keeps_whole_water_ring() {
        let grid = generate((3, 3), Some(6)).unwrap();
        let screen = Vec2::new(1920.0, 1080.0);
        let base = IsometricProjector::with_view(TileMetrics::default(), Vec2::ZERO, 0.5, 0.3);
        let offset = base.offset_centering(grid.center(), screen * 0.5);
        let projector = IsometricProjector::with_view(TileMetrics::default(), offset, 0.5, 0.3);

        let mut culler = ViewportCuller::new();
        let visible: HashSet<TileCoord> = culler.recompute(&projector, screen, &grid).keys().copied().collect();

        assert!(!culler.last_stats().budget_exhausted);
        assert!(visible.len() > grid.tile_count());
        assert_eq!(visible, brute_force(&projector, screen, 150));
    }

    #[test]
    fn test_refresh_tile_and_invalidate() {
        let mut grid = generate((10, 10), Some(7)).unwrap();
        let projector = centered(&grid, 1.0, 0.6, Vec2::ZERO);
        let mut culler = ViewportCuller::new();
        culler.recompute(&projector, SCREEN, &grid);

        let coord = TileCoord::new(0, 0);
        grid.set(coord, TerrainKind::Sand);
        culler.refresh_tile(coord, &grid);
        assert_eq!(culler.get(coord).unwrap().terrain, TerrainKind::Sand);

        culler.invalidate();
        assert!(culler.is_empty());
        culler.recompute(&projector, SCREEN, &grid);
        assert_eq!(culler.last_stats().reused, 0);
    }

    #[test]
    fn test_draw_order_top_to_bottom() {
        let grid = generate((20, 20), Some(8)).unwrap();
        let mut culler = ViewportCuller::new();
        culler.recompute(&centered(&grid, 1.0, 0.6, Vec2::ZERO), SCREEN, &grid);

        let anchors: Vec<f32> = culler.draw_order().map(|s| s.anchor.y).collect();
        assert_eq!(anchors.len(), culler.len());
        assert!(anchors.windows(2).all(|w| w[0] <= w[1] + 1e-3));
    }
}
