//! Procedural road network generation
//!
//! Roads grow outward from the grid center through a FIFO frontier. Each point
//! is expanded exactly once, and a road may only extend into a direction whose
//! clearance footprint is untouched grass, so two branches can never meet. The
//! paved tiles therefore always form a tree rooted at the center.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::grid::{TileCoord, TileGrid};
use super::kind::TerrainKind;
use crate::core::types::Result;

/// Parameters controlling road growth
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadParams {
    /// Chance that a road continuing straight branches instead (0.0..=1.0)
    pub branch_chance: f64,
    /// Number of roads leaving the center tile, capped by the buildable directions
    pub origin_branches: usize,
}

impl Default for RoadParams {
    fn default() -> Self {
        Self {
            branch_chance: 0.4,
            origin_branches: 4,
        }
    }
}

/// Summary of one generator run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationReport {
    /// Seed the PRNG was created from (drawn randomly when none was given)
    pub seed: u64,
    pub paved_tiles: usize,
    /// Frontier points expanded
    pub processed_points: usize,
}

/// Grows a tree-shaped road network over a grass grid
#[derive(Clone, Debug, Default)]
pub struct RoadNetworkGenerator {
    params: RoadParams,
}

impl RoadNetworkGenerator {
    /// Create a new generator with the given parameters
    pub fn new(params: RoadParams) -> Self {
        let params = RoadParams {
            branch_chance: if params.branch_chance.is_nan() {
                RoadParams::default().branch_chance
            } else {
                params.branch_chance.clamp(0.0, 1.0)
            },
            ..params
        };
        Self { params }
    }

    /// Get generator parameters
    pub fn params(&self) -> &RoadParams {
        &self.params
    }

    /// Generate a `width x height` city. The same size and seed always produce
    /// the same grid; `None` draws a fresh seed.
    pub fn generate(&self, size: (i32, i32), seed: Option<u64>) -> Result<TileGrid> {
        self.generate_with_report(size, seed).map(|(grid, _)| grid)
    }

    /// Like [`generate`](Self::generate), also reporting the seed actually used.
    pub fn generate_with_report(&self, size: (i32, i32), seed: Option<u64>) -> Result<(TileGrid, GenerationReport)> {
        let (width, height) = size;
        let mut grid = TileGrid::filled(width, height, TerrainKind::Grass).inspect_err(|e| {
            log::warn!("Refusing to generate city: {}", e);
        })?;

        let seed = seed.unwrap_or_else(|| {
            let drawn: u64 = rand::random();
            log::info!("No seed given, drew {}", drawn);
            drawn
        });
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let origin = grid.center();
        grid.set(origin, TerrainKind::Asphalt);

        let mut frontier = VecDeque::from([origin]);
        let max_points = grid.tile_count();
        let mut processed = 0;

        while let Some(point) = frontier.pop_front() {
            if processed == max_points {
                log::warn!(
                    "Road growth exceeded {} points on a {}x{} grid, stopping",
                    max_points, width, height
                );
                frontier.clear();
                break;
            }
            processed += 1;

            for dir in self.choose_directions(&grid, point, &mut rng) {
                let next = point.step(dir);
                grid.set(next, TerrainKind::Asphalt);
                frontier.push_back(next);
            }
        }

        let report = GenerationReport {
            seed,
            paved_tiles: grid.count(TerrainKind::Asphalt),
            processed_points: processed,
        };
        log::info!(
            "Generated {}x{} road network: {} paved tiles from {} frontier points (seed {})",
            width, height, report.paved_tiles, report.processed_points, seed
        );
        Ok((grid, report))
    }

    /// Pick the directions to pave from `point`
    fn choose_directions(&self, grid: &TileGrid, point: TileCoord, rng: &mut ChaCha8Rng) -> Vec<Direction> {
        let buildable = buildable_directions(grid, point);
        if buildable.is_empty() {
            return Vec::new();
        }

        let preferred = preferred_continuations(grid, point);
        if preferred.is_empty() {
            // Root of the network: fan out
            if buildable.len() <= self.params.origin_branches {
                return buildable;
            }
            return buildable
                .choose_multiple(rng, self.params.origin_branches)
                .copied()
                .collect();
        }

        let Some(straight) = preferred.into_iter().find(|dir| buildable.contains(dir)) else {
            return Vec::new();
        };

        if rng.gen_bool(self.params.branch_chance) {
            let count = rng.gen_range(1..=buildable.len());
            buildable.choose_multiple(rng, count).copied().collect()
        } else {
            vec![straight]
        }
    }
}

/// Directions whose clearance footprint from `point` is all grass, with the
/// near row off the outermost ring and the look-ahead row inside the grid.
pub fn buildable_directions(grid: &TileGrid, point: TileCoord) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|dir| {
            let footprint = dir.clearance_footprint();
            let near_clear = footprint[..3].iter().all(|&(dx, dy)| {
                let cell = point.offset(dx, dy);
                grid.is_interior(cell) && grid.is(cell, TerrainKind::Grass)
            });
            near_clear
                && footprint[3..]
                    .iter()
                    .all(|&(dx, dy)| grid.is(point.offset(dx, dy), TerrainKind::Grass))
        })
        .collect()
}

/// Directions that would continue an existing road through `point`: the
/// opposite of every direction whose neighbor is already paved.
pub fn preferred_continuations(grid: &TileGrid, point: TileCoord) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|dir| grid.is(point.step(*dir), TerrainKind::Asphalt))
        .map(Direction::opposite)
        .collect()
}

/// Generate a city with default road parameters
pub fn generate(size: (i32, i32), seed: Option<u64>) -> Result<TileGrid> {
    RoadNetworkGenerator::default().generate(size, seed)
}
