//! Bounded tile grid mapping coordinates to terrain

use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::kind::TerrainKind;
use crate::core::error::Error;
use crate::core::types::Result;

/// Smallest allowed grid side
pub const MIN_GRID_SIDE: i32 = 3;

/// Largest allowed `width * height` (a 4096x4096 city)
pub const MAX_TILE_COUNT: usize = 1 << 24;

/// Tile count of a `width x height` grid, or `InvalidSize` when a side is too
/// small or the product exceeds [`MAX_TILE_COUNT`]
fn checked_tile_count(width: i32, height: i32) -> Result<usize> {
    if width < MIN_GRID_SIDE || height < MIN_GRID_SIDE {
        return Err(Error::InvalidSize { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .filter(|&count| count <= MAX_TILE_COUNT)
        .ok_or(Error::InvalidSize { width, height })
}

/// Integer coordinate identifying one tile of the city grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    /// Create a new tile coordinate
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate shifted by `(dx, dy)`
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    /// Adjacent coordinate in the given direction
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        self.offset(dx, dy)
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Terrain for every tile of a `width x height` city.
///
/// Storage is dense and row-major, so a grid never has holes. Deserialized
/// grids are checked against the same size rules as [`TileGrid::filled`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTileGrid")]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<TerrainKind>,
}

/// Unchecked wire form of [`TileGrid`]
#[derive(Deserialize)]
struct RawTileGrid {
    width: i32,
    height: i32,
    tiles: Vec<TerrainKind>,
}

impl TryFrom<RawTileGrid> for TileGrid {
    type Error = Error;

    fn try_from(raw: RawTileGrid) -> Result<Self> {
        let expected = checked_tile_count(raw.width, raw.height)?;
        if raw.tiles.len() != expected {
            return Err(Error::TileCountMismatch { expected, found: raw.tiles.len() });
        }
        Ok(Self {
            width: raw.width,
            height: raw.height,
            tiles: raw.tiles,
        })
    }
}

impl TileGrid {
    /// Create a grid with every tile set to `kind`.
    ///
    /// Fails with [`Error::InvalidSize`] when either side is below
    /// [`MIN_GRID_SIDE`] or the grid would exceed [`MAX_TILE_COUNT`] tiles.
    pub fn filled(width: i32, height: i32, kind: TerrainKind) -> Result<Self> {
        let count = checked_tile_count(width, height)?;
        Ok(Self {
            width,
            height,
            tiles: vec![kind; count],
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// `(width, height)`
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// The root tile of the road network: `(width / 2, height / 2)`
    pub fn center(&self) -> TileCoord {
        TileCoord::new(self.width / 2, self.height / 2)
    }

    /// Whether the coordinate lies inside the grid
    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }

    /// Whether the coordinate lies inside the grid and off its outermost ring
    pub fn is_interior(&self, coord: TileCoord) -> bool {
        coord.x >= 1 && coord.x < self.width - 1 && coord.y >= 1 && coord.y < self.height - 1
    }

    fn index(&self, coord: TileCoord) -> Option<usize> {
        if self.contains(coord) {
            Some(coord.y as usize * self.width as usize + coord.x as usize)
        } else {
            None
        }
    }

    /// Terrain at `coord`, or `None` outside the grid
    pub fn get(&self, coord: TileCoord) -> Option<TerrainKind> {
        self.index(coord).map(|i| self.tiles[i])
    }

    /// Overwrite the terrain at `coord`. Returns false (and does nothing) outside the grid.
    pub fn set(&mut self, coord: TileCoord, kind: TerrainKind) -> bool {
        match self.index(coord) {
            Some(i) => {
                self.tiles[i] = kind;
                true
            }
            None => false,
        }
    }

    /// Whether the tile exists and holds `kind`
    pub fn is(&self, coord: TileCoord, kind: TerrainKind) -> bool {
        self.get(coord) == Some(kind)
    }

    /// Iterate over all tiles in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, TerrainKind)> + '_ {
        let width = self.width;
        self.tiles.iter().enumerate().map(move |(i, &kind)| {
            let i = i as i32;
            (TileCoord::new(i % width, i / width), kind)
        })
    }

    /// In-grid 4-neighbors of `coord`
    pub fn neighbors(&self, coord: TileCoord) -> impl Iterator<Item = TileCoord> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |dir| coord.step(dir))
            .filter(|n| self.contains(*n))
    }

    /// Number of tiles holding `kind`
    pub fn count(&self, kind: TerrainKind) -> usize {
        self.tiles.iter().filter(|&&k| k == kind).count()
    }

    /// Number of 4-adjacent pairs of paved tiles
    pub fn paved_edges(&self) -> usize {
        self.iter()
            .filter(|(_, kind)| kind.is_paved())
            .map(|(coord, _)| {
                [coord.offset(1, 0), coord.offset(0, 1)]
                    .into_iter()
                    .filter(|n| self.get(*n).is_some_and(|k| k.is_paved()))
                    .count()
            })
            .sum()
    }

    /// Render the grid as text, one row per line, using terrain glyphs
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for row in self.tiles.chunks(self.width as usize) {
            out.extend(row.iter().map(|kind| kind.glyph()));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_grid() {
        let grid = TileGrid::filled(10, 5, TerrainKind::Grass).unwrap();

        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.tile_count(), 50);
        assert_eq!(grid.count(TerrainKind::Grass), 50);
    }

    #[test]
    fn test_rejects_small_sizes() {
        assert!(matches!(
            TileGrid::filled(2, 10, TerrainKind::Grass),
            Err(Error::InvalidSize { width: 2, height: 10 })
        ));
        assert!(TileGrid::filled(10, -1, TerrainKind::Grass).is_err());
        assert!(TileGrid::filled(3, 3, TerrainKind::Grass).is_ok());
    }

    #[test]
    fn test_rejects_oversized_grids() {
        assert!(matches!(
            TileGrid::filled(i32::MAX, i32::MAX, TerrainKind::Grass),
            Err(Error::InvalidSize { width: i32::MAX, height: i32::MAX })
        ));
        assert!(TileGrid::filled(4097, 4096, TerrainKind::Grass).is_err());
        assert!(TileGrid::filled(3, (MAX_TILE_COUNT / 3 + 1) as i32, TerrainKind::Grass).is_err());
    }

    #[test]
    fn test_deserialize_roundtrip() {
        let mut grid = TileGrid::filled(4, 3, TerrainKind::Grass).unwrap();
        grid.set(TileCoord::new(3, 2), TerrainKind::Water);

        let json = serde_json::to_string(&grid).unwrap();
        let loaded: TileGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, grid);
        assert_eq!(loaded.get(TileCoord::new(3, 2)), Some(TerrainKind::Water));
    }

    #[test]
    fn test_deserialize_rejects_malformed_grids() {
        let short = r#"{"width":10,"height":10,"tiles":["Grass","Grass","Grass"]}"#;
        let err = serde_json::from_str::<TileGrid>(short).unwrap_err();
        assert!(err.to_string().contains("expected 100 tiles, found 3"), "{}", err);

        let narrow = r#"{"width":2,"height":1,"tiles":["Grass","Grass"]}"#;
        assert!(serde_json::from_str::<TileGrid>(narrow).is_err());

        let huge = r#"{"width":2147483647,"height":2147483647,"tiles":[]}"#;
        assert!(serde_json::from_str::<TileGrid>(huge).is_err());
    }

    #[test]
    fn test_out_of_bounds_queries() {
        let mut grid = TileGrid::filled(4, 4, TerrainKind::Grass).unwrap();

        assert_eq!(grid.get(TileCoord::new(-1, 0)), None);
        assert_eq!(grid.get(TileCoord::new(0, 4)), None);
        assert!(!grid.set(TileCoord::new(4, 0), TerrainKind::Asphalt));
        assert_eq!(grid.count(TerrainKind::Asphalt), 0);
    }

    #[test]
    fn test_interior_excludes_outer_ring() {
        let grid = TileGrid::filled(5, 4, TerrainKind::Grass).unwrap();

        assert!(grid.is_interior(TileCoord::new(1, 1)));
        assert!(grid.is_interior(TileCoord::new(3, 2)));
        assert!(!grid.is_interior(TileCoord::new(0, 2)));
        assert!(!grid.is_interior(TileCoord::new(4, 2)));
        assert!(!grid.is_interior(TileCoord::new(2, 3)));
    }

    #[test]
    fn test_center() {
        assert_eq!(TileGrid::filled(5, 5, TerrainKind::Grass).unwrap().center(), TileCoord::new(2, 2));
        assert_eq!(TileGrid::filled(10, 7, TerrainKind::Grass).unwrap().center(), TileCoord::new(5, 3));
    }

    #[test]
    fn test_neighbors() {
        let grid = TileGrid::filled(10, 5, TerrainKind::Grass).unwrap();

        // Corner tile
        assert_eq!(grid.neighbors(TileCoord::new(0, 0)).count(), 2);
        // Middle tile
        assert_eq!(grid.neighbors(TileCoord::new(5, 2)).count(), 4);
    }

    #[test]
    fn test_iter_row_major() {
        let mut grid = TileGrid::filled(3, 4, TerrainKind::Grass).unwrap();
        grid.set(TileCoord::new(2, 1), TerrainKind::Sand);

        let tiles: Vec<_> = grid.iter().collect();
        assert_eq!(tiles.len(), 12);
        assert_eq!(tiles[0].0, TileCoord::new(0, 0));
        assert_eq!(tiles[5], (TileCoord::new(2, 1), TerrainKind::Sand));
    }

    #[test]
    fn test_paved_edges() {
        let mut grid = TileGrid::filled(5, 5, TerrainKind::Grass).unwrap();
        for coord in [(1, 1), (2, 1), (3, 1), (2, 2)] {
            grid.set(coord.into(), TerrainKind::Asphalt);
        }
        assert_eq!(grid.paved_edges(), 3);
    }

    #[test]
    fn test_to_ascii() {
        let mut grid = TileGrid::filled(3, 3, TerrainKind::Grass).unwrap();
        grid.set(grid.center(), TerrainKind::Asphalt);
        assert_eq!(grid.to_ascii(), "...\n.#.\n...\n");
    }
}
