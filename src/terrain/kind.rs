//! Terrain kinds and their render colors

use serde::{Deserialize, Serialize};

use super::grid::TileCoord;

/// Grass shades; a tile picks one per coordinate and jitters it slightly
const GRASS_SHADES: [[u8; 3]; 4] = [
    [58, 140, 62],
    [94, 124, 22],
    [102, 162, 24],
    [58, 109, 53],
];

/// Maximum per-channel color jitter applied to a tile fill
const COLOR_JITTER: i32 = 20;

/// Material painted on a tile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    Grass,
    Stone,
    Sand,
    Water,
    Asphalt,
}

impl TerrainKind {
    pub const ALL: [TerrainKind; 5] = [
        TerrainKind::Grass,
        TerrainKind::Stone,
        TerrainKind::Sand,
        TerrainKind::Water,
        TerrainKind::Asphalt,
    ];

    /// Kind reported for coordinates outside the grid when rendering
    pub const OUT_OF_BOUNDS: TerrainKind = TerrainKind::Water;

    /// Whether the tile is part of the road network
    pub fn is_paved(&self) -> bool {
        matches!(self, TerrainKind::Asphalt)
    }

    /// Flat base color
    pub fn base_color(&self) -> [u8; 3] {
        match self {
            TerrainKind::Grass => GRASS_SHADES[0],
            TerrainKind::Stone => [128, 128, 128],
            TerrainKind::Sand => [237, 201, 175],
            TerrainKind::Water => [30, 80, 150],
            TerrainKind::Asphalt => [70, 70, 78],
        }
    }

    /// Fill color for one tile: the base color (or a grass shade) jittered by a
    /// hash of the coordinate, so the same tile always looks the same.
    pub fn fill_color(&self, coord: TileCoord) -> [u8; 4] {
        let hash = coord_hash(coord);
        let base = match self {
            TerrainKind::Grass => GRASS_SHADES[(hash % GRASS_SHADES.len() as u64) as usize],
            other => other.base_color(),
        };
        // Roads and water stay flat; natural ground gets the full jitter
        let spread = match self {
            TerrainKind::Asphalt | TerrainKind::Water => COLOR_JITTER / 4,
            _ => COLOR_JITTER,
        };

        let mut rgba = [0, 0, 0, 255];
        for channel in 0..3 {
            let bits = (hash >> (16 + channel * 8)) & 0xff;
            let jitter = (bits as i32 % (2 * spread + 1)) - spread;
            rgba[channel] = (base[channel] as i32 + jitter).clamp(0, 255) as u8;
        }
        rgba
    }

    /// Single-character glyph for ASCII maps
    pub fn glyph(&self) -> char {
        match self {
            TerrainKind::Grass => '.',
            TerrainKind::Stone => '^',
            TerrainKind::Sand => ':',
            TerrainKind::Water => '~',
            TerrainKind::Asphalt => '#',
        }
    }

    /// Inverse of [`TerrainKind::glyph`]
    pub fn from_glyph(glyph: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.glyph() == glyph)
    }
}

fn coord_hash(coord: TileCoord) -> u64 {
    let mut z = ((coord.x as i64).wrapping_mul(73_856_093) ^ (coord.y as i64).wrapping_mul(19_349_663)) as u64;
    // splitmix64 finalizer
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_color_is_stable_per_coordinate() {
        let coord = TileCoord::new(7, -3);
        for kind in TerrainKind::ALL {
            assert_eq!(kind.fill_color(coord), kind.fill_color(coord));
        }
    }

    #[test]
    fn test_fill_color_stays_near_base() {
        for x in -20..20 {
            for y in -20..20 {
                let color = TerrainKind::Asphalt.fill_color(TileCoord::new(x, y));
                let base = TerrainKind::Asphalt.base_color();
                for channel in 0..3 {
                    let diff = (color[channel] as i32 - base[channel] as i32).abs();
                    assert!(diff <= COLOR_JITTER / 4);
                }
                assert_eq!(color[3], 255);
            }
        }
    }

    #[test]
    fn test_grass_uses_several_shades() {
        let mut seen = std::collections::HashSet::new();
        for x in 0..30 {
            for y in 0..30 {
                let hash = coord_hash(TileCoord::new(x, y));
                seen.insert(hash % GRASS_SHADES.len() as u64);
            }
        }
        assert_eq!(seen.len(), GRASS_SHADES.len());
    }

    #[test]
    fn test_glyph_roundtrip() {
        for kind in TerrainKind::ALL {
            assert_eq!(TerrainKind::from_glyph(kind.glyph()), Some(kind));
        }
        assert_eq!(TerrainKind::from_glyph('?'), None);
    }
}
