//! Cardinal grid directions and their road clearance footprints

/// One of the four axis-aligned steps on the tile grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    PlusX,
    MinusX,
    PlusY,
    MinusY,
}

impl Direction {
    /// All directions, in the order the generator evaluates them
    pub const ALL: [Direction; 4] = [
        Direction::PlusX,
        Direction::MinusX,
        Direction::PlusY,
        Direction::MinusY,
    ];

    /// Unit step `(dx, dy)`
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::PlusX => (1, 0),
            Direction::MinusX => (-1, 0),
            Direction::PlusY => (0, 1),
            Direction::MinusY => (0, -1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::PlusX => Direction::MinusX,
            Direction::MinusX => Direction::PlusX,
            Direction::PlusY => Direction::MinusY,
            Direction::MinusY => Direction::PlusY,
        }
    }

    /// Cells that must be clear before a road may extend this way, relative to
    /// the point it grows from: the 2x3 block directly ahead. The first three
    /// entries are the near row (the tile to pave and its two flanks), the last
    /// three the look-ahead row.
    pub fn clearance_footprint(self) -> &'static [(i32, i32); 6] {
        match self {
            Direction::PlusX => &[(1, -1), (1, 0), (1, 1), (2, -1), (2, 0), (2, 1)],
            Direction::MinusX => &[(-1, -1), (-1, 0), (-1, 1), (-2, -1), (-2, 0), (-2, 1)],
            Direction::PlusY => &[(-1, 1), (0, 1), (1, 1), (-1, 2), (0, 2), (1, 2)],
            Direction::MinusY => &[(-1, -1), (0, -1), (1, -1), (-1, -2), (0, -2), (1, -2)],
        }
    }
}
