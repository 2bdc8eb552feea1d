use std::fmt;

use serde::{Deserialize, Serialize};

/// Immutable X,Y coordinate in 2D grid space.
///
/// Positions compare by value on both fields. They carry no ordering:
/// the containers only ever ask "same cell or not", so equality and
/// hashing are the whole contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position2D {
    /// Column coordinate.
    pub x: i32,
    /// Row coordinate.
    pub y: i32,
}

/// The eight offsets of the Moore neighborhood, row by row, with the
/// center cell excluded.
pub const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl Position2D {
    /// Create a position from its coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return the position shifted by the given delta.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The eight surrounding cells, in [`MOORE_OFFSETS`] order.
    pub fn moore_neighborhood(self) -> [Self; 8] {
        MOORE_OFFSETS.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// Return `true` if `other` sits in this position's Moore
    /// neighborhood. A position is not adjacent to itself.
    pub fn is_adjacent(self, other: Self) -> bool {
        self != other && (self.x - other.x).abs() <= 1 && (self.y - other.y).abs() <= 1
    }
}

impl fmt::Display for Position2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_both_fields() {
        assert_eq!(Position2D::new(2, 3), Position2D::new(2, 3));
        assert_ne!(Position2D::new(2, 3), Position2D::new(3, 2));
        assert_ne!(Position2D::new(2, 3), Position2D::new(2, 4));
    }

    #[test]
    fn moore_neighborhood_excludes_center() {
        let center = Position2D::new(0, 0);
        let cells = center.moore_neighborhood();
        assert_eq!(cells.len(), 8);
        assert!(!cells.contains(&center));
    }

    #[test]
    fn adjacency_matches_neighborhood() {
        let center = Position2D::new(5, -2);
        for cell in center.moore_neighborhood() {
            assert!(center.is_adjacent(cell));
            assert!(cell.is_adjacent(center));
        }
        assert!(!center.is_adjacent(center));
        assert!(!center.is_adjacent(Position2D::new(7, -2)));
    }

    #[test]
    fn display_shows_coordinates() {
        assert_eq!(Position2D::new(-1, 4).to_string(), "(-1, 4)");
    }
}
