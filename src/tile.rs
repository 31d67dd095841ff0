//! Tile model: 6 shapes × 6 colors, three copies of each — 108 tiles total.

use std::fmt;

/// Number of distinct (shape, color) combinations.
pub const TILE_KINDS: usize = 36;

/// Copies of each distinct tile in a full set.
pub const TILE_COPIES: usize = 3;

/// Total tiles in a full set.
pub const TILE_TOTAL: usize = TILE_KINDS * TILE_COPIES;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Shape {
    Circle = 0,
    Square = 1,
    Diamond = 2,
    Clover = 3,
    Star = 4,
    Starburst = 5,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Color {
    Red = 0,
    Orange = 1,
    Yellow = 2,
    Green = 3,
    Blue = 4,
    Purple = 5,
}

pub const ALL_SHAPES: [Shape; 6] = [
    Shape::Circle,
    Shape::Square,
    Shape::Diamond,
    Shape::Clover,
    Shape::Star,
    Shape::Starburst,
];

pub const ALL_COLORS: [Color; 6] = [
    Color::Red,
    Color::Orange,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Purple,
];

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Circle => "Circle",
            Shape::Square => "Square",
            Shape::Diamond => "Diamond",
            Shape::Clover => "Clover",
            Shape::Star => "Star",
            Shape::Starburst => "Starburst",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Red => "Red",
            Color::Orange => "Orange",
            Color::Yellow => "Yellow",
            Color::Green => "Green",
            Color::Blue => "Blue",
            Color::Purple => "Purple",
        };
        f.write_str(name)
    }
}

/// A single Qwirkle tile. Tiles are small `Copy` values; two tiles are equal
/// iff they agree on both shape and color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Tile {
    pub shape: Shape,
    pub color: Color,
}

impl Tile {
    pub const fn new(shape: Shape, color: Color) -> Tile {
        Tile { shape, color }
    }

    /// Dense index in `[0, 36)`: `shape * 6 + color`. Used for fixed-array
    /// duplicate checks in the hot paths.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.shape as usize * 6 + self.color as usize
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.shape)
    }
}

/// The full 108-tile set: three copies of each of the 36 distinct tiles.
pub fn all_tiles() -> Vec<Tile> {
    let mut tiles = Vec::with_capacity(TILE_TOTAL);
    for _ in 0..TILE_COPIES {
        for shape in ALL_SHAPES {
            for color in ALL_COLORS {
                tiles.push(Tile::new(shape, color));
            }
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_dense_and_unique() {
        let mut seen = [false; TILE_KINDS];
        for shape in ALL_SHAPES {
            for color in ALL_COLORS {
                let idx = Tile::new(shape, color).index();
                assert!(idx < TILE_KINDS);
                assert!(!seen[idx], "duplicate index {}", idx);
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_all_tiles_composition() {
        let tiles = all_tiles();
        assert_eq!(tiles.len(), TILE_TOTAL);

        let mut counts = [0usize; TILE_KINDS];
        for t in &tiles {
            counts[t.index()] += 1;
        }
        assert!(counts.iter().all(|&c| c == TILE_COPIES));
    }

    #[test]
    fn test_display_name() {
        let t = Tile::new(Shape::Circle, Color::Red);
        assert_eq!(t.to_string(), "Red Circle");
        let t = Tile::new(Shape::Starburst, Color::Purple);
        assert_eq!(t.to_string(), "Purple Starburst");
    }

    #[test]
    fn test_equality_is_by_value() {
        let a = Tile::new(Shape::Star, Color::Blue);
        let b = Tile::new(Shape::Star, Color::Blue);
        let c = Tile::new(Shape::Star, Color::Green);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
