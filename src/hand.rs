//! Player hand: an ordered sequence of at most six tiles.
//!
//! Ordering is preserved across non-removing operations so that external slot
//! indices stay stable between observations. Slot indices are 0-based here;
//! the HTTP boundary converts from 1-based.

use crate::bag::Bag;
use crate::tile::Tile;

/// Maximum tiles a player can hold.
pub const MAX_HAND_SIZE: usize = 6;

#[derive(Clone, Debug, Default)]
pub struct Hand {
    tiles: Vec<Tile>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            tiles: Vec::with_capacity(MAX_HAND_SIZE),
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Tile> {
        self.tiles.get(index).copied()
    }

    /// Borrow the tiles directly. This is the hot-path view; the slice is
    /// invalidated by any mutation.
    #[inline]
    pub fn as_slice(&self) -> &[Tile] {
        &self.tiles
    }

    /// Owned copy of the tiles in slot order.
    pub fn tiles(&self) -> Vec<Tile> {
        self.tiles.clone()
    }

    /// Add tiles up to capacity; excess tiles are silently dropped.
    pub fn add(&mut self, tiles: &[Tile]) {
        for &t in tiles {
            if self.tiles.len() >= MAX_HAND_SIZE {
                break;
            }
            self.tiles.push(t);
        }
    }

    /// Remove and return the tile at `index`, shifting later tiles down.
    pub fn remove(&mut self, index: usize) -> Option<Tile> {
        if index < self.tiles.len() {
            Some(self.tiles.remove(index))
        } else {
            None
        }
    }

    /// Remove tiles at several indices. Removal goes from highest index to
    /// lowest so earlier removals do not shift later ones; invalid indices
    /// are skipped.
    pub fn remove_multiple(&mut self, indices: &[usize]) -> Vec<Tile> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));

        let mut removed = Vec::with_capacity(sorted.len());
        for idx in sorted {
            if let Some(t) = self.remove(idx) {
                removed.push(t);
            }
        }
        removed
    }

    /// Draw from the bag until the hand holds [`MAX_HAND_SIZE`] tiles (or the
    /// bag runs out).
    pub fn refill(&mut self, bag: &mut Bag) {
        let need = MAX_HAND_SIZE - self.tiles.len();
        if need > 0 {
            let drawn = bag.draw(need);
            self.add(&drawn);
        }
    }

    pub fn contains(&self, tile: Tile) -> bool {
        self.tiles.contains(&tile)
    }

    /// Slot index of the first tile equal to `tile`, if any.
    pub fn index_of(&self, tile: Tile) -> Option<usize> {
        self.tiles.iter().position(|&t| t == tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Color, Shape};

    fn t(shape: Shape, color: Color) -> Tile {
        Tile::new(shape, color)
    }

    fn sample_tiles() -> Vec<Tile> {
        vec![
            t(Shape::Circle, Color::Red),
            t(Shape::Square, Color::Red),
            t(Shape::Diamond, Color::Red),
            t(Shape::Clover, Color::Red),
        ]
    }

    #[test]
    fn test_add_caps_at_six() {
        let mut hand = Hand::new();
        let eight: Vec<Tile> = crate::tile::all_tiles().into_iter().take(8).collect();
        hand.add(&eight);
        assert_eq!(hand.len(), MAX_HAND_SIZE);
        assert_eq!(hand.as_slice(), &eight[..MAX_HAND_SIZE]);
    }

    #[test]
    fn test_remove_shifts_and_preserves_order() {
        let mut hand = Hand::new();
        hand.add(&sample_tiles());
        let removed = hand.remove(1);
        assert_eq!(removed, Some(t(Shape::Square, Color::Red)));
        assert_eq!(
            hand.as_slice(),
            &[
                t(Shape::Circle, Color::Red),
                t(Shape::Diamond, Color::Red),
                t(Shape::Clover, Color::Red),
            ]
        );
        assert_eq!(hand.remove(10), None);
    }

    #[test]
    fn test_remove_multiple_descending() {
        let mut hand = Hand::new();
        hand.add(&sample_tiles());
        // Ascending input must still remove the right tiles.
        let removed = hand.remove_multiple(&[1, 2]);
        assert_eq!(
            removed,
            vec![t(Shape::Diamond, Color::Red), t(Shape::Square, Color::Red)]
        );
        assert_eq!(
            hand.as_slice(),
            &[t(Shape::Circle, Color::Red), t(Shape::Clover, Color::Red)]
        );
    }

    #[test]
    fn test_refill_tops_up_to_six() {
        let mut bag = Bag::new(42);
        let mut hand = Hand::new();
        hand.refill(&mut bag);
        assert_eq!(hand.len(), MAX_HAND_SIZE);
        assert_eq!(bag.remaining(), crate::tile::TILE_TOTAL - MAX_HAND_SIZE);

        hand.remove(0);
        hand.refill(&mut bag);
        assert_eq!(hand.len(), MAX_HAND_SIZE);
    }

    #[test]
    fn test_refill_from_short_bag() {
        let mut bag = Bag::new(42);
        bag.draw(crate::tile::TILE_TOTAL - 2);
        let mut hand = Hand::new();
        hand.refill(&mut bag);
        assert_eq!(hand.len(), 2);
        assert!(bag.is_empty());
    }

    #[test]
    fn test_contains_and_index_of() {
        let mut hand = Hand::new();
        hand.add(&sample_tiles());
        assert!(hand.contains(t(Shape::Diamond, Color::Red)));
        assert_eq!(hand.index_of(t(Shape::Diamond, Color::Red)), Some(2));
        assert!(!hand.contains(t(Shape::Star, Color::Blue)));
        assert_eq!(hand.index_of(t(Shape::Star, Color::Blue)), None);
    }
}
