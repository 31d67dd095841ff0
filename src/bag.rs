//! Tile bag: a shuffled 108-tile multiset with a seeded generator.
//!
//! All randomness in a game flows through the bag's `SmallRng`, seeded at
//! construction. For a fixed seed and a fixed sequence of draws and returns,
//! the produced tile sequence is reproducible — this is what makes games,
//! tests, and Monte Carlo playouts deterministic.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::tile::{all_tiles, Tile};

#[derive(Clone)]
pub struct Bag {
    tiles: Vec<Tile>,
    rng: SmallRng,
}

impl Bag {
    /// A full, shuffled bag. The shuffle is a Fisher–Yates pass driven by the
    /// seeded generator.
    pub fn new(seed: u64) -> Bag {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut tiles = all_tiles();
        tiles.shuffle(&mut rng);
        Bag { tiles, rng }
    }

    pub fn remaining(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Remove and return the first `min(n, remaining)` tiles.
    pub fn draw(&mut self, n: usize) -> Vec<Tile> {
        let n = n.min(self.tiles.len());
        self.tiles.drain(..n).collect()
    }

    /// Return tiles to the bag and reshuffle the whole bag, so returned tiles
    /// cannot be tracked.
    pub fn put_back(&mut self, tiles: &[Tile]) {
        self.tiles.extend_from_slice(tiles);
        self.tiles.shuffle(&mut self.rng);
    }

    /// The next `min(n, remaining)` tiles without removing them.
    pub fn peek(&self, n: usize) -> &[Tile] {
        &self.tiles[..n.min(self.tiles.len())]
    }

    /// Duplicate the bag's contents (as a multiset) under a fresh seed: the
    /// copied tiles are reshuffled by the reseeded generator. Used by the
    /// estimator to give each playout an independent, reproducible draw
    /// sequence — without the reshuffle every playout would see the same
    /// draws, since the generator is only consulted on returns.
    pub fn clone_with_seed(&self, seed: u64) -> Bag {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut tiles = self.tiles.clone();
        tiles.shuffle(&mut rng);
        Bag { tiles, rng }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{TILE_COPIES, TILE_KINDS, TILE_TOTAL};

    #[test]
    fn test_new_bag_holds_full_set() {
        let bag = Bag::new(42);
        assert_eq!(bag.remaining(), TILE_TOTAL);

        let mut counts = [0usize; TILE_KINDS];
        for t in bag.peek(TILE_TOTAL) {
            counts[t.index()] += 1;
        }
        assert!(counts.iter().all(|&c| c == TILE_COPIES));
    }

    #[test]
    fn test_same_seed_same_order() {
        let a = Bag::new(7);
        let b = Bag::new(7);
        assert_eq!(a.peek(TILE_TOTAL), b.peek(TILE_TOTAL));
    }

    #[test]
    fn test_different_seed_different_order() {
        let a = Bag::new(1);
        let b = Bag::new(2);
        assert_ne!(a.peek(TILE_TOTAL), b.peek(TILE_TOTAL));
    }

    #[test]
    fn test_draw_removes_from_front() {
        let mut bag = Bag::new(42);
        let expected: Vec<Tile> = bag.peek(6).to_vec();
        let drawn = bag.draw(6);
        assert_eq!(drawn, expected);
        assert_eq!(bag.remaining(), TILE_TOTAL - 6);
    }

    #[test]
    fn test_draw_clamps_to_remaining() {
        let mut bag = Bag::new(42);
        bag.draw(TILE_TOTAL - 2);
        let last = bag.draw(10);
        assert_eq!(last.len(), 2);
        assert!(bag.is_empty());
        assert!(bag.draw(3).is_empty());
    }

    #[test]
    fn test_put_back_conserves_tiles() {
        let mut bag = Bag::new(42);
        let drawn = bag.draw(12);
        bag.put_back(&drawn);
        assert_eq!(bag.remaining(), TILE_TOTAL);

        let mut counts = [0usize; TILE_KINDS];
        for t in bag.peek(TILE_TOTAL) {
            counts[t.index()] += 1;
        }
        assert!(counts.iter().all(|&c| c == TILE_COPIES));
    }

    #[test]
    fn test_clone_with_seed_keeps_contents() {
        let mut bag = Bag::new(42);
        bag.draw(30);
        let clone = bag.clone_with_seed(99);
        assert_eq!(clone.remaining(), bag.remaining());

        // Same multiset, independent order.
        let count = |b: &Bag| {
            let mut counts = [0usize; TILE_KINDS];
            for t in b.peek(TILE_TOTAL) {
                counts[t.index()] += 1;
            }
            counts
        };
        assert_eq!(count(&bag), count(&clone));
    }

    #[test]
    fn test_clone_with_seed_varies_draw_order() {
        let bag = Bag::new(42);
        let a = bag.clone_with_seed(1);
        let b = bag.clone_with_seed(2);
        assert_ne!(a.peek(TILE_TOTAL), b.peek(TILE_TOTAL));
    }

    #[test]
    fn test_clone_with_seed_reseeds_generator() {
        let bag = Bag::new(42);
        let mut a = bag.clone_with_seed(1);
        let mut b = bag.clone_with_seed(1);
        let returned = a.draw(4);
        a.put_back(&returned);
        let returned = b.draw(4);
        b.put_back(&returned);
        // Same reseed, same operations: the reshuffles must agree.
        assert_eq!(a.peek(TILE_TOTAL), b.peek(TILE_TOTAL));
    }
}
