//! Property-based tests for the core invariants.

use proptest::prelude::*;

use qwirkle::bag::Bag;
use qwirkle::board::{Board, Position, ORIGIN};
use qwirkle::game::GameState;
use qwirkle::hand::Hand;
use qwirkle::movegen::can_form_valid_line;
use qwirkle::rules::{is_valid_line, validate_move, validate_placement, Placement};
use qwirkle::tile::{Tile, ALL_COLORS, ALL_SHAPES, TILE_COPIES, TILE_KINDS, TILE_TOTAL};

fn tile_strategy() -> impl Strategy<Value = Tile> {
    (0..6usize, 0..6usize).prop_map(|(s, c)| Tile::new(ALL_SHAPES[s], ALL_COLORS[c]))
}

fn line_strategy() -> impl Strategy<Value = Vec<Tile>> {
    prop::collection::vec(tile_strategy(), 0..8)
}

/// Reference implementation of line validity, written the slow way.
fn naive_is_valid_line(tiles: &[Tile]) -> bool {
    if tiles.len() <= 1 {
        return true;
    }
    if tiles.len() > 6 {
        return false;
    }
    for i in 0..tiles.len() {
        for j in (i + 1)..tiles.len() {
            if tiles[i] == tiles[j] {
                return false;
            }
        }
    }
    let same_color = tiles.windows(2).all(|w| w[0].color == w[1].color);
    let same_shape = tiles.windows(2).all(|w| w[0].shape == w[1].shape);
    same_color || same_shape
}

/// All orderings of up to four tiles, for brute-force cross-checks.
fn orderings(tiles: &[Tile]) -> Vec<Vec<Tile>> {
    if tiles.len() <= 1 {
        return vec![tiles.to_vec()];
    }
    let mut result = Vec::new();
    for i in 0..tiles.len() {
        let mut rest = tiles.to_vec();
        let head = rest.remove(i);
        for mut tail in orderings(&rest) {
            tail.insert(0, head);
            result.push(tail);
        }
    }
    result
}

fn tile_counts(tiles: impl Iterator<Item = Tile>) -> [usize; TILE_KINDS] {
    let mut counts = [0usize; TILE_KINDS];
    for t in tiles {
        counts[t.index()] += 1;
    }
    counts
}

proptest! {
    // 1. Every seed yields a full bag: 108 tiles, three copies of each kind.
    #[test]
    fn bag_composition_holds_for_any_seed(seed in any::<u64>()) {
        let bag = Bag::new(seed);
        prop_assert_eq!(bag.remaining(), TILE_TOTAL);
        let counts = tile_counts(bag.peek(TILE_TOTAL).iter().copied());
        prop_assert!(counts.iter().all(|&c| c == TILE_COPIES));
    }

    // 2. Draw-then-return conserves the multiset (order intentionally not).
    #[test]
    fn bag_draw_return_conserves_tiles(seed in any::<u64>(), k in 0usize..=120) {
        let mut bag = Bag::new(seed);
        let drawn = bag.draw(k);
        prop_assert_eq!(drawn.len(), k.min(TILE_TOTAL));
        prop_assert_eq!(bag.remaining() + drawn.len(), TILE_TOTAL);

        bag.put_back(&drawn);
        prop_assert_eq!(bag.remaining(), TILE_TOTAL);
        let counts = tile_counts(bag.peek(TILE_TOTAL).iter().copied());
        prop_assert!(counts.iter().all(|&c| c == TILE_COPIES));
    }

    // 3. The fast line check agrees with a naive reference on any sequence.
    #[test]
    fn line_validity_matches_reference(tiles in line_strategy()) {
        prop_assert_eq!(is_valid_line(&tiles), naive_is_valid_line(&tiles));
    }

    // 4. A valid non-trivial line has no duplicate and a shared attribute.
    #[test]
    fn valid_lines_share_an_attribute(tiles in line_strategy()) {
        if is_valid_line(&tiles) && tiles.len() >= 2 {
            let counts = tile_counts(tiles.iter().copied());
            prop_assert!(counts.iter().all(|&c| c <= 1));
            let same_color = tiles.iter().all(|t| t.color == tiles[0].color);
            let same_shape = tiles.iter().all(|t| t.shape == tiles[0].shape);
            prop_assert!(same_color || same_shape);
        }
    }

    // 5. The subset pre-filter is exact: it accepts a subset iff some
    //    ordering of it is a valid line in isolation.
    #[test]
    fn subset_prefilter_matches_permutations(
        tiles in prop::collection::vec(tile_strategy(), 1..5)
    ) {
        let some_ordering_valid = orderings(&tiles).iter().any(|o| is_valid_line(o));
        prop_assert_eq!(can_form_valid_line(&tiles), some_ordering_valid);
    }

    // 6. remove_multiple removes exactly the selected slots, preserving the
    //    order of the remainder.
    #[test]
    fn hand_remove_multiple_is_exact(
        tiles in prop::collection::vec(tile_strategy(), 0..7),
        mask in 0u8..64,
    ) {
        let mut hand = Hand::new();
        hand.add(&tiles);
        let len = hand.len();

        let indices: Vec<usize> = (0..len).filter(|i| mask & (1 << i) != 0).collect();
        let expected_removed: Vec<Tile> =
            indices.iter().rev().map(|&i| tiles[i]).collect();
        let expected_kept: Vec<Tile> = (0..len)
            .filter(|i| !indices.contains(i))
            .map(|i| tiles[i])
            .collect();

        let removed = hand.remove_multiple(&indices);
        prop_assert_eq!(removed, expected_removed);
        prop_assert_eq!(hand.as_slice(), expected_kept.as_slice());
    }

    // 7. Single-placement moves dispatch to the single-tile fast path: both
    //    validators agree on any cell near a small line.
    #[test]
    fn single_move_matches_fast_path(
        line_len in 0usize..5,
        tile in tile_strategy(),
        row in -2i32..4,
        col in -2i32..7,
    ) {
        let mut board = Board::new();
        for (i, &shape) in ALL_SHAPES.iter().take(line_len).enumerate() {
            board.set(Position::new(0, i as i32), Tile::new(shape, ALL_COLORS[0]));
        }
        let pos = Position::new(row, col);
        let fast = validate_placement(&mut board, pos, tile);
        let full = validate_move(&mut board, &[Placement::new(pos, tile)]);
        prop_assert_eq!(fast, full);
    }

    // 8. A swap never changes the number of tiles in play.
    #[test]
    fn swap_conserves_tile_counts(seed in 1u64..5000, slot in 0usize..6) {
        let mut game = GameState::new(seed);
        let bag_before = game.bag.remaining();
        prop_assert!(game.swap_tiles(&[slot]));
        prop_assert_eq!(game.current_hand().len(), 6);
        prop_assert_eq!(game.hands[0].len(), 6);
        prop_assert_eq!(game.bag.remaining(), bag_before);
    }

    // 9. Opening moves must pass through the origin; the engine enforces it
    //    for any tile and cell.
    #[test]
    fn opening_move_requires_origin(tile in tile_strategy(), row in -3i32..4, col in -3i32..4) {
        let mut board = Board::new();
        let pos = Position::new(row, col);
        let ok = validate_placement(&mut board, pos, tile);
        prop_assert_eq!(ok, pos == ORIGIN);
        prop_assert!(board.is_empty());
    }
}
