//! Exhaustive move generation.
//!
//! Enumerates every valid move for the current player: all non-empty subsets
//! of the hand, all distinct orderings of each subset, laid horizontally and
//! vertically from every candidate position. Worst case this is
//! O(2ⁿ · n! · p) with n ≤ 6 and p candidate cells, so four prunings keep
//! typical calls cheap:
//!
//! 1. Subsets that could never form a valid line (duplicate tiles, mixed
//!    color and shape) are dropped before any board work.
//! 2. Equal permutations — common with duplicate tiles in hand — collapse to
//!    one representative via a base-36 positional hash.
//! 3. A run hitting an occupied cell is abandoned before validation.
//! 4. Subsets are visited from larger bitmasks to smaller; once a Qwirkle
//!    (score ≥ 12) is found, no further subsets are tried.
//!
//! [`generate_fast_move`] is the O(hand × candidates) single-tile variant
//! used where full enumeration is too slow.

use std::collections::{HashSet, BTreeSet};

use crate::board::{Board, Position, ORIGIN};
use crate::game::GameState;
use crate::rules::{self, Placement, MAX_LINE};
use crate::tile::{Tile, TILE_KINDS};

/// Any move containing a Qwirkle scores at least this much.
const QWIRKLE_SCORE: i32 = 12;

/// A validated move: 1–6 placements plus the score they would earn.
#[derive(Clone, Debug)]
pub struct Move {
    pub placements: Vec<Placement>,
    pub score: i32,
}

// ── Candidate positions ─────────────────────────────────────────────

/// Cells where a tile could legally land: the origin on an empty board,
/// otherwise every empty cell orthogonally adjacent to an occupied one.
/// Sorted (row, then column) so enumeration order is deterministic.
pub fn candidate_positions(board: &Board) -> Vec<Position> {
    if board.is_empty() {
        return vec![ORIGIN];
    }

    let mut candidates = BTreeSet::new();
    for pos in board.positions() {
        for n in pos.neighbors() {
            if !board.has(n) {
                candidates.insert(n);
            }
        }
    }
    candidates.into_iter().collect()
}

// ── Subset pre-filter ───────────────────────────────────────────────

/// Quick test on a tile subset before any placement work: at most 6 tiles,
/// no repeats, and a shared color or shape. When this holds, some ordering
/// of the subset is a valid line in isolation.
pub fn can_form_valid_line(tiles: &[Tile]) -> bool {
    if tiles.len() > MAX_LINE {
        return false;
    }
    let mut seen = [false; TILE_KINDS];
    for t in tiles {
        let idx = t.index();
        if seen[idx] {
            return false;
        }
        seen[idx] = true;
    }
    if tiles.len() <= 1 {
        return true;
    }
    let first = tiles[0];
    tiles.iter().all(|t| t.color == first.color) || tiles.iter().all(|t| t.shape == first.shape)
}

// ── Permutations ────────────────────────────────────────────────────

/// Positional hash of a tile ordering: base-36 digits of the dense indices.
/// Equal orderings of equal tiles hash equally, which is what lets duplicate
/// permutations collapse.
#[inline]
fn permutation_key(tiles: &[Tile]) -> u64 {
    let mut key = 0u64;
    for t in tiles {
        key = key * TILE_KINDS as u64 + t.index() as u64;
    }
    key
}

/// All distinct orderings of `tiles` (Heap's algorithm), deduplicated by
/// [`permutation_key`]. A hand of three identical tiles yields one
/// permutation, not six.
fn unique_permutations(tiles: &[Tile]) -> Vec<Vec<Tile>> {
    let mut work = tiles.to_vec();
    let n = work.len();
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    if seen.insert(permutation_key(&work)) {
        result.push(work.clone());
    }

    let mut c = [0usize; MAX_LINE];
    let mut i = 0;
    while i < n {
        if c[i] < i {
            if i % 2 == 0 {
                work.swap(0, i);
            } else {
                work.swap(c[i], i);
            }
            if seen.insert(permutation_key(&work)) {
                result.push(work.clone());
            }
            c[i] += 1;
            i = 0;
        } else {
            c[i] = 0;
            i += 1;
        }
    }
    result
}

// ── Generation ──────────────────────────────────────────────────────

/// Lay `perm` in a straight run from `start` and validate it in place.
///
/// The run is abandoned if any of its cells is already occupied. Otherwise
/// the tiles are applied, the touched lines are checked, the move is scored,
/// and the tiles are removed again — the board is unchanged on return.
/// Collinearity, contiguity, and anchoring hold by construction: the cells
/// are consecutive and `start` is a candidate position.
fn try_line_placement(
    board: &mut Board,
    perm: &[Tile],
    start: Position,
    horizontal: bool,
    scratch: &mut Vec<Placement>,
) -> Option<Move> {
    scratch.clear();
    for (i, &tile) in perm.iter().enumerate() {
        let pos = if horizontal {
            Position::new(start.row, start.col + i as i32)
        } else {
            Position::new(start.row + i as i32, start.col)
        };
        if board.has(pos) {
            return None;
        }
        scratch.push(Placement::new(pos, tile));
    }

    for p in scratch.iter() {
        board.set(p.pos, p.tile);
    }
    let valid = rules::placed_lines_valid(board, scratch);
    let score = if valid {
        rules::score_move(board, scratch)
    } else {
        0
    };
    for p in scratch.iter() {
        board.remove(p.pos);
    }

    if valid {
        Some(Move {
            placements: scratch.clone(),
            score,
        })
    } else {
        None
    }
}

/// Every valid move for the current player, sorted by score descending.
pub fn generate_all_moves(state: &GameState) -> Vec<Move> {
    let hand = state.current_hand().as_slice();
    let n = hand.len();
    let mut board = state.board.clone();
    let candidates = candidate_positions(&board);

    let mut moves: Vec<Move> = Vec::new();
    let mut best = 0;
    let mut subset: Vec<Tile> = Vec::with_capacity(MAX_LINE);
    let mut scratch: Vec<Placement> = Vec::with_capacity(MAX_LINE);

    for mask in (1..(1u32 << n)).rev() {
        subset.clear();
        for (i, &tile) in hand.iter().enumerate() {
            if mask & (1 << i) != 0 {
                subset.push(tile);
            }
        }
        if !can_form_valid_line(&subset) {
            continue;
        }

        if subset.len() == 1 {
            let tile = subset[0];
            for &pos in &candidates {
                if !rules::validate_placement(&mut board, pos, tile) {
                    continue;
                }
                let placement = Placement::new(pos, tile);
                board.set(pos, tile);
                let score = rules::score_move(&board, &[placement]);
                board.remove(pos);

                best = best.max(score);
                moves.push(Move {
                    placements: vec![placement],
                    score,
                });
            }
        } else {
            for perm in unique_permutations(&subset) {
                for &start in &candidates {
                    for horizontal in [true, false] {
                        if let Some(mv) =
                            try_line_placement(&mut board, &perm, start, horizontal, &mut scratch)
                        {
                            best = best.max(mv.score);
                            moves.push(mv);
                        }
                    }
                }
            }
        }

        // A Qwirkle is already the practical ceiling; stop enumerating.
        if best >= QWIRKLE_SCORE {
            break;
        }
    }

    moves.sort_by(|a, b| b.score.cmp(&a.score));
    moves
}

/// Best single-tile move, or `None` when no tile fits anywhere. Considers
/// each distinct tile in hand against each candidate position — no subsets,
/// no permutations — which makes it the cheap path for playout loops.
pub fn generate_fast_move(state: &GameState) -> Option<Move> {
    let mut board = state.board.clone();
    let candidates = candidate_positions(&board);

    let mut tried = [false; TILE_KINDS];
    let mut best: Option<Move> = None;

    for &tile in state.current_hand().as_slice() {
        if tried[tile.index()] {
            continue;
        }
        tried[tile.index()] = true;

        for &pos in &candidates {
            if !rules::validate_placement(&mut board, pos, tile) {
                continue;
            }
            let placement = Placement::new(pos, tile);
            board.set(pos, tile);
            let score = rules::score_move(&board, &[placement]);
            board.remove(pos);

            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(Move {
                    placements: vec![placement],
                    score,
                });
            }
        }
    }
    best
}
