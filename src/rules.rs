//! Rules kernel: line extraction, line validity, move validation, scoring.
//!
//! A "line" through a position is the maximal contiguous run of occupied
//! cells along a row or column. Validity couples per-cell checks (emptiness,
//! adjacency) with whole-line constraints (≤6 tiles, no duplicates, shared
//! color or shape) and, for multi-tile moves, contiguity along one axis.
//!
//! The hot paths here are called once per candidate move by the generator
//! and hundreds of thousands of times per win-probability estimate, so the
//! kernel avoids heap traffic: line extraction fills a fixed
//! [`LineBuffer`], duplicate detection uses a 36-slot boolean table keyed by
//! the dense tile index, and validation temporarily places tiles on the live
//! board and removes them again instead of cloning it.

use crate::board::{Board, Position, ORIGIN};
use crate::tile::{Tile, TILE_KINDS};

/// Longest legal line: one tile of each kind in the shared attribute.
pub const MAX_LINE: usize = 6;

/// Bonus for completing a 6-tile line (a "Qwirkle"), on top of its length.
pub const QWIRKLE_BONUS: i32 = 6;

/// One tile proposed at one position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Placement {
    pub pos: Position,
    pub tile: Tile,
}

impl Placement {
    pub const fn new(pos: Position, tile: Tile) -> Placement {
        Placement { pos, tile }
    }
}

// ── Line buffer ─────────────────────────────────────────────────────

/// Fixed-capacity buffer for line extraction. Seven slots suffice for any
/// run that could still be valid (six tiles plus one over the limit); longer
/// runs keep counting in `len` without storing, which is enough to reject
/// them.
#[derive(Clone, Copy)]
pub struct LineBuffer {
    tiles: [Tile; LineBuffer::CAPACITY],
    len: usize,
}

impl LineBuffer {
    pub const CAPACITY: usize = MAX_LINE + 1;

    pub fn new() -> LineBuffer {
        LineBuffer {
            tiles: [Tile::new(crate::tile::Shape::Circle, crate::tile::Color::Red);
                LineBuffer::CAPACITY],
            len: 0,
        }
    }

    #[inline]
    fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    fn push(&mut self, tile: Tile) {
        if self.len < LineBuffer::CAPACITY {
            self.tiles[self.len] = tile;
        }
        self.len += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The extracted tiles, in line order. Truncated at capacity for
    /// overlong (necessarily invalid) runs.
    pub fn as_slice(&self) -> &[Tile] {
        &self.tiles[..self.len.min(LineBuffer::CAPACITY)]
    }

    /// Line validity without allocation: length ≤ 1 is valid; otherwise the
    /// line must have ≤ 6 tiles, no repeated tile, and a shared color or
    /// shape.
    pub fn is_valid(&self) -> bool {
        if self.len <= 1 {
            return true;
        }
        if self.len > MAX_LINE {
            return false;
        }
        let tiles = &self.tiles[..self.len];

        let mut seen = [false; TILE_KINDS];
        for t in tiles {
            let idx = t.index();
            if seen[idx] {
                return false;
            }
            seen[idx] = true;
        }

        let first = tiles[0];
        tiles.iter().all(|t| t.color == first.color)
            || tiles.iter().all(|t| t.shape == first.shape)
    }
}

impl Default for LineBuffer {
    fn default() -> LineBuffer {
        LineBuffer::new()
    }
}

// ── Line extraction ─────────────────────────────────────────────────

/// Walk backward from an occupied `pos` to the first cell of its run.
#[inline]
fn run_start(board: &Board, pos: Position, dr: i32, dc: i32) -> Position {
    let mut p = pos;
    loop {
        let prev = Position::new(p.row - dr, p.col - dc);
        if board.has(prev) {
            p = prev;
        } else {
            return p;
        }
    }
}

#[inline]
fn extract_line_into(board: &Board, pos: Position, dr: i32, dc: i32, buf: &mut LineBuffer) {
    buf.clear();
    if !board.has(pos) {
        return;
    }
    let mut p = run_start(board, pos, dr, dc);
    while let Some(tile) = board.get(p) {
        buf.push(tile);
        p = Position::new(p.row + dr, p.col + dc);
    }
}

/// Fill `buf` with the horizontal line through `pos` (left to right). An
/// empty center yields an empty buffer.
#[inline]
pub fn horizontal_line_into(board: &Board, pos: Position, buf: &mut LineBuffer) {
    extract_line_into(board, pos, 0, 1, buf);
}

/// Fill `buf` with the vertical line through `pos` (top to bottom).
#[inline]
pub fn vertical_line_into(board: &Board, pos: Position, buf: &mut LineBuffer) {
    extract_line_into(board, pos, 1, 0, buf);
}

/// Allocating variant of [`horizontal_line_into`] for general callers.
pub fn horizontal_line(board: &Board, pos: Position) -> Vec<Tile> {
    let mut buf = LineBuffer::new();
    horizontal_line_into(board, pos, &mut buf);
    buf.as_slice().to_vec()
}

/// Allocating variant of [`vertical_line_into`] for general callers.
pub fn vertical_line(board: &Board, pos: Position) -> Vec<Tile> {
    let mut buf = LineBuffer::new();
    vertical_line_into(board, pos, &mut buf);
    buf.as_slice().to_vec()
}

// ── Line validity ───────────────────────────────────────────────────

/// Whether a sequence of tiles is a legal line: length ≤ 1, or ≤ 6 tiles
/// with no duplicates sharing a color or a shape.
pub fn is_valid_line(tiles: &[Tile]) -> bool {
    if tiles.len() <= 1 {
        return true;
    }
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

    let first = tiles[0];
    tiles.iter().all(|t| t.color == first.color) || tiles.iter().all(|t| t.shape == first.shape)
}

// ── Placement validation ────────────────────────────────────────────

/// Whether placing `tile` at the empty position `pos` is legal: on an empty
/// board the tile must go at the origin; otherwise it must touch an occupied
/// neighbor and both lines through it must stay valid.
///
/// The tile is placed temporarily, both lines are checked with zero-alloc
/// extraction, and the tile is removed again. The board is unchanged on
/// return.
pub fn validate_placement(board: &mut Board, pos: Position, tile: Tile) -> bool {
    if board.has(pos) {
        return false;
    }
    if board.is_empty() {
        return pos == ORIGIN;
    }
    if !board.has_neighbor(pos) {
        return false;
    }

    board.set(pos, tile);
    let mut buf = LineBuffer::new();
    horizontal_line_into(board, pos, &mut buf);
    let mut ok = buf.is_valid();
    if ok {
        vertical_line_into(board, pos, &mut buf);
        ok = buf.is_valid();
    }
    board.remove(pos);
    ok
}

/// Whether every horizontal and vertical line touched by `placements` is
/// valid. The placements must already be applied to `board`.
pub fn placed_lines_valid(board: &Board, placements: &[Placement]) -> bool {
    let mut buf = LineBuffer::new();
    for p in placements {
        horizontal_line_into(board, p.pos, &mut buf);
        if !buf.is_valid() {
            return false;
        }
        vertical_line_into(board, p.pos, &mut buf);
        if !buf.is_valid() {
            return false;
        }
    }
    true
}

/// Full validation of an arbitrary move:
///
/// 1. 1–6 placements at distinct, collinear positions.
/// 2. Every position empty on the current board.
/// 3. On an empty board one placement is at the origin; otherwise at least
///    one placement touches a pre-existing tile.
/// 4. With all tiles placed, the segment between the extreme coordinates on
///    the common axis is fully occupied (existing tiles may fill gaps).
/// 5. Every touched line is valid.
///
/// Single placements dispatch to the fast path. The placements are applied
/// temporarily for steps 4–5 and removed again; the board is unchanged on
/// return.
pub fn validate_move(board: &mut Board, placements: &[Placement]) -> bool {
    if placements.is_empty() || placements.len() > MAX_LINE {
        return false;
    }
    if placements.len() == 1 {
        return validate_placement(board, placements[0].pos, placements[0].tile);
    }

    let first = placements[0].pos;
    let same_row = placements.iter().all(|p| p.pos.row == first.row);
    let same_col = placements.iter().all(|p| p.pos.col == first.col);
    if !same_row && !same_col {
        return false;
    }
    for (i, p) in placements.iter().enumerate() {
        if placements[..i].iter().any(|q| q.pos == p.pos) {
            return false;
        }
        if board.has(p.pos) {
            return false;
        }
    }

    // Anchor rule, checked against the board before placement: any occupied
    // neighbor is necessarily a pre-existing tile.
    if board.is_empty() {
        if !placements.iter().any(|p| p.pos == ORIGIN) {
            return false;
        }
    } else if !placements.iter().any(|p| board.has_neighbor(p.pos)) {
        return false;
    }

    for p in placements {
        board.set(p.pos, p.tile);
    }

    let contiguous = if same_row {
        let min = placements.iter().map(|p| p.pos.col).min().unwrap_or(0);
        let max = placements.iter().map(|p| p.pos.col).max().unwrap_or(0);
        (min..=max).all(|c| board.has(Position::new(first.row, c)))
    } else {
        let min = placements.iter().map(|p| p.pos.row).min().unwrap_or(0);
        let max = placements.iter().map(|p| p.pos.row).max().unwrap_or(0);
        (min..=max).all(|r| board.has(Position::new(r, first.col)))
    };

    let valid = contiguous && placed_lines_valid(board, placements);

    for p in placements {
        board.remove(p.pos);
    }
    valid
}

// ── Scoring ─────────────────────────────────────────────────────────

/// Score a move whose placements are already applied to `board`: the sum
/// over every distinct line of length ≥ 2 touching a placement of the line's
/// length, plus [`QWIRKLE_BONUS`] per completed 6-line. A lone placement
/// forming no line scores 1.
///
/// Each line is counted once; its identity is its direction plus the
/// position of the first tile of the run.
pub fn score_move(board: &Board, placements: &[Placement]) -> i32 {
    // At most two lines per placement.
    let mut seen: [(i32, Position); 2 * MAX_LINE] = [(0, ORIGIN); 2 * MAX_LINE];
    let mut seen_len = 0;
    let mut buf = LineBuffer::new();
    let mut score = 0;

    for p in placements {
        for (dir, dr, dc) in [(0, 0, 1), (1, 1, 0)] {
            extract_line_into(board, p.pos, dr, dc, &mut buf);
            if buf.len() < 2 {
                continue;
            }
            let key = (dir, run_start(board, p.pos, dr, dc));
            if seen[..seen_len].contains(&key) {
                continue;
            }
            seen[seen_len] = key;
            seen_len += 1;

            score += buf.len() as i32;
            if buf.len() == MAX_LINE {
                score += QWIRKLE_BONUS;
            }
        }
    }

    if score == 0 && placements.len() == 1 {
        score = 1;
    }
    score
}
