//! Game state: turn orchestration, swaps, end detection, history, cloning.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::bag::Bag;
use crate::board::Board;
use crate::hand::Hand;
use crate::rules::{self, Placement};
use crate::tile::TILE_KINDS;

/// Bonus for the player who empties their hand to end the game.
pub const GOING_OUT_BONUS: i32 = 6;

/// Outcome of a finished game.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Winner {
    Player0,
    Player1,
    Tie,
}

impl Winner {
    /// Wire encoding used by the API and the simulator output: 0, 1, or −1
    /// for a tie.
    pub fn wire_code(self) -> i32 {
        match self {
            Winner::Player0 => 0,
            Winner::Player1 => 1,
            Winner::Tie => -1,
        }
    }
}

/// Why a play was rejected.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayError {
    /// The game has already ended.
    GameOver,
    /// The move violates the placement rules or uses tiles not in hand.
    InvalidMove,
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::GameOver => f.write_str("game is over"),
            PlayError::InvalidMove => f.write_str("invalid move"),
        }
    }
}

/// One history entry: a play (with its placements and score) or a swap.
#[derive(Clone, Debug)]
pub struct MoveRecord {
    pub player: usize,
    pub placements: Vec<Placement>,
    pub score: i32,
    pub was_swap: bool,
    pub swap_count: usize,
}

/// Complete state of a two-player game. The board, bag, and hands are owned
/// exclusively by the state; sharing happens only through clones.
#[derive(Clone)]
pub struct GameState {
    pub board: Board,
    pub bag: Bag,
    pub hands: [Hand; 2],
    pub scores: [i32; 2],
    pub current_player: usize,
    pub game_over: bool,
    pub winner: Option<Winner>,
    pub history: Vec<MoveRecord>,
    pub seed: u64,
}

impl GameState {
    /// Start a new game. Seed 0 means "derive a seed from the clock"; any
    /// other value reproduces the exact same game.
    pub fn new(seed: u64) -> GameState {
        let seed = if seed == 0 { clock_seed() } else { seed };
        let mut bag = Bag::new(seed);
        let mut hands = [Hand::new(), Hand::new()];
        hands[0].refill(&mut bag);
        hands[1].refill(&mut bag);

        GameState {
            board: Board::new(),
            bag,
            hands,
            scores: [0, 0],
            current_player: 0,
            game_over: false,
            winner: None,
            history: Vec::new(),
            seed,
        }
    }

    pub fn current_hand(&self) -> &Hand {
        &self.hands[self.current_player]
    }

    pub fn other_player(&self) -> usize {
        1 - self.current_player
    }

    /// Execute a full turn: validate, place, score, refill, record, detect
    /// the end of the game, and pass the turn. On error the state is
    /// unchanged.
    pub fn play_tiles(&mut self, placements: &[Placement]) -> Result<i32, PlayError> {
        if self.game_over {
            return Err(PlayError::GameOver);
        }
        if !self.hand_covers(placements) {
            return Err(PlayError::InvalidMove);
        }
        if !rules::validate_move(&mut self.board, placements) {
            return Err(PlayError::InvalidMove);
        }

        for p in placements {
            self.board.set(p.pos, p.tile);
        }
        let score = rules::score_move(&self.board, placements);
        self.finish_play(placements, score);
        Ok(score)
    }

    /// Fast path for moves already produced by the generator: skips
    /// validation and reuses the generator's score.
    pub fn play_tiles_prevalidated(&mut self, placements: &[Placement], score: i32) {
        debug_assert!(!self.game_over);
        for p in placements {
            self.board.set(p.pos, p.tile);
        }
        self.finish_play(placements, score);
    }

    fn finish_play(&mut self, placements: &[Placement], score: i32) {
        self.scores[self.current_player] += score;

        // Remove the played tiles from the hand, matching by value, one per
        // placement, then top the hand back up.
        let player = self.current_player;
        for p in placements {
            if let Some(idx) = self.hands[player].index_of(p.tile) {
                self.hands[player].remove(idx);
            }
        }
        self.hands[player].refill(&mut self.bag);

        self.history.push(MoveRecord {
            player,
            placements: placements.to_vec(),
            score,
            was_swap: false,
            swap_count: 0,
        });

        self.check_game_over();
        if !self.game_over {
            self.current_player = self.other_player();
        }
    }

    /// Swap the tiles at the given 0-based hand slots with fresh tiles from
    /// the bag, then return the removed tiles (reshuffling the bag). Returns
    /// false — with the state unchanged — on an empty index list, an
    /// insufficient bag, or invalid or repeated indices.
    pub fn swap_tiles(&mut self, indices: &[usize]) -> bool {
        if self.game_over || indices.is_empty() {
            return false;
        }
        if self.bag.remaining() < indices.len() {
            return false;
        }
        let hand_len = self.current_hand().len();
        let mut seen = [false; crate::hand::MAX_HAND_SIZE];
        for &idx in indices {
            if idx >= hand_len || seen[idx] {
                return false;
            }
            seen[idx] = true;
        }

        let player = self.current_player;
        let removed = self.hands[player].remove_multiple(indices);
        // Refill before returning the old tiles, so a player can never draw
        // back what they just swapped away.
        self.hands[player].refill(&mut self.bag);
        self.bag.put_back(&removed);

        self.history.push(MoveRecord {
            player,
            placements: Vec::new(),
            score: 0,
            was_swap: true,
            swap_count: indices.len(),
        });

        self.current_player = self.other_player();
        true
    }

    /// Deep copy without the move history — the cheap clone used once per
    /// Monte Carlo playout.
    pub fn clone_for_simulation(&self) -> GameState {
        GameState {
            board: self.board.clone(),
            bag: self.bag.clone(),
            hands: self.hands.clone(),
            scores: self.scores,
            current_player: self.current_player,
            game_over: self.game_over,
            winner: self.winner,
            history: Vec::new(),
            seed: self.seed,
        }
    }

    /// True when either player's hand emptied with the bag exhausted. The
    /// emptying player receives the going-out bonus.
    fn check_game_over(&mut self) {
        if !self.bag.is_empty() {
            return;
        }
        for i in 0..2 {
            if self.hands[i].is_empty() {
                self.game_over = true;
                self.scores[i] += GOING_OUT_BONUS;
                break;
            }
        }
        if self.game_over {
            self.winner = Some(if self.scores[0] > self.scores[1] {
                Winner::Player0
            } else if self.scores[1] > self.scores[0] {
                Winner::Player1
            } else {
                Winner::Tie
            });
        }
    }

    /// Multiset check: the current hand holds every placement's tile, with
    /// multiplicity.
    fn hand_covers(&self, placements: &[Placement]) -> bool {
        let mut counts = [0i8; TILE_KINDS];
        for t in self.current_hand().as_slice() {
            counts[t.index()] += 1;
        }
        for p in placements {
            let idx = p.tile.index();
            counts[idx] -= 1;
            if counts[idx] < 0 {
                return false;
            }
        }
        true
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}
