//! Monte Carlo win-probability estimation.
//!
//! Plays a fixed number of independent games to completion from a cloned
//! mid-game state and reports the fraction of each outcome. Playouts never
//! touch the caller's state: each one starts from a full clone (minus
//! history) with a freshly reseeded bag, so the fan-out is shared-nothing
//! and every playout is reproducible from `seed + index + 1`.

use rayon::prelude::*;

use crate::game::{GameState, Winner};
use crate::movegen::generate_all_moves;
use crate::solver::{GreedySolver, Solver};

/// Playouts per estimate: about ±5% margin at 95% confidence.
pub const DEFAULT_SIMULATIONS: usize = 400;

/// Hard cap on playout length. Greedy games from any reachable state finish
/// well under this; the cap bounds pathological mutual-swap loops.
pub const MAX_PLAYOUT_TURNS: usize = 100;

/// Outcome fractions over `simulations` playouts; `p0 + p1 + tie == 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WinProbability {
    pub p0: f64,
    pub p1: f64,
    pub tie: f64,
    pub simulations: usize,
    /// Calibration hint for the UI: `min(1 − 0.5/n, 0.99)`. Monotone in the
    /// simulation count, not a statistical interval.
    pub confidence: f64,
}

/// Estimate the win/tie probabilities of `state` from `n` greedy playouts,
/// fanned out across the rayon pool. A finished game short-circuits to the
/// definitive outcome with `n = 1` and confidence 1.0.
pub fn estimate_win_probability(state: &GameState, n: usize) -> WinProbability {
    if state.game_over {
        let (p0, p1, tie) = match state.winner {
            Some(Winner::Player0) => (1.0, 0.0, 0.0),
            Some(Winner::Player1) => (0.0, 1.0, 0.0),
            _ => (0.0, 0.0, 1.0),
        };
        return WinProbability {
            p0,
            p1,
            tie,
            simulations: 1,
            confidence: 1.0,
        };
    }

    let counts = (0..n)
        .into_par_iter()
        .map(|i| playout(state, i as u64))
        .fold(
            || [0usize; 3],
            |mut acc, outcome| {
                acc[outcome as usize] += 1;
                acc
            },
        )
        .reduce(
            || [0usize; 3],
            |a, b| [a[0] + b[0], a[1] + b[1], a[2] + b[2]],
        );

    let total = n as f64;
    WinProbability {
        p0: counts[0] as f64 / total,
        p1: counts[1] as f64 / total,
        tie: counts[2] as f64 / total,
        simulations: n,
        confidence: (1.0 - 0.5 / total).min(0.99),
    }
}

/// Play one game to completion from a clone of `state` and classify it:
/// 0 = player 0 wins, 1 = player 1 wins, 2 = tie.
///
/// The clone's bag is reseeded from `seed + sim_index + 1`, so playouts are
/// pairwise independent yet individually reproducible. Both sides play
/// greedy over the full move list; with no move available the player swaps
/// slot 0, and when even that is impossible the game is declared over.
pub fn playout(state: &GameState, sim_index: u64) -> u8 {
    let mut sim = state.clone_for_simulation();
    sim.bag = state
        .bag
        .clone_with_seed(state.seed.wrapping_add(sim_index).wrapping_add(1));

    let mut greedy = GreedySolver;
    for _ in 0..MAX_PLAYOUT_TURNS {
        if sim.game_over {
            break;
        }
        let moves = generate_all_moves(&sim);
        match greedy.select_move(&sim, &moves) {
            Some(mv) => {
                // Already validated by the generator.
                sim.play_tiles_prevalidated(&mv.placements, mv.score);
            }
            None => {
                if !sim.bag.is_empty() && !sim.current_hand().is_empty() {
                    sim.swap_tiles(&[0]);
                } else {
                    sim.game_over = true;
                    break;
                }
            }
        }
    }

    match sim.scores[0].cmp(&sim.scores[1]) {
        std::cmp::Ordering::Greater => 0,
        std::cmp::Ordering::Less => 1,
        std::cmp::Ordering::Equal => 2,
    }
}
