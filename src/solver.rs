//! Move selection strategies over the generator's output.
//!
//! All solvers share one contract: given the current state and the valid
//! moves (pre-sorted by score descending), pick one or decline. Selection is
//! separated from generation so strategies can be compared on identical move
//! sets.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::game::GameState;
use crate::movegen::Move;

pub trait Solver {
    /// Choose a move from `moves`, or `None` when the list is empty.
    fn select_move<'a>(&mut self, state: &GameState, moves: &'a [Move]) -> Option<&'a Move>;

    /// Short identifier used in logs and simulation output.
    fn name(&self) -> &'static str;
}

// ── Greedy ──────────────────────────────────────────────────────────

/// Always takes the highest-scoring move. Stateless; the baseline strategy
/// and the policy used by the win-probability playouts.
#[derive(Clone, Copy, Default)]
pub struct GreedySolver;

impl Solver for GreedySolver {
    fn select_move<'a>(&mut self, _state: &GameState, moves: &'a [Move]) -> Option<&'a Move> {
        // Moves arrive sorted by score descending.
        moves.first()
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}

// ── Uniform random ──────────────────────────────────────────────────

/// Picks uniformly among the valid moves, ignoring scores. Mostly useful as
/// a baseline and for exploration.
pub struct RandomSolver {
    rng: SmallRng,
}

impl RandomSolver {
    pub fn new(seed: u64) -> RandomSolver {
        RandomSolver {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Solver for RandomSolver {
    fn select_move<'a>(&mut self, _state: &GameState, moves: &'a [Move]) -> Option<&'a Move> {
        if moves.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..moves.len());
        Some(&moves[idx])
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

// ── Score-weighted random ───────────────────────────────────────────

/// Soft-greedy selection: move `m` is chosen with probability proportional
/// to `(score + 1)^(1/temperature)`. Temperature near zero approaches pure
/// greedy, 1.0 is balanced, large values approach uniform. The +1 keeps
/// zero-score moves selectable.
pub struct WeightedRandomSolver {
    rng: SmallRng,
    temperature: f64,
}

impl WeightedRandomSolver {
    pub fn new(seed: u64, temperature: f64) -> WeightedRandomSolver {
        WeightedRandomSolver {
            rng: SmallRng::seed_from_u64(seed),
            temperature,
        }
    }
}

impl Solver for WeightedRandomSolver {
    fn select_move<'a>(&mut self, _state: &GameState, moves: &'a [Move]) -> Option<&'a Move> {
        if moves.is_empty() {
            return None;
        }
        if moves.len() == 1 {
            return Some(&moves[0]);
        }

        let exponent = 1.0 / self.temperature;
        let weights: Vec<f64> = moves
            .iter()
            .map(|m| f64::from(m.score + 1).powf(exponent))
            .collect();
        let total: f64 = weights.iter().sum();

        // Inverse-CDF sampling over the cumulative weight.
        let r = self.rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        for (i, w) in weights.iter().enumerate() {
            cumulative += w;
            if r <= cumulative {
                return Some(&moves[i]);
            }
        }
        moves.last()
    }

    fn name(&self) -> &'static str {
        "weighted"
    }
}

// ── Factory ─────────────────────────────────────────────────────────

/// Solver from a strategy name: `"greedy"`, `"random"`, or `"weighted"`
/// (temperature 1.0). Unknown names fall back to greedy.
pub fn solver_by_name(name: &str, seed: u64) -> Box<dyn Solver> {
    match name {
        "random" => Box::new(RandomSolver::new(seed)),
        "weighted" => Box::new(WeightedRandomSolver::new(seed, 1.0)),
        _ => Box::new(GreedySolver),
    }
}
