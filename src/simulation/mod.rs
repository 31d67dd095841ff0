//! Monte Carlo machinery: win-probability estimation from live states and
//! batch AI-vs-AI game runs.

pub mod runner;
pub mod winprob;

pub use runner::{run_batch, GameResult, RunnerConfig, RunnerStats};
pub use winprob::{estimate_win_probability, playout, WinProbability, DEFAULT_SIMULATIONS};
