//! # Qwirkle — two-player engine, AI, and session server
//!
//! A deterministic Qwirkle rules kernel with an exhaustive move generator,
//! a set of AI solvers, and a parallel Monte Carlo win-probability estimator
//! that plays games to completion from arbitrary mid-game states. An HTTP
//! session façade sits on top of the engine.
//!
//! ## Layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`tile`] | 36 unique (shape, color) values with a dense index |
//! | [`bag`] | Shuffled 108-tile multiset with a seeded RNG |
//! | [`board`] | Sparse, unbounded mapping from (row, col) to tiles |
//! | [`hand`] | Ordered container of ≤6 tiles, refilled from the bag |
//! | [`rules`] | Line extraction, validity checks, move validation, scoring |
//! | [`game`] | Turn orchestration, swaps, end detection, history, cloning |
//! | [`movegen`] | Exhaustive move enumeration plus a fast single-tile path |
//! | [`solver`] | Greedy, uniform-random, and score-weighted move selection |
//! | [`simulation`] | Monte Carlo win-probability estimator and batch runner |
//! | [`server`] | Axum session façade (`/api/game/...`) |
//!
//! ## Determinism
//!
//! All randomness flows from explicit seeds: the bag owns a `SmallRng` seeded
//! at construction, solvers own per-instance generators, and the estimator
//! reseeds a fresh bag per playout from `seed + index + 1`. Move enumeration
//! order is stable for a fixed state, so a playout from a cloned state is
//! reproducible bit for bit.

pub mod bag;
pub mod board;
pub mod game;
pub mod hand;
pub mod movegen;
pub mod rules;
pub mod server;
pub mod simulation;
pub mod solver;
pub mod tile;
