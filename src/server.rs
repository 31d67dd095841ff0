//! Axum HTTP session façade over the game engine.
//!
//! The server owns a registry of independent game sessions. The registry is
//! behind a reader-writer lock (lookups take the read side); each session
//! carries its own mutex, so operations on one game are linearizable and
//! games never contend with each other. Handlers convert between the wire
//! JSON (1-based hand slots, `"row,col"` board keys, −1/0/1 winner codes)
//! and the core types at this boundary only.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/health` | Liveness |
//! | POST | `/api/game/new` | Create a game with a fresh seed |
//! | GET | `/api/game/{id}` | Current state |
//! | POST | `/api/game/{id}/play` | Place tiles (AI replies in human-vs-AI) |
//! | POST | `/api/game/{id}/swap` | Swap hand slots (same AI-step rule) |
//! | GET | `/api/game/{id}/hint` | Greedy best move for the current player |
//! | POST | `/api/game/{id}/ai-step` | Advance exactly one AI move |
//! | GET | `/api/game/{id}/win-probability` | Monte Carlo estimate |

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::board::Position;
use crate::game::GameState;
use crate::movegen::generate_all_moves;
use crate::rules::Placement;
use crate::simulation::{estimate_win_probability, DEFAULT_SIMULATIONS};
use crate::solver::{solver_by_name, GreedySolver, Solver};

/// One active game plus its mode flags.
pub struct Session {
    pub game: GameState,
    pub vs_ai: bool,
    pub ai_strategy: String,
    pub ai_vs_ai: bool,
}

/// Shared server state: the session registry and the id counter.
#[derive(Default)]
pub struct ServerState {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
    next_id: AtomicU64,
}

pub type AppState = Arc<ServerState>;

impl ServerState {
    pub fn new() -> ServerState {
        ServerState::default()
    }

    /// Monotonic ids: collision-free by construction, unlike a random
    /// short string.
    fn generate_id(&self, seed: u64) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("g{n}-{seed:x}")
    }

    fn session(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

/// A poisoned session lock only means another request panicked mid-game;
/// keep serving rather than wedging the session forever.
fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handle_health))
        .route("/api/game/new", post(handle_new_game))
        .route("/api/game/{id}", get(handle_get_state))
        .route("/api/game/{id}/play", post(handle_play))
        .route("/api/game/{id}/swap", post(handle_swap))
        .route("/api/game/{id}/hint", get(handle_hint))
        .route("/api/game/{id}/ai-step", post(handle_ai_step))
        .route("/api/game/{id}/win-probability", get(handle_win_probability))
        .fallback_service(ServeDir::new("static"))
        .layer(cors)
        .with_state(state)
}

// ── Request/Response types ──────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct NewGameRequest {
    #[serde(default)]
    pub vs_ai: bool,
    #[serde(default)]
    pub ai_strategy: String,
    #[serde(default)]
    pub ai_vs_ai: bool,
}

#[derive(Serialize)]
struct TileJson {
    shape: u8,
    color: u8,
}

#[derive(Serialize)]
struct GameStateJson {
    game_id: String,
    board: BTreeMap<String, TileJson>,
    hand: Vec<TileJson>,
    current_player: usize,
    scores: [i32; 2],
    bag_remaining: usize,
    game_over: bool,
    winner: Option<i32>,
    last_move_positions: Vec<[i32; 2]>,
    message: String,
}

#[derive(Deserialize)]
struct PlayRequest {
    placements: Vec<PlacementRequest>,
}

#[derive(Deserialize)]
struct PlacementRequest {
    row: i32,
    col: i32,
    /// 1-based hand slot.
    tile_index: usize,
}

#[derive(Serialize)]
struct PlayResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<GameStateJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl PlayResponse {
    fn ok(state: GameStateJson) -> PlayResponse {
        PlayResponse {
            success: true,
            state: Some(state),
            error: None,
        }
    }

    fn fail(reason: &str) -> PlayResponse {
        PlayResponse {
            success: false,
            state: None,
            error: Some(reason.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct SwapRequest {
    /// 1-based hand slots.
    indices: Vec<usize>,
}

#[derive(Serialize)]
struct HintPlacementJson {
    row: i32,
    col: i32,
    tile_index: usize,
}

#[derive(Serialize)]
struct HintResponse {
    has_move: bool,
    message: String,
    placements: Vec<HintPlacementJson>,
}

#[derive(Serialize)]
struct WinProbabilityJson {
    p0_prob: f64,
    p1_prob: f64,
    tie_prob: f64,
    n_simulations: usize,
    confidence: f64,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn error_response(status: StatusCode, msg: &str) -> ApiError {
    (status, Json(serde_json::json!({ "error": msg })))
}

fn not_found() -> ApiError {
    error_response(StatusCode::NOT_FOUND, "Game not found")
}

// ── Handlers ────────────────────────────────────────────────────────

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn handle_new_game(
    State(state): State<AppState>,
    Json(req): Json<NewGameRequest>,
) -> Json<GameStateJson> {
    let game = GameState::new(0);
    let id = state.generate_id(game.seed);

    let session = Session {
        game,
        vs_ai: req.vs_ai,
        ai_strategy: req.ai_strategy,
        ai_vs_ai: req.ai_vs_ai,
    };
    let response = state_json(&id, &session.game, "Game started!");

    state
        .sessions
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(id, Arc::new(Mutex::new(session)));

    Json(response)
}

async fn handle_get_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameStateJson>, ApiError> {
    let session = state.session(&id).ok_or_else(not_found)?;
    let session = lock(&session);
    Ok(Json(state_json(&id, &session.game, "")))
}

async fn handle_play(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PlayRequest>,
) -> Result<Json<PlayResponse>, ApiError> {
    let session = state.session(&id).ok_or_else(not_found)?;
    let mut session = lock(&session);

    // Resolve 1-based hand slots into concrete tiles before touching state.
    let hand = session.game.current_hand();
    let mut placements = Vec::with_capacity(req.placements.len());
    for p in &req.placements {
        let tile = match p.tile_index.checked_sub(1).and_then(|i| hand.get(i)) {
            Some(t) => t,
            None => return Ok(Json(PlayResponse::fail("Invalid tile index"))),
        };
        placements.push(Placement::new(Position::new(p.row, p.col), tile));
    }

    let score = match session.game.play_tiles(&placements) {
        Ok(score) => score,
        Err(_) => return Ok(Json(PlayResponse::fail("Invalid move"))),
    };
    let message = if score > 0 {
        format!("Scored {score} points!")
    } else {
        String::new()
    };

    if session.vs_ai && !session.game.game_over && session.game.current_player == 1 {
        ai_move(&mut session);
    }

    Ok(Json(PlayResponse::ok(state_json(
        &id,
        &session.game,
        &message,
    ))))
}

async fn handle_swap(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SwapRequest>,
) -> Result<Json<PlayResponse>, ApiError> {
    let session = state.session(&id).ok_or_else(not_found)?;
    let mut session = lock(&session);

    // 1-based on the wire.
    if req.indices.iter().any(|&i| i == 0) {
        return Ok(Json(PlayResponse::fail("Cannot swap tiles")));
    }
    let indices: Vec<usize> = req.indices.iter().map(|&i| i - 1).collect();

    if !session.game.swap_tiles(&indices) {
        return Ok(Json(PlayResponse::fail("Cannot swap tiles")));
    }

    if session.vs_ai && !session.game.game_over && session.game.current_player == 1 {
        ai_move(&mut session);
    }

    Ok(Json(PlayResponse::ok(state_json(
        &id,
        &session.game,
        "Tiles swapped",
    ))))
}

async fn handle_hint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HintResponse>, ApiError> {
    let session = state.session(&id).ok_or_else(not_found)?;
    let session = lock(&session);

    let moves = generate_all_moves(&session.game);
    let mut greedy = GreedySolver;
    let Some(best) = greedy.select_move(&session.game, &moves) else {
        return Ok(Json(HintResponse {
            has_move: false,
            message: "No valid moves - consider swapping tiles".to_string(),
            placements: Vec::new(),
        }));
    };

    // Map each placement back to a distinct hand slot (1-based). Duplicate
    // tiles in hand must resolve to different slots.
    let hand = session.game.current_hand();
    let mut used = [false; crate::hand::MAX_HAND_SIZE];
    let placements = best
        .placements
        .iter()
        .map(|p| {
            let slot = hand
                .as_slice()
                .iter()
                .enumerate()
                .find(|&(i, &t)| t == p.tile && !used[i])
                .map(|(i, _)| i)
                .unwrap_or(0);
            used[slot] = true;
            HintPlacementJson {
                row: p.pos.row,
                col: p.pos.col,
                tile_index: slot + 1,
            }
        })
        .collect();

    Ok(Json(HintResponse {
        has_move: true,
        message: format!("Best move scores {} points", best.score),
        placements,
    }))
}

async fn handle_ai_step(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlayResponse>, ApiError> {
    let session = state.session(&id).ok_or_else(not_found)?;
    let mut session = lock(&session);

    if session.game.game_over {
        return Ok(Json(PlayResponse::ok(state_json(
            &id,
            &session.game,
            "Game over",
        ))));
    }

    ai_move(&mut session);
    Ok(Json(PlayResponse::ok(state_json(
        &id,
        &session.game,
        "AI moved",
    ))))
}

async fn handle_win_probability(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WinProbabilityJson>, ApiError> {
    let session = state.session(&id).ok_or_else(not_found)?;

    // Snapshot under the lock, then estimate off the async pool; the
    // estimator only ever reads its own clone.
    let game = lock(&session).game.clone();
    let estimate =
        tokio::task::spawn_blocking(move || estimate_win_probability(&game, DEFAULT_SIMULATIONS))
            .await
            .map_err(|_| {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Estimation failed")
            })?;

    Ok(Json(WinProbabilityJson {
        p0_prob: estimate.p0,
        p1_prob: estimate.p1,
        tie_prob: estimate.tie,
        n_simulations: estimate.simulations,
        confidence: estimate.confidence,
    }))
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Advance one AI turn: play the selected move, or fall back to swapping
/// slot 0. A failed fallback (empty bag) is a silent pass — never an error.
fn ai_move(session: &mut Session) {
    let seed = session
        .game
        .seed
        .wrapping_add(session.game.history.len() as u64);
    let mut solver = solver_by_name(&session.ai_strategy, seed);

    let moves = generate_all_moves(&session.game);
    match solver.select_move(&session.game, &moves) {
        Some(mv) => {
            let placements = mv.placements.clone();
            let _ = session.game.play_tiles(&placements);
        }
        None => {
            let _ = session.game.swap_tiles(&[0]);
        }
    }
}

fn state_json(id: &str, game: &GameState, message: &str) -> GameStateJson {
    let mut board = BTreeMap::new();
    for pos in game.board.positions() {
        if let Some(tile) = game.board.get(pos) {
            board.insert(
                format!("{},{}", pos.row, pos.col),
                TileJson {
                    shape: tile.shape as u8,
                    color: tile.color as u8,
                },
            );
        }
    }

    let hand = game
        .current_hand()
        .as_slice()
        .iter()
        .map(|t| TileJson {
            shape: t.shape as u8,
            color: t.color as u8,
        })
        .collect();

    // Only the most recent history entry; empty when it was a swap.
    let last_move_positions = game
        .history
        .last()
        .map(|rec| {
            rec.placements
                .iter()
                .map(|p| [p.pos.row, p.pos.col])
                .collect()
        })
        .unwrap_or_default();

    GameStateJson {
        game_id: id.to_string(),
        board,
        hand,
        current_player: game.current_player,
        scores: game.scores,
        bag_remaining: game.bag.remaining(),
        game_over: game.game_over,
        winner: game.winner.map(|w| w.wire_code()),
        last_move_positions,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_monotonic() {
        let state = ServerState::new();
        let a = state.generate_id(0xbeef);
        let b = state.generate_id(0xbeef);
        assert_ne!(a, b);
        assert!(a.starts_with("g0-"));
        assert!(b.starts_with("g1-"));
    }

    #[test]
    fn test_state_json_shape() {
        let mut game = GameState::new(42);
        let tile = game.current_hand().get(0).unwrap();
        game.play_tiles(&[Placement::new(crate::board::ORIGIN, tile)])
            .unwrap();

        let json = state_json("g0-2a", &game, "hello");
        assert_eq!(json.game_id, "g0-2a");
        assert_eq!(json.board.len(), 1);
        assert!(json.board.contains_key("0,0"));
        assert_eq!(json.hand.len(), 6);
        assert_eq!(json.current_player, 1);
        assert_eq!(json.last_move_positions, vec![[0, 0]]);
        assert_eq!(json.winner, None);
        assert_eq!(json.message, "hello");
    }

    #[test]
    fn test_state_json_swap_clears_last_positions() {
        let mut game = GameState::new(42);
        assert!(game.swap_tiles(&[0]));
        let json = state_json("x", &game, "");
        assert!(json.last_move_positions.is_empty());
    }
}
