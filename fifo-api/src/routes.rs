//! HTTP handlers and the router.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use fifo_core::{Pos, StateCode};
use tower_http::cors::{Any, CorsLayer};

use crate::error::ApiError;
use crate::models::*;
use crate::scores::ScoreSource;
use crate::session::GameSession;

/// Shared application state
pub struct AppStateInner {
    session: Mutex<GameSession>,
    scores: ScoreSource,
}

impl AppStateInner {
    pub fn new(scores: ScoreSource) -> Self {
        Self {
            session: Mutex::new(GameSession::new()),
            scores,
        }
    }

    fn session(&self) -> MutexGuard<'_, GameSession> {
        match self.session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn game_model(&self, session: &GameSession) -> Json<GameStateModel> {
        Json(state_to_model(session.current(), session, &self.scores))
    }
}

pub type AppState = Arc<AppStateInner>;

async fn get_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let session = state.session();
    state.game_model(&session)
}

async fn get_moves(State(state): State<AppState>) -> Json<Vec<LegalMoveModel>> {
    let current = *state.session().current();

    let moves = current
        .legal_moves()
        .into_iter()
        .map(|(code, pos)| move_to_model(code, pos, state.scores.score(code)))
        .collect();
    Json(moves)
}

async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    let pos = Pos::from_index(req.cell)?;
    session.play(pos)?;
    Ok(state.game_model(&session))
}

async fn reset_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut session = state.session();
    session.reset();
    state.game_model(&session)
}

async fn get_history(State(state): State<AppState>) -> Json<HistoryModel> {
    let session = state.session();
    let moves: Vec<HistoryEntryModel> = session
        .history()
        .enumerate()
        .map(|(i, (pos, side))| HistoryEntryModel {
            index: i + 1,
            cell: pos.0,
            side,
        })
        .collect();

    Json(HistoryModel {
        total_moves: moves.len(),
        current_index: session.current_index(),
        moves,
    })
}

async fn undo(State(state): State<AppState>) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    session.undo()?;
    Ok(state.game_model(&session))
}

async fn redo(State(state): State<AppState>) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    session.redo()?;
    Ok(state.game_model(&session))
}

async fn goto_move(
    State(state): State<AppState>,
    Path(move_index): Path<usize>,
) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    session.goto(move_index)?;
    Ok(state.game_model(&session))
}

async fn export_game(State(state): State<AppState>) -> Json<ExportModel> {
    Json(ExportModel {
        notation: state.session().export(),
    })
}

async fn import_game(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    session.import(&req.notation)?;
    Ok(state.game_model(&session))
}

async fn export_state(State(state): State<AppState>) -> Json<StateExportModel> {
    Json(StateExportModel {
        code: state.session().current().encode(),
    })
}

async fn import_state(
    State(state): State<AppState>,
    Json(req): Json<StateImportRequest>,
) -> Result<Json<GameStateModel>, ApiError> {
    let board = req.code.decode()?;
    let mut session = state.session();
    session.reset_to(board);
    Ok(state.game_model(&session))
}

async fn lookup_positions_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchLookupRequest>,
) -> Json<BatchLookupResponse> {
    let scores = request
        .positions
        .iter()
        .map(|text| {
            text.parse::<u32>()
                .ok()
                .and_then(|code| state.scores.score(StateCode(code)))
        })
        .collect();
    Json(BatchLookupResponse { scores })
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/game", get(get_game))
        .route("/moves", get(get_moves))
        .route("/move", post(make_move))
        .route("/reset", post(reset_game))
        .route("/history", get(get_history))
        .route("/undo", post(undo))
        .route("/redo", post(redo))
        .route("/goto/{move_index}", post(goto_move))
        .route("/export", get(export_game))
        .route("/import", post(import_game))
        .route("/state/export", get(export_state))
        .route("/state/import", post(import_state))
        .route("/lookup/batch", post(lookup_positions_batch))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}
