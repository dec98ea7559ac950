//! JSON models.

use fifo_core::{Pos, Side, State, StateCode};
use serde::{Deserialize, Serialize};

use crate::scores::ScoreSource;
use crate::session::GameSession;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PieceModel {
    pub side: Side,
    /// The owner's next placement removes this piece
    pub evicts_next: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GameStateModel {
    pub board: Vec<Vec<Option<PieceModel>>>,
    pub to_move: Side,
    pub result: String,
    pub move_index: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub code: StateCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// The winning line positions, if there's a winner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_line: Option<Vec<(u8, u8)>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LegalMoveModel {
    pub cell: u8,
    pub row: u8,
    pub col: u8,
    pub code: StateCode,
    /// Score of the resulting position, null if unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub cell: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HistoryEntryModel {
    pub index: usize,
    pub cell: u8,
    pub side: Side,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HistoryModel {
    pub moves: Vec<HistoryEntryModel>,
    pub current_index: usize,
    pub total_moves: usize,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ExportModel {
    pub notation: String,
}

#[derive(Deserialize)]
pub struct ImportRequest {
    pub notation: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StateExportModel {
    pub code: StateCode,
}

#[derive(Deserialize)]
pub struct StateImportRequest {
    pub code: StateCode,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthModel {
    pub status: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorModel {
    pub detail: String,
}

#[derive(Deserialize)]
pub struct BatchLookupRequest {
    pub positions: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BatchLookupResponse {
    pub scores: Vec<Option<f64>>,
}

pub fn state_to_model(state: &State, session: &GameSession, scores: &ScoreSource) -> GameStateModel {
    let board = (0..3)
        .map(|row| {
            (0..3)
                .map(|col| {
                    let pos = Pos::from_row_col(row, col);
                    state.cell(pos).map(|side| {
                        let queue = state.queue(side);
                        PieceModel {
                            side,
                            evicts_next: queue.is_full() && queue.oldest() == Some(pos),
                        }
                    })
                })
                .collect()
        })
        .collect();

    let winner = state.winner();
    let result = match winner {
        Some(Side::X) => "x_wins",
        Some(Side::O) => "o_wins",
        None => "ongoing",
    };
    let winning_line = winner
        .and_then(|side| state.winning_line(side))
        .map(|line| line.iter().map(|p| (p.row(), p.col())).collect());

    let code = state.encode();
    GameStateModel {
        board,
        to_move: state.side_to_move(),
        result: result.to_string(),
        move_index: session.current_index(),
        can_undo: session.can_undo(),
        can_redo: session.can_redo(),
        code,
        score: scores.score(code),
        winning_line,
    }
}

pub fn move_to_model(code: StateCode, pos: Pos, score: Option<f64>) -> LegalMoveModel {
    LegalMoveModel {
        cell: pos.0,
        row: pos.row(),
        col: pos.col(),
        code,
        score,
    }
}
