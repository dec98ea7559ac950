use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fifo_core::{DecodeError, IllegalMoveError};
use thiserror::Error;

use crate::models::ErrorModel;

/// Request failures. Every variant is the client's fault and maps to 400.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    IllegalMove(#[from] IllegalMoveError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("invalid move index {0}")]
    BadIndex(usize),

    #[error("move {index} ({token}): {reason}")]
    BadNotation {
        index: usize,
        token: String,
        reason: String,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorModel {
            detail: self.to_string(),
        });
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}
