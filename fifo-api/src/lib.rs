//! Web API for FIFO three-in-a-row.
//!
//! One in-memory game session with undo/redo history, plus score lookups
//! backed by a SQLite tablebase or an in-process solve.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod scores;
pub mod session;

pub use error::ApiError;
pub use routes::{router, AppState, AppStateInner};
pub use scores::ScoreSource;
