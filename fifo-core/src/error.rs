//! Error kinds surfaced by the codec and by move validation.

use thiserror::Error;

use crate::{Pos, Side};

/// A `StateCode` that does not describe a well-formed position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("state code {code} exceeds the maximum {max}")]
    OutOfRange { code: u32, max: u32 },

    #[error("state code {code}: empty slot before an occupied one in the queue of {side}")]
    QueueGap { code: u32, side: Side },

    #[error("state code {code}: cell {cell} is claimed twice")]
    DuplicateCell { code: u32, cell: u8 },

    #[error("state code {code}: {x_count} x pieces and {o_count} o pieces cannot occur with {to_move} to move")]
    UnbalancedCounts {
        code: u32,
        x_count: usize,
        o_count: usize,
        to_move: Side,
    },
}

/// A placement the rules do not allow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IllegalMoveError {
    #[error("cell index {index} is outside 0..=8")]
    OutOfRange { index: i64 },

    #[error("cell {} is not empty", .pos.0)]
    Occupied { pos: Pos },

    #[error("game is already over: {winner} has won")]
    GameOver { winner: Side },
}
