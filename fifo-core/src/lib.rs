//! Three-in-a-row with FIFO piece eviction.
//!
//! Each side keeps at most three pieces on the 3x3 board. Placing a fourth
//! piece removes that side's oldest piece, so positions can repeat and the
//! game graph has cycles.
//!
//! # State Code (decimal)
//!
//! ```text
//! digits 0-2: X queue, oldest first (digit = cell + 1, 0 = unused slot)
//! digits 3-5: O queue, oldest first
//! 1_000_000:  set when X is to move
//!
//! Cell indices (row-major order):
//!   (0,0)=0  (0,1)=1  (0,2)=2
//!   (1,0)=3  (1,1)=4  (1,2)=5
//!   (2,0)=6  (2,1)=7  (2,2)=8
//! ```
//!
//! Two boards with identical cells but a different placement order encode
//! differently: the order decides which piece is evicted next.

use std::fmt;

use serde::{Deserialize, Serialize};

mod error;

pub use error::{DecodeError, IllegalMoveError};

/// One of the two sides. X moves first and scores positive.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    X,
    O,
}

impl Side {
    /// Get the opposing side.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::X => Side::O,
            Side::O => Side::X,
        }
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            Side::X => 0,
            Side::O => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::X => f.write_str("x"),
            Side::O => f.write_str("o"),
        }
    }
}

/// Position on the 3x3 board (0-8).
///
/// Layout:
/// ```text
///   0 1 2
///   3 4 5
///   6 7 8
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pos(pub u8);

impl Pos {
    /// Create a position from row and column (0-2 each).
    #[inline]
    pub fn from_row_col(row: u8, col: u8) -> Pos {
        debug_assert!(row < 3 && col < 3);
        Pos(row * 3 + col)
    }

    /// Validate an index typed in by a player.
    pub fn from_index(index: i64) -> Result<Pos, IllegalMoveError> {
        if (0..9).contains(&index) {
            Ok(Pos(index as u8))
        } else {
            Err(IllegalMoveError::OutOfRange { index })
        }
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.0 / 3
    }

    #[inline]
    pub fn col(self) -> u8 {
        self.0 % 3
    }

    /// Iterate over all 9 positions.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..9).map(Pos)
    }
}

/// Pieces of one side in placement order, oldest first.
///
/// Unused slots are kept zeroed so derived equality and hashing only see
/// the live pieces.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct EvictionQueue {
    slots: [Pos; 3],
    len: u8,
}

impl EvictionQueue {
    pub const CAPACITY: usize = 3;

    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == Self::CAPACITY
    }

    /// The piece that leaves first.
    #[inline]
    pub fn oldest(&self) -> Option<Pos> {
        (self.len > 0).then(|| self.slots[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        self.slots[..self.len()].iter().copied()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.iter().any(|p| p == pos)
    }

    /// Append the newest piece. Caller ensures the queue is not full.
    pub fn push_back(&mut self, pos: Pos) {
        debug_assert!(!self.is_full());
        let len = self.len();
        self.slots[len] = pos;
        self.len += 1;
    }

    pub fn pop_front(&mut self) -> Option<Pos> {
        let oldest = self.oldest()?;
        self.slots.copy_within(1.., 0);
        self.len -= 1;
        let len = self.len();
        self.slots[len] = Pos::default();
        Some(oldest)
    }

    /// Put a previously evicted piece back in front. Caller ensures room.
    pub fn push_front(&mut self, pos: Pos) {
        debug_assert!(!self.is_full());
        let len = self.len();
        self.slots.copy_within(..len, 1);
        self.slots[0] = pos;
        self.len += 1;
    }

    pub fn pop_back(&mut self) -> Option<Pos> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let len = self.len();
        Some(std::mem::take(&mut self.slots[len]))
    }
}

/// Canonical integer identity of a [`State`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateCode(pub u32);

impl StateCode {
    /// Turn flag: set when X is to move.
    pub const X_TO_MOVE: u32 = 1_000_000;
    /// Largest code a well-formed state can have.
    pub const MAX: StateCode = StateCode(1_999_999);
    /// The empty board with X to move.
    pub const INITIAL: StateCode = StateCode(Self::X_TO_MOVE);

    /// Side to move, read from the turn flag without decoding the queues.
    #[inline]
    pub fn side_to_move(self) -> Side {
        if self.0 >= Self::X_TO_MOVE {
            Side::X
        } else {
            Side::O
        }
    }

    #[inline]
    pub fn decode(self) -> Result<State, DecodeError> {
        State::decode(self)
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Information needed to take back one placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Undo {
    pub side: Side,
    pub pos: Pos,
    /// The piece removed by the eviction rule, if the queue was full.
    pub evicted: Option<Pos>,
}

/// A full position: board, both eviction queues and the side to move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct State {
    cells: [Option<Side>; 9],
    queues: [EvictionQueue; 2],
    to_move: Side,
}

impl State {
    /// The 8 winning lines: 3 rows, 3 columns, 2 diagonals.
    const WIN_LINES: [[Pos; 3]; 8] = [
        [Pos(0), Pos(1), Pos(2)],
        [Pos(3), Pos(4), Pos(5)],
        [Pos(6), Pos(7), Pos(8)],
        [Pos(0), Pos(3), Pos(6)],
        [Pos(1), Pos(4), Pos(7)],
        [Pos(2), Pos(5), Pos(8)],
        [Pos(0), Pos(4), Pos(8)],
        [Pos(2), Pos(4), Pos(6)],
    ];

    /// Empty board with X to move.
    pub fn new() -> State {
        State {
            cells: [None; 9],
            queues: [EvictionQueue::new(); 2],
            to_move: Side::X,
        }
    }

    #[inline]
    pub fn side_to_move(&self) -> Side {
        self.to_move
    }

    #[inline]
    pub fn cell(&self, pos: Pos) -> Option<Side> {
        self.cells[pos.0 as usize]
    }

    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.cell(pos).is_none()
    }

    #[inline]
    pub fn queue(&self, side: Side) -> &EvictionQueue {
        &self.queues[side.index()]
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        Pos::all().filter(|&pos| self.is_empty(pos))
    }

    // ========== Codec ==========

    /// Pack the state into its decimal code.
    pub fn encode(&self) -> StateCode {
        let mut code = 0u32;
        let mut place = 1u32;
        for side in [Side::X, Side::O] {
            let queue = self.queue(side);
            for slot in 0..EvictionQueue::CAPACITY {
                let digit = queue.slots[slot].0 as u32 + 1;
                if slot < queue.len() {
                    code += digit * place;
                }
                place *= 10;
            }
        }
        if self.to_move == Side::X {
            code += StateCode::X_TO_MOVE;
        }
        debug_assert!(code <= StateCode::MAX.0);
        StateCode(code)
    }

    /// Rebuild the state from its code, including the eviction order.
    pub fn decode(code: StateCode) -> Result<State, DecodeError> {
        let raw = code.0;
        if raw > StateCode::MAX.0 {
            return Err(DecodeError::OutOfRange {
                code: raw,
                max: StateCode::MAX.0,
            });
        }

        let mut state = State::new();
        state.to_move = code.side_to_move();

        let mut digits = raw % StateCode::X_TO_MOVE;
        for side in [Side::X, Side::O] {
            let mut gap = false;
            for _ in 0..EvictionQueue::CAPACITY {
                let digit = (digits % 10) as u8;
                digits /= 10;
                if digit == 0 {
                    gap = true;
                    continue;
                }
                if gap {
                    return Err(DecodeError::QueueGap { code: raw, side });
                }
                let pos = Pos(digit - 1);
                if !state.is_empty(pos) {
                    return Err(DecodeError::DuplicateCell {
                        code: raw,
                        cell: pos.0,
                    });
                }
                state.cells[pos.0 as usize] = Some(side);
                state.queues[side.index()].push_back(pos);
            }
        }

        let x_count = state.queue(Side::X).len();
        let o_count = state.queue(Side::O).len();
        let balanced = match state.to_move {
            Side::X => x_count == o_count,
            Side::O => x_count == o_count + 1 || (x_count == 3 && o_count == 3),
        };
        if !balanced {
            return Err(DecodeError::UnbalancedCounts {
                code: raw,
                x_count,
                o_count,
                to_move: state.to_move,
            });
        }

        Ok(state)
    }

    // ========== Apply & Undo ==========

    /// Place a piece for the side to move, evicting its oldest piece when
    /// it already has three.
    ///
    /// Does NOT validate - caller must ensure the cell is empty.
    pub fn apply(&mut self, pos: Pos) -> Undo {
        debug_assert!(self.is_empty(pos));
        let side = self.to_move;
        let queue = &mut self.queues[side.index()];

        let evicted = if queue.is_full() { queue.pop_front() } else { None };
        if let Some(old) = evicted {
            self.cells[old.0 as usize] = None;
        }
        queue.push_back(pos);
        self.cells[pos.0 as usize] = Some(side);
        self.to_move = side.opponent();

        Undo { side, pos, evicted }
    }

    /// Validated placement for interactive callers.
    pub fn play(&mut self, pos: Pos) -> Result<Undo, IllegalMoveError> {
        if let Some(winner) = self.winner() {
            return Err(IllegalMoveError::GameOver { winner });
        }
        if pos.0 >= 9 {
            return Err(IllegalMoveError::OutOfRange {
                index: pos.0 as i64,
            });
        }
        if !self.is_empty(pos) {
            return Err(IllegalMoveError::Occupied { pos });
        }
        Ok(self.apply(pos))
    }

    /// Reverse an `apply`. The evicted piece goes back to the front of the
    /// queue, restoring the exact previous order.
    pub fn undo(&mut self, undo: &Undo) {
        debug_assert_eq!(self.cell(undo.pos), Some(undo.side));
        let queue = &mut self.queues[undo.side.index()];
        queue.pop_back();
        self.cells[undo.pos.0 as usize] = None;
        if let Some(old) = undo.evicted {
            queue.push_front(old);
            self.cells[old.0 as usize] = Some(undo.side);
        }
        self.to_move = undo.side;
    }

    // ========== Win Detection ==========

    pub fn winning_line(&self, side: Side) -> Option<[Pos; 3]> {
        Self::WIN_LINES
            .iter()
            .find(|line| line.iter().all(|&pos| self.cell(pos) == Some(side)))
            .copied()
    }

    #[inline]
    pub fn has_won(&self, side: Side) -> bool {
        self.winning_line(side).is_some()
    }

    /// Returns the winning side, or None if the game is ongoing.
    pub fn winner(&self) -> Option<Side> {
        if self.has_won(Side::X) {
            Some(Side::X)
        } else if self.has_won(Side::O) {
            Some(Side::O)
        } else {
            None
        }
    }

    /// Every position reachable in one placement, in ascending cell order.
    /// Empty once a side has won.
    pub fn legal_moves(&self) -> Vec<(StateCode, Pos)> {
        if self.winner().is_some() {
            return Vec::new();
        }
        let mut scratch = *self;
        let mut moves = Vec::with_capacity(9);
        for pos in self.empty_cells() {
            let undo = scratch.apply(pos);
            moves.push((scratch.encode(), pos));
            scratch.undo(&undo);
        }
        moves
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for State {
    /// Pieces that the owner's next placement will evict print lowercase.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " * Turn of \"{}\"", self.to_move)?;
        for row in 0..3 {
            let marks: Vec<String> = (0..3)
                .map(|col| {
                    let pos = Pos::from_row_col(row, col);
                    match self.cell(pos) {
                        None => " ".to_string(),
                        Some(side) => {
                            let queue = self.queue(side);
                            let label = side.to_string();
                            if queue.is_full() && queue.oldest() == Some(pos) {
                                label
                            } else {
                                label.to_uppercase()
                            }
                        }
                    }
                })
                .collect();
            write!(f, " {} | {} | {}", marks[0], marks[1], marks[2])?;
            if row < 2 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Play a sequence of cells from the empty board.
    fn played(cells: &[u8]) -> State {
        let mut state = State::new();
        for &c in cells {
            state.play(Pos(c)).unwrap();
        }
        state
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::X.opponent(), Side::O);
        assert_eq!(Side::O.opponent(), Side::X);
    }

    #[test]
    fn test_pos_row_col() {
        for pos in Pos::all() {
            assert_eq!(Pos::from_row_col(pos.row(), pos.col()), pos);
        }
        assert_eq!(Pos::from_row_col(1, 2), Pos(5));
    }

    #[test]
    fn test_pos_from_index() {
        assert_eq!(Pos::from_index(4), Ok(Pos(4)));
        assert_eq!(
            Pos::from_index(9),
            Err(IllegalMoveError::OutOfRange { index: 9 })
        );
        assert_eq!(
            Pos::from_index(-1),
            Err(IllegalMoveError::OutOfRange { index: -1 })
        );
    }

    #[test]
    fn test_queue_front_back() {
        let mut q = EvictionQueue::new();
        q.push_back(Pos(1));
        q.push_back(Pos(2));
        q.push_back(Pos(3));
        assert!(q.is_full());
        assert_eq!(q.pop_front(), Some(Pos(1)));
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![Pos(2), Pos(3)]);
        q.push_front(Pos(1));
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![Pos(1), Pos(2), Pos(3)]);
        assert_eq!(q.pop_back(), Some(Pos(3)));
        assert_eq!(q.oldest(), Some(Pos(1)));
    }

    #[test]
    fn test_queue_push_front_equals_queue_built_in_order() {
        let mut rebuilt = EvictionQueue::new();
        rebuilt.push_back(Pos(5));
        rebuilt.push_back(Pos(7));
        rebuilt.push_front(Pos(2));

        let mut fresh = EvictionQueue::new();
        for cell in [2, 5, 7] {
            fresh.push_back(Pos(cell));
        }
        assert_eq!(rebuilt, fresh);

        rebuilt.pop_front();
        rebuilt.pop_back();
        let mut single = EvictionQueue::new();
        single.push_back(Pos(5));
        assert_eq!(rebuilt, single);
    }

    #[test]
    fn test_initial_code() {
        assert_eq!(State::new().encode(), StateCode::INITIAL);
        assert_eq!(StateCode::INITIAL.side_to_move(), Side::X);
    }

    #[test]
    fn test_encode_digits_follow_queue_order() {
        // X: 0, 1, 3 ; O: 8, 7
        let state = played(&[0, 8, 1, 7, 3]);
        assert_eq!(state.side_to_move(), Side::O);
        assert_eq!(state.encode(), StateCode(89_421));
    }

    #[test]
    fn test_eviction_order_distinguishes_states() {
        let a = played(&[0, 8, 1, 7]);
        let b = played(&[1, 8, 0, 7]);
        for pos in Pos::all() {
            assert_eq!(a.cell(pos), b.cell(pos));
        }
        assert_ne!(a.encode(), b.encode());
        assert_eq!(State::decode(a.encode()).unwrap(), a);
        assert_eq!(State::decode(b.encode()).unwrap(), b);
    }

    #[test]
    fn test_fourth_piece_evicts_oldest() {
        let mut state = played(&[0, 8, 1, 7, 3, 5]);
        let undo = state.play(Pos(4)).unwrap();
        assert_eq!(undo.evicted, Some(Pos(0)));
        assert!(state.is_empty(Pos(0)));
        assert_eq!(
            state.queue(Side::X).iter().collect::<Vec<_>>(),
            vec![Pos(1), Pos(3), Pos(4)]
        );
        assert_eq!(State::decode(state.encode()).unwrap(), state);
    }

    #[test]
    fn test_undo_restores_previous_state() {
        let before = played(&[0, 8, 1, 7, 3, 5]);
        let mut state = before;
        let undo = state.play(Pos(4)).unwrap();
        state.undo(&undo);
        assert_eq!(state, before);

        let undo = state.play(Pos(2)).unwrap();
        state.undo(&undo);
        assert_eq!(state, before);
    }

    #[test]
    fn test_illegal_moves() {
        let mut state = played(&[4]);
        assert_eq!(
            state.play(Pos(4)),
            Err(IllegalMoveError::Occupied { pos: Pos(4) })
        );
        assert_eq!(
            state.play(Pos(12)),
            Err(IllegalMoveError::OutOfRange { index: 12 })
        );

        let mut won = played(&[0, 3, 1, 4, 2]);
        assert_eq!(
            won.play(Pos(8)),
            Err(IllegalMoveError::GameOver { winner: Side::X })
        );
    }

    #[test]
    fn test_winner_detection() {
        assert_eq!(State::new().winner(), None);
        let row = played(&[0, 3, 1, 4, 2]);
        assert_eq!(row.winner(), Some(Side::X));
        assert_eq!(row.winning_line(Side::X), Some([Pos(0), Pos(1), Pos(2)]));

        let col = played(&[0, 1, 3, 4, 8, 7]);
        assert_eq!(col.winner(), Some(Side::O));

        let diag = played(&[2, 0, 4, 1, 6]);
        assert_eq!(diag.winner(), Some(Side::X));
    }

    #[test]
    fn test_eviction_breaks_line() {
        // X holds 0, 1 and the oldest piece at 5; placing at 2 evicts 5 first.
        let mut state = played(&[5, 3, 0, 6, 1, 8]);
        state.play(Pos(2)).unwrap();
        assert_eq!(state.winner(), Some(Side::X));

        // X's oldest piece is 0: completing 0-1-2 evicts it.
        let mut state = played(&[0, 3, 1, 6, 5, 8]);
        state.play(Pos(2)).unwrap();
        assert_eq!(state.winner(), None);
        assert!(state.is_empty(Pos(0)));
    }

    #[test]
    fn test_legal_moves() {
        let moves = State::new().legal_moves();
        assert_eq!(moves.len(), 9);
        assert_eq!(moves[0], (StateCode(1), Pos(0)));
        assert_eq!(moves[8], (StateCode(9), Pos(8)));

        let won = played(&[0, 3, 1, 4, 2]);
        assert!(won.legal_moves().is_empty());
    }

    #[test]
    fn test_decode_rejects_malformed_codes() {
        assert_eq!(
            State::decode(StateCode(2_000_000)),
            Err(DecodeError::OutOfRange {
                code: 2_000_000,
                max: 1_999_999
            })
        );
        // X queue digits 1, 0, 1: slot 1 empty, slot 2 used.
        assert_eq!(
            State::decode(StateCode(1_000_101)),
            Err(DecodeError::QueueGap {
                code: 1_000_101,
                side: Side::X
            })
        );
    }

    #[test]
    fn test_decode_rejects_duplicate_cell() {
        // X: cell 0 ; O: cell 0
        assert_eq!(
            State::decode(StateCode(1_001)),
            Err(DecodeError::DuplicateCell { code: 1_001, cell: 0 })
        );
    }

    #[test]
    fn test_decode_rejects_unbalanced_counts() {
        // Two X pieces, no O pieces, O to move.
        assert_eq!(
            State::decode(StateCode(21)),
            Err(DecodeError::UnbalancedCounts {
                code: 21,
                x_count: 2,
                o_count: 0,
                to_move: Side::O
            })
        );
    }

    #[test]
    fn test_display_marks_next_eviction() {
        let state = played(&[0, 8, 1, 7, 3, 5]);
        let text = state.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], " * Turn of \"x\"");
        assert_eq!(lines[1], " x | X |  ");
        assert_eq!(lines[2], " X |   | O");
        assert_eq!(lines[3], "   | O | o");
    }

    #[test]
    fn test_serde_side_and_code() {
        assert_eq!(serde_json::to_string(&Side::X).unwrap(), "\"x\"");
        assert_eq!(serde_json::to_string(&StateCode(42)).unwrap(), "42");
        let pos: Pos = serde_json::from_str("7").unwrap();
        assert_eq!(pos, Pos(7));
    }
}
