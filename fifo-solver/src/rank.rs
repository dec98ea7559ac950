//! Signed distance-to-win ranks.

use std::fmt;

use fifo_core::Side;

/// Signed plies to a forced win: positive when X wins, negative when O wins,
/// zero when neither side can force a win. A won position has rank ±1.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Default)]
pub struct Rank(i32);

impl Rank {
    pub const DRAW: Rank = Rank(0);

    /// Rank of a position already won by `side`.
    #[inline]
    pub fn win(side: Side) -> Rank {
        match side {
            Side::X => Rank(1),
            Side::O => Rank(-1),
        }
    }

    #[inline]
    pub fn from_value(value: i32) -> Rank {
        Rank(value)
    }

    #[inline]
    pub fn value(self) -> i32 {
        self.0
    }

    /// One more ply away from the win. Draws stay draws.
    #[inline]
    pub fn increment(self) -> Rank {
        match self.0.signum() {
            0 => self,
            s => Rank(self.0 + s),
        }
    }

    #[inline]
    pub fn is_draw(self) -> bool {
        self.0 == 0
    }

    pub fn winner(self) -> Option<Side> {
        match self.0.signum() {
            1 => Some(Side::X),
            -1 => Some(Side::O),
            _ => None,
        }
    }

    /// Whether this rank is a forced win for `side`.
    #[inline]
    pub fn favors(self, side: Side) -> bool {
        self.winner() == Some(side)
    }

    /// Magnitude of the rank; 0 for draws.
    #[inline]
    pub fn plies(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// Exported score: the reciprocal of the rank, sign kept, 0 for draws.
    /// A faster forced win has a larger magnitude.
    pub fn to_score(self) -> f64 {
        if self.0 == 0 {
            0.0
        } else {
            1.0 / self.0 as f64
        }
    }

    /// The better of two ranks from `side`'s point of view.
    #[inline]
    pub fn best_for(side: Side, a: Rank, b: Rank) -> Rank {
        match side {
            Side::X => a.max(b),
            Side::O => a.min(b),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner() {
            Some(side) => write!(f, "{} in {}", side, self.plies()),
            None => f.write_str("draw"),
        }
    }
}
