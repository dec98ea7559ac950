//! Exact solver for FIFO-eviction three-in-a-row.
//!
//! The reachable state graph is built breadth-first, won positions are
//! propagated backwards, and whatever backward induction cannot settle is
//! resolved by a cycle-aware depth-first search from the empty board.

pub mod checkpoint;
pub mod export;
pub mod graph;
pub mod play;
pub mod rank;
pub mod retrograde;
pub mod search;
pub mod solver;
pub mod stats;

pub use graph::{toposort, CycleError, Edge, GraphBuilder, StateGraph};
pub use rank::Rank;
pub use solver::{compute_scores, solve, Resolution, ScoreTable, Scored, Solver, SolverError};
pub use stats::SolverStats;
