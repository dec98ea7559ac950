//! Two-phase exact solver.
//!
//! Backward induction scores every state with a forced win, then a
//! cycle-aware search from the root scores the states that can only reach
//! win-free cycles. Anything neither phase reached defaults to a draw, and
//! the solve fails unless every discovered state ends up scored.

use std::collections::{BTreeMap, HashMap};

use fifo_core::{DecodeError, StateCode};
use log::info;
use thiserror::Error;

use crate::graph::{GraphBuilder, StateGraph};
use crate::rank::Rank;
use crate::retrograde::retrograde;
use crate::search::cycle_search;
use crate::stats::SolverStats;

/// How a state received its rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Already won
    Terminal,
    /// Phase 1: a child wins for the mover
    Forced,
    /// Phase 1: every child scored, none favorable
    Exhausted,
    /// Phase 2: cycle-aware search
    Searched,
    /// Not reachable from the root, defaulted to a draw
    Unreachable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scored {
    pub rank: Rank,
    pub how: Resolution,
}

/// Score cache shared by both phases.
pub type ScoreTable = HashMap<StateCode, Scored>;

/// Fatal conditions that abort a solve.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("no won leaf to seed backward induction")]
    NoTerminalStates,

    #[error("leaf {code} has no legal moves but no winner")]
    LeafWithoutWinner { code: StateCode },

    #[error("scored {scored} states but discovered {discovered}")]
    CoverageMismatch { scored: usize, discovered: usize },
}

/// Owns the graph and the score table for one solve.
pub struct Solver {
    pub graph: StateGraph,
    pub table: ScoreTable,
    pub stats: SolverStats,
}

impl Solver {
    pub fn new(graph: StateGraph) -> Self {
        Self {
            graph,
            table: ScoreTable::new(),
            stats: SolverStats::new(),
        }
    }

    /// Build the full reachable graph from the empty board.
    pub fn for_game() -> Self {
        let mut stats = SolverStats::new();
        let mut graph = StateGraph::new();
        graph.add_node(StateCode::INITIAL);
        for edge in GraphBuilder::new() {
            stats.record_edge(&edge);
            graph.add_edge(edge.parent, edge.child);
        }
        stats.log_graph(graph.len());
        Self {
            graph,
            table: ScoreTable::new(),
            stats,
        }
    }

    /// Score every state of the graph. Returns the rank of `root`.
    pub fn solve(&mut self, root: StateCode) -> Result<Rank, SolverError> {
        self.table.clear();
        self.stats.reset_phases();

        retrograde(&self.graph, &mut self.table, &mut self.stats)?;
        self.stats.log_retrograde();

        cycle_search(&self.graph, &mut self.table, &mut self.stats, root);
        self.stats.log_search();

        for &code in self.graph.nodes() {
            if !self.table.contains_key(&code) {
                self.table.insert(
                    code,
                    Scored {
                        rank: Rank::DRAW,
                        how: Resolution::Unreachable,
                    },
                );
                self.stats.unreachable += 1;
            }
        }

        if self.table.len() != self.graph.len() {
            return Err(SolverError::CoverageMismatch {
                scored: self.table.len(),
                discovered: self.graph.len(),
            });
        }
        self.stats.log_summary(self.table.len());

        Ok(self.rank(root).unwrap_or(Rank::DRAW))
    }

    pub fn rank(&self, code: StateCode) -> Option<Rank> {
        self.table.get(&code).map(|s| s.rank)
    }

    pub fn resolution(&self, code: StateCode) -> Option<Resolution> {
        self.table.get(&code).map(|s| s.how)
    }

    /// Ranks sorted by code.
    pub fn ranks(&self) -> BTreeMap<StateCode, Rank> {
        self.table.iter().map(|(&k, s)| (k, s.rank)).collect()
    }

    /// Exported scores sorted by code.
    pub fn scores(&self) -> BTreeMap<StateCode, f64> {
        self.table
            .iter()
            .map(|(&k, s)| (k, s.rank.to_score()))
            .collect()
    }
}

/// Solve the whole game from the empty board.
pub fn solve() -> Result<Solver, SolverError> {
    let mut solver = Solver::for_game();
    let root = solver.solve(StateCode::INITIAL)?;
    info!("initial position: {}", root);
    Ok(solver)
}

/// Exported score of every reachable state.
pub fn compute_scores() -> Result<BTreeMap<StateCode, f64>, SolverError> {
    Ok(solve()?.scores())
}
