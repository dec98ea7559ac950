//! Solver statistics tracking.

use std::time::Instant;

use fifo_core::Side;
use log::{debug, info};

use crate::graph::Edge;

/// Statistics collected while building and solving the graph.
#[derive(Debug, Default, Clone)]
pub struct SolverStats {
    /// Edges emitted by the breadth-first walk
    pub edges: u64,

    /// Edges leading to an already-discovered state
    pub revisited_edges: u64,

    /// Deepest BFS level reached
    pub max_level: u32,

    /// Won positions used to seed backward induction
    pub terminal_positions: u64,
    pub x_wins: u64,
    pub o_wins: u64,

    /// Phase 1: a child already forced a win for the mover
    pub forced: u64,

    /// Phase 1: every child was scored, none favorable
    pub exhausted: u64,

    /// Phase 1: dequeued while some children were still unresolved
    pub deferred: u64,

    /// Phase 2: scored by the cycle-aware search
    pub searched: u64,

    /// Phase 2: child contributions cut off because every exit was on the path
    pub cycle_draws: u64,

    /// Phase 2: in-progress states entered again through an open exit
    pub reentries: u64,

    /// Phase 2: deepest explicit stack
    pub max_depth: u64,

    /// Never reached by either phase, defaulted to a draw
    pub unreachable: u64,

    start_time: Option<Instant>,
}

impl SolverStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Clear the counters of both solve phases, keeping the graph counters
    pub fn reset_phases(&mut self) {
        *self = Self {
            edges: self.edges,
            revisited_edges: self.revisited_edges,
            max_level: self.max_level,
            start_time: self.start_time,
            ..Default::default()
        };
    }

    pub fn record_edge(&mut self, edge: &Edge) {
        self.edges += 1;
        if edge.was_visited {
            self.revisited_edges += 1;
        }
        self.max_level = self.max_level.max(edge.level);
    }

    /// Record a won leaf
    pub fn record_terminal(&mut self, winner: Side) {
        self.terminal_positions += 1;
        match winner {
            Side::X => self.x_wins += 1,
            Side::O => self.o_wins += 1,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|s| s.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    pub fn log_graph(&self, states: usize) {
        info!(
            "graph: states={} edges={} revisited={} depth={}",
            states, self.edges, self.revisited_edges, self.max_level
        );
    }

    pub fn log_retrograde(&self) {
        info!(
            "retrograde: terminals={} (x={} o={}) forced={} exhausted={}",
            self.terminal_positions, self.x_wins, self.o_wins, self.forced, self.exhausted
        );
        debug!("retrograde: deferred dequeues={}", self.deferred);
    }

    pub fn log_search(&self) {
        info!(
            "cycle search: searched={} cycle_draws={} reentries={} max_depth={}",
            self.searched, self.cycle_draws, self.reentries, self.max_depth
        );
    }

    /// Final summary
    pub fn log_summary(&self, scored: usize) {
        info!(
            "solved {} states in {:.2}s (unreachable={})",
            scored,
            self.elapsed_secs(),
            self.unreachable
        );
    }
}
