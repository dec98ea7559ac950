//! Phase 2: cycle-aware depth-first minimax from the root.
//!
//! The search runs on an explicit stack and walks every state reachable from
//! the root. States scored by backward induction keep their rank: it is
//! collected by the parent as is, and the state is entered once only to
//! reach what lies beyond it. Every other state is scored here.
//!
//! Each unscored state counts how many of its frames currently sit on the
//! path. When a child is already on the path and that count has reached its
//! number of outgoing edges, every exit of the child is an active ancestor:
//! there is no way out of the cycle and the child contributes a draw.
//! Otherwise the child still has an unexplored exit and is entered again.

use std::collections::{HashMap, HashSet};

use fifo_core::{Side, StateCode};

use crate::graph::StateGraph;
use crate::rank::Rank;
use crate::solver::{Resolution, ScoreTable, Scored};
use crate::stats::SolverStats;

/// Stack frame for the iterative search.
struct Frame {
    code: StateCode,
    mover: Side,
    /// Index of the next child to look at
    next: usize,
    /// Best contribution collected so far
    best: Option<Rank>,
    /// Rank fixed by backward induction; entered only to walk past it
    settled: bool,
}

impl Frame {
    fn new(code: StateCode, settled: bool) -> Self {
        Self {
            code,
            mover: code.side_to_move(),
            next: 0,
            best: None,
            settled,
        }
    }

    #[inline]
    fn collect(&mut self, rank: Rank) {
        let mover = self.mover;
        self.best = Some(match self.best {
            Some(b) => Rank::best_for(mover, b, rank),
            None => rank,
        });
    }
}

/// Score every unscored state reachable from `root`.
pub fn cycle_search(
    graph: &StateGraph,
    table: &mut ScoreTable,
    stats: &mut SolverStats,
    root: StateCode,
) {
    if !graph.contains(root) {
        return;
    }

    // Frames of each unscored state currently on the path.
    let mut on_path: HashMap<StateCode, usize> = HashMap::new();
    // Scored states already walked past.
    let mut walked: HashSet<StateCode> = HashSet::new();
    let mut stack: Vec<Frame> = Vec::with_capacity(256);

    if table.contains_key(&root) {
        walked.insert(root);
        stack.push(Frame::new(root, true));
    } else {
        on_path.insert(root, 1);
        stack.push(Frame::new(root, false));
    }
    stats.max_depth = 1;

    while let Some(frame) = stack.last_mut() {
        let children = graph.children(frame.code);

        if let Some(&child) = children.get(frame.next) {
            frame.next += 1;

            if let Some(scored) = table.get(&child) {
                frame.collect(scored.rank);
                let walk_past = scored.how != Resolution::Searched
                    && !graph.children(child).is_empty()
                    && walked.insert(child);
                if walk_past {
                    stack.push(Frame::new(child, true));
                    stats.max_depth = stats.max_depth.max(stack.len() as u64);
                }
                continue;
            }

            let depth = on_path.get(&child).copied().unwrap_or(0);
            if depth > 0 && depth >= graph.children(child).len() {
                stats.cycle_draws += 1;
                frame.collect(Rank::DRAW);
                continue;
            }
            if depth > 0 {
                stats.reentries += 1;
            }

            *on_path.entry(child).or_insert(0) += 1;
            stack.push(Frame::new(child, false));
            stats.max_depth = stats.max_depth.max(stack.len() as u64);
        } else {
            // All children collected - pop frame and record rank
            let Some(done) = stack.pop() else { break };
            if done.settled {
                continue;
            }
            if let Some(count) = on_path.get_mut(&done.code) {
                *count -= 1;
            }

            // An inner frame of the same state may have finished first.
            let rank = match table.get(&done.code) {
                Some(scored) => scored.rank,
                None => {
                    let rank = done.best.map_or(Rank::DRAW, Rank::increment);
                    table.insert(
                        done.code,
                        Scored {
                            rank,
                            how: Resolution::Searched,
                        },
                    );
                    stats.searched += 1;
                    rank
                }
            };

            if let Some(parent) = stack.last_mut() {
                parent.collect(rank);
            }
        }
    }
}
