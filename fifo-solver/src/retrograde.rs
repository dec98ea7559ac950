//! Phase 1: backward induction from won positions.
//!
//! Won leaves are seeded with rank ±1 and their parents are queued. A
//! dequeued state is scored when one scored child already wins for the
//! mover (forced), or when every child is scored (exhausted: X takes the
//! largest rank, O the smallest). Otherwise it is dropped and waits for
//! another child to resolve. A state is scored at most once and the worklist only
//! grows when a score appears, so the loop terminates. What stays unscored
//! can only reach win-free cycles.

use std::collections::VecDeque;

use fifo_core::StateCode;

use crate::graph::StateGraph;
use crate::rank::Rank;
use crate::solver::{Resolution, ScoreTable, Scored, SolverError};
use crate::stats::SolverStats;

/// Run backward induction over `graph`, filling `table`.
pub fn retrograde(
    graph: &StateGraph,
    table: &mut ScoreTable,
    stats: &mut SolverStats,
) -> Result<(), SolverError> {
    let mut worklist: VecDeque<StateCode> = VecDeque::new();
    let mut seeds = 0;

    for leaf in graph.leaves() {
        let winner = leaf
            .decode()?
            .winner()
            .ok_or(SolverError::LeafWithoutWinner { code: leaf })?;
        table.insert(
            leaf,
            Scored {
                rank: Rank::win(winner),
                how: Resolution::Terminal,
            },
        );
        stats.record_terminal(winner);
        seeds += 1;
        worklist.extend(graph.parents(leaf));
    }

    if seeds == 0 {
        return Err(SolverError::NoTerminalStates);
    }

    while let Some(node) = worklist.pop_front() {
        if table.contains_key(&node) {
            continue;
        }

        match resolve(graph, table, node) {
            Some(scored) => {
                match scored.how {
                    Resolution::Forced => stats.forced += 1,
                    _ => stats.exhausted += 1,
                }
                table.insert(node, scored);
                worklist.extend(graph.parents(node));
            }
            None => stats.deferred += 1,
        }
    }

    Ok(())
}

/// Score `node` from its currently scored children, if possible.
fn resolve(graph: &StateGraph, table: &ScoreTable, node: StateCode) -> Option<Scored> {
    let mover = node.side_to_move();
    let children = graph.children(node);

    let mut resolved = 0;
    let mut fastest_win: Option<Rank> = None;
    let mut best: Option<Rank> = None;

    for child in children {
        let Some(scored) = table.get(child) else {
            continue;
        };
        resolved += 1;
        let rank = scored.rank;

        if rank.favors(mover) && fastest_win.map_or(true, |f| rank.plies() < f.plies()) {
            fastest_win = Some(rank);
        }
        best = Some(match best {
            Some(b) => Rank::best_for(mover, b, rank),
            None => rank,
        });
    }

    if let Some(win) = fastest_win {
        return Some(Scored {
            rank: win.increment(),
            how: Resolution::Forced,
        });
    }

    if resolved == children.len() {
        return best.map(|b| Scored {
            rank: b.increment(),
            how: Resolution::Exhausted,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use fifo_core::{Pos, State};

    fn played(cells: &[u8]) -> State {
        let mut state = State::new();
        for &c in cells {
            state.play(Pos(c)).unwrap();
        }
        state
    }

    #[test]
    fn test_empty_graph_has_no_terminals() {
        let graph = StateGraph::new();
        let mut table = ScoreTable::new();
        let mut stats = SolverStats::new();
        assert!(matches!(
            retrograde(&graph, &mut table, &mut stats),
            Err(SolverError::NoTerminalStates)
        ));
    }

    #[test]
    fn test_seed_count_is_per_run() {
        // Counters left over from an earlier run must not hide a graph
        // without won leaves.
        let graph = StateGraph::new();
        let mut table = ScoreTable::new();
        let mut stats = SolverStats::new();
        stats.record_terminal(fifo_core::Side::X);
        assert!(matches!(
            retrograde(&graph, &mut table, &mut stats),
            Err(SolverError::NoTerminalStates)
        ));
    }

    #[test]
    fn test_leaf_must_be_won() {
        let mut graph = StateGraph::new();
        graph.add_node(StateCode::INITIAL);
        let mut table = ScoreTable::new();
        let mut stats = SolverStats::new();
        assert!(matches!(
            retrograde(&graph, &mut table, &mut stats),
            Err(SolverError::LeafWithoutWinner { code }) if code == StateCode::INITIAL
        ));
    }

    #[test]
    fn test_forced_and_exhausted() {
        // X to move at `a` can win at once; O at `b` can only move into `a`.
        let before = played(&[0, 3, 1, 4]);
        let a = before.encode();
        let win = played(&[0, 3, 1, 4, 2]).encode();
        let b = StateCode(7);

        let mut graph = StateGraph::new();
        graph.add_edge(a, win);
        graph.add_edge(b, a);

        let mut table = ScoreTable::new();
        let mut stats = SolverStats::new();
        retrograde(&graph, &mut table, &mut stats).unwrap();

        assert_eq!(table[&win].rank, Rank::win(fifo_core::Side::X));
        assert_eq!(table[&a].rank, Rank::from_value(2));
        assert_eq!(table[&a].how, Resolution::Forced);
        assert_eq!(table[&b].rank, Rank::from_value(3));
        assert_eq!(table[&b].how, Resolution::Exhausted);
        assert_eq!(stats.forced, 1);
        assert_eq!(stats.exhausted, 1);
    }

    #[test]
    fn test_prefers_fastest_favorable_child() {
        let x_won = played(&[0, 3, 1, 4, 2]).encode();
        let mut graph = StateGraph::new();
        // X to move: a slow win through `mid` listed before the immediate one.
        let node = StateCode(1_000_005);
        let mid = StateCode(6);
        let mid_next = StateCode(1_000_006);
        graph.add_edge(node, mid);
        graph.add_edge(node, x_won);
        graph.add_edge(mid, mid_next);
        graph.add_edge(mid_next, x_won);

        let mut table = ScoreTable::new();
        table.insert(
            mid,
            Scored {
                rank: Rank::from_value(3),
                how: Resolution::Exhausted,
            },
        );
        let mut stats = SolverStats::new();
        retrograde(&graph, &mut table, &mut stats).unwrap();
        assert_eq!(table[&node].rank, Rank::from_value(2));
    }

    #[test]
    fn test_cycle_stays_unresolved() {
        let o_won = played(&[0, 3, 1, 4, 8, 5]).encode();
        let x_node = StateCode(1_000_002);
        let o_node = StateCode(3);

        let mut graph = StateGraph::new();
        graph.add_edge(x_node, o_node);
        graph.add_edge(o_node, x_node);
        graph.add_edge(x_node, StateCode(1_000_000));
        graph.add_edge(StateCode(1_000_000), o_won);

        let mut table = ScoreTable::new();
        let mut stats = SolverStats::new();
        retrograde(&graph, &mut table, &mut stats).unwrap();
        assert!(!table.contains_key(&x_node));
        assert!(!table.contains_key(&o_node));
        assert!(stats.deferred > 0);
    }
}
