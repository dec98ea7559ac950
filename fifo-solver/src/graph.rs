//! Reachable state graph.
//!
//! [`GraphBuilder`] walks the game breadth-first from the empty board and
//! yields one [`Edge`] per legal placement. [`StateGraph`] keeps the forward
//! and reverse adjacency keyed by [`StateCode`]. The graph has cycles: FIFO
//! eviction lets a position come back.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use fifo_core::{Pos, State, StateCode};
use thiserror::Error;

/// One legal placement discovered during the breadth-first walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub parent: StateCode,
    pub child: StateCode,
    /// Cell the piece was placed on.
    pub mov: Pos,
    /// BFS level of the child.
    pub level: u32,
    /// Child was already discovered through another edge.
    pub was_visited: bool,
}

/// Breadth-first edge generator over every reachable state.
///
/// The visited set is what stops the walk; levels are informational since
/// the transition relation is cyclic.
pub struct GraphBuilder {
    queue: VecDeque<(State, u32)>,
    visited: HashSet<StateCode>,
    pending: VecDeque<Edge>,
}

impl GraphBuilder {
    /// Start from the empty board, X to move.
    pub fn new() -> Self {
        Self::from_state(State::new())
    }

    pub fn from_state(root: State) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back((root, 0));
        Self {
            queue,
            visited: HashSet::new(),
            pending: VecDeque::new(),
        }
    }

    /// Expand the next unvisited state into `pending`.
    /// Returns false once the queue is exhausted.
    fn expand_next(&mut self) -> bool {
        while let Some((mut state, level)) = self.queue.pop_front() {
            let code = state.encode();
            if !self.visited.insert(code) {
                continue;
            }
            // Won states are leaves.
            if state.winner().is_some() {
                continue;
            }

            for pos in Pos::all() {
                if !state.is_empty(pos) {
                    continue;
                }
                let undo = state.apply(pos);
                let child = state.encode();
                let was_visited = self.visited.contains(&child);
                if !was_visited {
                    self.queue.push_back((state, level + 1));
                }
                state.undo(&undo);

                self.pending.push_back(Edge {
                    parent: code,
                    child,
                    mov: pos,
                    level: level + 1,
                    was_visited,
                });
            }

            if !self.pending.is_empty() {
                return true;
            }
        }
        false
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for GraphBuilder {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        if self.pending.is_empty() && !self.expand_next() {
            return None;
        }
        self.pending.pop_front()
    }
}

#[derive(Debug, Default, Clone)]
struct Node {
    children: Vec<StateCode>,
    parents: Vec<StateCode>,
}

/// Forward adjacency and its inverse. Built once, read-only afterwards.
///
/// Nodes keep their discovery order so that every pass over the graph is
/// deterministic.
#[derive(Debug, Default, Clone)]
pub struct StateGraph {
    nodes: HashMap<StateCode, Node>,
    order: Vec<StateCode>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explore every state reachable from the empty board.
    pub fn build() -> Self {
        Self::from_edges(GraphBuilder::new())
    }

    pub fn from_edges(edges: impl IntoIterator<Item = Edge>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge.parent, edge.child);
        }
        graph
    }

    /// Ensure `code` is a node, with no edges if new.
    pub fn add_node(&mut self, code: StateCode) {
        if !self.nodes.contains_key(&code) {
            self.nodes.insert(code, Node::default());
            self.order.push(code);
        }
    }

    pub fn add_edge(&mut self, parent: StateCode, child: StateCode) {
        self.add_node(parent);
        self.add_node(child);
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parents.push(parent);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn contains(&self, code: StateCode) -> bool {
        self.nodes.contains_key(&code)
    }

    /// All nodes in discovery order.
    pub fn nodes(&self) -> &[StateCode] {
        &self.order
    }

    pub fn children(&self, code: StateCode) -> &[StateCode] {
        self.nodes
            .get(&code)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parents(&self, code: StateCode) -> &[StateCode] {
        self.nodes
            .get(&code)
            .map(|n| n.parents.as_slice())
            .unwrap_or(&[])
    }

    /// Nodes without outgoing edges, in discovery order.
    pub fn leaves(&self) -> impl Iterator<Item = StateCode> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|&code| self.children(code).is_empty())
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.children.len()).sum()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cycle in graph: {node} still waits on {waiting:?}")]
pub struct CycleError {
    pub node: u32,
    pub waiting: Vec<u32>,
}

/// Topological order of an ACYCLIC graph given as `node -> successors`,
/// starting from `start`.
///
/// Only meant for acyclic subgraphs and synthetic graphs; the full state
/// graph is cyclic and yields a [`CycleError`].
pub fn toposort(
    start: &BTreeSet<u32>,
    successors: &BTreeMap<u32, BTreeSet<u32>>,
) -> Result<Vec<u32>, CycleError> {
    // Remaining unsorted predecessors for every node.
    let mut waiting: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    for (&node, next) in successors {
        waiting.entry(node).or_default();
        for &m in next {
            waiting.entry(m).or_default().insert(node);
        }
    }

    let mut ready = start.clone();
    let mut sorted = Vec::with_capacity(waiting.len());
    while let Some(n) = ready.pop_first() {
        sorted.push(n);
        for &m in successors.get(&n).into_iter().flatten() {
            if let Some(preds) = waiting.get_mut(&m) {
                preds.remove(&n);
                if preds.is_empty() {
                    ready.insert(m);
                }
            }
        }
    }

    if let Some((&node, preds)) = waiting.iter().find(|(_, preds)| !preds.is_empty()) {
        return Err(CycleError {
            node,
            waiting: preds.iter().copied().collect(),
        });
    }
    Ok(sorted)
}
