use crate::core::money::Cents;
use crate::error::DebtError;
use crate::graph::flow_graph::{FlowGraph, NodeId};
use std::collections::VecDeque;

/// Computes maximum flows over a [`FlowGraph`].
///
/// Solvers leave the resulting flow on the graph's edges.
pub trait MaxFlowSolver {
    /// Push as much flow as possible from `source` to `sink`, but no more than `limit`.
    fn solve_bounded(
        &mut self,
        graph: &mut FlowGraph,
        source: NodeId,
        sink: NodeId,
        limit: Cents,
    ) -> Result<Cents, DebtError>;

    /// Push the maximum flow from `source` to `sink`.
    fn solve(
        &mut self,
        graph: &mut FlowGraph,
        source: NodeId,
        sink: NodeId,
    ) -> Result<Cents, DebtError> {
        self.solve_bounded(graph, source, sink, Cents::MAX)
    }
}

/// Dinic's max-flow algorithm.
///
/// Each phase builds a BFS level graph from the source and then saturates it
/// with a blocking flow found by DFS along strictly increasing levels. The
/// per-node `next` cursor skips edges already found useless in the current
/// phase, so each phase touches every edge a bounded number of times.
///
/// The scratch buffers are kept between runs, so one solver can be reused
/// for many max-flow computations.
#[derive(Debug, Clone, Default)]
pub struct Dinic {
    level: Vec<Option<usize>>,
    next: Vec<usize>,
}

impl Dinic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the level graph. Returns false once the sink is unreachable.
    fn bfs(&mut self, graph: &FlowGraph, source: NodeId, sink: NodeId) -> bool {
        self.level.clear();
        self.level.resize(graph.node_count(), None);
        self.level[source] = Some(0);

        let mut queue = VecDeque::new();
        queue.push_back(source);
        while let Some(at) = queue.pop_front() {
            let next_level = self.level[at].map(|l| l + 1);
            for &id in graph.adjacency(at) {
                let edge = graph.edge(id);
                if edge.remaining_capacity().is_positive() && self.level[edge.to()].is_none() {
                    self.level[edge.to()] = next_level;
                    queue.push_back(edge.to());
                }
            }
        }
        self.level[sink].is_some()
    }

    /// Find one augmenting path in the level graph and push its bottleneck.
    fn dfs(&mut self, graph: &mut FlowGraph, at: NodeId, sink: NodeId, flow: Cents) -> Cents {
        if at == sink {
            return flow;
        }
        let next_level = self.level[at].map(|l| l + 1);
        while self.next[at] < graph.adjacency(at).len() {
            let id = graph.adjacency(at)[self.next[at]];
            let edge = graph.edge(id);
            let (to, remaining) = (edge.to(), edge.remaining_capacity());

            if remaining.is_positive() && self.level[to] == next_level {
                let bottleneck = self.dfs(graph, to, sink, flow.min(remaining));
                if bottleneck.is_positive() {
                    graph.augment(id, bottleneck);
                    return bottleneck;
                }
            }
            self.next[at] += 1;
        }
        Cents::ZERO
    }
}

impl MaxFlowSolver for Dinic {
    fn solve_bounded(
        &mut self,
        graph: &mut FlowGraph,
        source: NodeId,
        sink: NodeId,
        limit: Cents,
    ) -> Result<Cents, DebtError> {
        for node in [source, sink] {
            if node >= graph.node_count() {
                return Err(DebtError::NodeOutOfRange {
                    node,
                    node_count: graph.node_count(),
                });
            }
        }
        if source == sink {
            return Ok(Cents::ZERO);
        }

        let mut total = Cents::ZERO;
        let mut phase = 0usize;
        while total < limit && self.bfs(graph, source, sink) {
            phase += 1;
            self.next.clear();
            self.next.resize(graph.node_count(), 0);
            loop {
                let budget = limit - total;
                let pushed = self.dfs(graph, source, sink, budget);
                if !pushed.is_positive() {
                    break;
                }
                total = total.checked_add(pushed).ok_or(DebtError::Overflow)?;
                if total >= limit {
                    break;
                }
            }
            log::trace!("dinic phase {phase}: {source} -> {sink} flow so far {total}");
        }
        Ok(total)
    }
}
