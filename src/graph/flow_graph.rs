use crate::core::money::Cents;
use crate::error::DebtError;
use crate::graph::dinic::{Dinic, MaxFlowSolver};

/// Index of a node (person) in a [`FlowGraph`].
pub type NodeId = usize;

/// Handle of an edge in a [`FlowGraph`]'s edge arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A directed edge with capacity and flow, paired with a residual twin.
///
/// The twin runs in the opposite direction with zero capacity and always
/// carries the negated flow, so `edge.flow + twin.flow == 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    from: NodeId,
    to: NodeId,
    capacity: Cents,
    flow: Cents,
    residual: EdgeId,
    is_residual: bool,
}

impl FlowEdge {
    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn capacity(&self) -> Cents {
        self.capacity
    }

    pub fn flow(&self) -> Cents {
        self.flow
    }

    /// Handle of the paired edge running the other way.
    pub fn residual(&self) -> EdgeId {
        self.residual
    }

    /// True for the zero-capacity twin created alongside a forward edge.
    pub fn is_residual(&self) -> bool {
        self.is_residual
    }

    /// `capacity - flow`: how much more can be pushed along this edge.
    pub fn remaining_capacity(&self) -> Cents {
        self.capacity - self.flow
    }
}

/// Directed flow network over trip members.
///
/// Edges live in an arena and are addressed by [`EdgeId`]; each node keeps
/// the handles of its outgoing edges. A forward edge and its twin are always
/// stored next to each other.
///
/// The graph is mutable: max-flow runs leave their flow on the edges. Use
/// [`FlowGraph::residual_graph`] to start over from the remaining capacities.
///
/// # Examples
///
/// ```
/// use debt_simplifier::core::money::Cents;
/// use debt_simplifier::graph::flow_graph::FlowGraph;
///
/// let mut graph = FlowGraph::new(3);
/// graph.add_edge(0, 1, Cents::new(50)).unwrap();
/// graph.add_edge(1, 2, Cents::new(30)).unwrap();
/// graph.set_source(0).unwrap();
/// graph.set_sink(2).unwrap();
///
/// assert_eq!(graph.max_flow().unwrap(), Cents::new(30));
/// ```
#[derive(Debug, Clone)]
pub struct FlowGraph {
    edges: Vec<FlowEdge>,
    adjacency: Vec<Vec<EdgeId>>,
    source: Option<NodeId>,
    sink: Option<NodeId>,
}

impl FlowGraph {
    pub fn new(node_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            adjacency: vec![Vec::new(); node_count],
            source: None,
            sink: None,
        }
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of edges in the arena, residual twins included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn check_node(&self, node: NodeId) -> Result<(), DebtError> {
        if node < self.node_count() {
            Ok(())
        } else {
            Err(DebtError::NodeOutOfRange {
                node,
                node_count: self.node_count(),
            })
        }
    }

    /// Add a forward edge and its zero-capacity residual twin.
    ///
    /// Returns the handle of the forward edge.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        capacity: Cents,
    ) -> Result<EdgeId, DebtError> {
        self.check_node(from)?;
        self.check_node(to)?;
        if capacity.is_negative() {
            return Err(DebtError::InvalidCapacity { from, to, capacity });
        }

        Ok(self.push_edge(from, to, capacity))
    }

    fn push_edge(&mut self, from: NodeId, to: NodeId, capacity: Cents) -> EdgeId {
        let forward = EdgeId(self.edges.len());
        let twin = EdgeId(self.edges.len() + 1);
        self.edges.push(FlowEdge {
            from,
            to,
            capacity,
            flow: Cents::ZERO,
            residual: twin,
            is_residual: false,
        });
        self.edges.push(FlowEdge {
            from: to,
            to: from,
            capacity: Cents::ZERO,
            flow: Cents::ZERO,
            residual: forward,
            is_residual: true,
        });
        self.adjacency[from].push(forward);
        self.adjacency[to].push(twin);
        forward
    }

    pub fn edge(&self, id: EdgeId) -> &FlowEdge {
        &self.edges[id.0]
    }

    /// All edges, residual twins included, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &FlowEdge)> + '_ {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId(i), e))
    }

    /// Forward edges only, in insertion order.
    pub fn forward_edges(&self) -> impl Iterator<Item = (EdgeId, &FlowEdge)> + '_ {
        self.edges().filter(|(_, e)| !e.is_residual())
    }

    /// Outgoing edge handles of a node.
    pub fn adjacency(&self, node: NodeId) -> &[EdgeId] {
        &self.adjacency[node]
    }

    pub fn set_source(&mut self, node: NodeId) -> Result<(), DebtError> {
        self.check_node(node)?;
        self.source = Some(node);
        Ok(())
    }

    pub fn set_sink(&mut self, node: NodeId) -> Result<(), DebtError> {
        self.check_node(node)?;
        self.sink = Some(node);
        Ok(())
    }

    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    pub fn sink(&self) -> Option<NodeId> {
        self.sink
    }

    /// Push `bottleneck` units along an edge, keeping its twin in step.
    pub fn augment(&mut self, id: EdgeId, bottleneck: Cents) {
        let twin = self.edges[id.0].residual;
        self.edges[id.0].flow += bottleneck;
        self.edges[twin.0].flow -= bottleneck;
    }

    /// Max flow between the configured source and sink, using Dinic's algorithm.
    pub fn max_flow(&mut self) -> Result<Cents, DebtError> {
        self.max_flow_with(&mut Dinic::default())
    }

    /// Max flow between the configured source and sink with a given solver.
    pub fn max_flow_with<S: MaxFlowSolver>(&mut self, solver: &mut S) -> Result<Cents, DebtError> {
        let (source, sink) = self
            .source
            .zip(self.sink)
            .ok_or(DebtError::TerminalsNotSet)?;
        solver.solve(self, source, sink)
    }

    /// A fresh graph whose capacities are this graph's remaining capacities.
    ///
    /// Only forward edges with something left are carried over, in their
    /// original relative order. Flows start at zero and terminals are unset.
    pub fn residual_graph(&self) -> FlowGraph {
        let mut rebuilt = FlowGraph::new(self.node_count());
        for (_, edge) in self.forward_edges() {
            let remaining = edge.remaining_capacity();
            if remaining.is_positive() {
                rebuilt.push_edge(edge.from, edge.to, remaining);
            }
        }
        rebuilt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_creates_twin() {
        let mut graph = FlowGraph::new(2);
        let id = graph.add_edge(0, 1, Cents::new(10)).unwrap();
        let edge = graph.edge(id);
        let twin = graph.edge(edge.residual());

        assert_eq!((edge.from(), edge.to()), (0, 1));
        assert_eq!((twin.from(), twin.to()), (1, 0));
        assert_eq!(twin.capacity(), Cents::ZERO);
        assert!(twin.is_residual());
        assert_eq!(twin.residual(), id);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.adjacency(1), &[edge.residual()]);
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let mut graph = FlowGraph::new(2);
        let result = graph.add_edge(0, 1, Cents::new(-1));
        assert_eq!(
            result,
            Err(DebtError::InvalidCapacity {
                from: 0,
                to: 1,
                capacity: Cents::new(-1)
            })
        );
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_node_out_of_range() {
        let mut graph = FlowGraph::new(2);
        assert_eq!(
            graph.add_edge(0, 2, Cents::new(1)),
            Err(DebtError::NodeOutOfRange {
                node: 2,
                node_count: 2
            })
        );
        assert!(graph.set_sink(5).is_err());
    }

    #[test]
    fn test_augment_keeps_zero_sum() {
        let mut graph = FlowGraph::new(2);
        let id = graph.add_edge(0, 1, Cents::new(10)).unwrap();
        graph.augment(id, Cents::new(4));

        let edge = graph.edge(id);
        let twin = graph.edge(edge.residual());
        assert_eq!(edge.flow() + twin.flow(), Cents::ZERO);
        assert_eq!(edge.remaining_capacity(), Cents::new(6));
        assert_eq!(twin.remaining_capacity(), Cents::new(4));
    }

    #[test]
    fn test_edges_in_insertion_order() {
        let mut graph = FlowGraph::new(3);
        graph.add_edge(2, 0, Cents::new(5)).unwrap();
        graph.add_edge(0, 1, Cents::new(7)).unwrap();

        let forward: Vec<_> = graph
            .forward_edges()
            .map(|(_, e)| (e.from(), e.to()))
            .collect();
        assert_eq!(forward, vec![(2, 0), (0, 1)]);
        assert_eq!(graph.edges().count(), 4);
    }

    #[test]
    fn test_max_flow_requires_terminals() {
        let mut graph = FlowGraph::new(2);
        graph.add_edge(0, 1, Cents::new(5)).unwrap();
        assert_eq!(graph.max_flow(), Err(DebtError::TerminalsNotSet));
    }

    #[test]
    fn test_residual_graph_uses_remaining_capacity() {
        let mut graph = FlowGraph::new(3);
        let ab = graph.add_edge(0, 1, Cents::new(10)).unwrap();
        let bc = graph.add_edge(1, 2, Cents::new(4)).unwrap();
        graph.add_edge(2, 0, Cents::new(3)).unwrap();
        graph.augment(ab, Cents::new(4));
        graph.augment(bc, Cents::new(4));
        graph.set_source(0).unwrap();

        let rebuilt = graph.residual_graph();
        let edges: Vec<_> = rebuilt
            .forward_edges()
            .map(|(_, e)| (e.from(), e.to(), e.capacity(), e.flow()))
            .collect();
        assert_eq!(
            edges,
            vec![
                (0, 1, Cents::new(6), Cents::ZERO),
                (2, 0, Cents::new(3), Cents::ZERO)
            ]
        );
        assert_eq!(rebuilt.source(), None);
        for (id, edge) in rebuilt.edges() {
            assert_eq!(rebuilt.edge(edge.residual()).residual(), id);
        }
    }
}
