use crate::core::bill::Bill;
use crate::core::money::Cents;
use crate::core::person::PersonId;
use crate::error::DebtError;
use crate::graph::flow_graph::{FlowGraph, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A directed debt between two graph nodes: `from` owes `to` the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebtEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub amount: Cents,
}

impl DebtEdge {
    pub fn new(from: NodeId, to: NodeId, amount: Cents) -> Self {
        Self { from, to, amount }
    }
}

/// Maps the people of a trip to graph node indices and back.
///
/// Duplicate identifiers are ignored, so indices stay dense.
#[derive(Debug, Clone, Default)]
pub struct PersonIndex {
    people: Vec<PersonId>,
    positions: HashMap<PersonId, NodeId>,
}

impl PersonIndex {
    pub fn new(people: &[PersonId]) -> Self {
        let mut index = Self::default();
        for person in people {
            if !index.positions.contains_key(person) {
                index.positions.insert(*person, index.people.len());
                index.people.push(*person);
            }
        }
        index
    }

    pub fn index_of(&self, person: &PersonId) -> Result<NodeId, DebtError> {
        self.positions
            .get(person)
            .copied()
            .ok_or(DebtError::UnknownPerson(*person))
    }

    pub fn person(&self, node: NodeId) -> Option<&PersonId> {
        self.people.get(node)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

/// Net pairwise debts after opposing debts have been cancelled.
///
/// Keyed by unordered pair stored as `(low, high)` node index. A positive
/// amount means `low` owes `high`; a negative one means `high` owes `low`.
/// Pairs that cancel exactly are not stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetDebts {
    node_count: usize,
    pairs: BTreeMap<(NodeId, NodeId), Cents>,
}

impl NetDebts {
    /// Accumulate raw directed debts and collapse each pair to a single direction.
    ///
    /// If A owes B `x` and B owes A `y`, the result is one debt of `|x - y|`
    /// from the net debtor to the net creditor, or nothing when `x == y`.
    pub fn from_debt_edges(
        node_count: usize,
        edges: impl IntoIterator<Item = DebtEdge>,
    ) -> Result<Self, DebtError> {
        let mut directed: BTreeMap<(NodeId, NodeId), Cents> = BTreeMap::new();
        for edge in edges {
            for node in [edge.from, edge.to] {
                if node >= node_count {
                    return Err(DebtError::NodeOutOfRange { node, node_count });
                }
            }
            if edge.amount.is_negative() {
                return Err(DebtError::InvalidCapacity {
                    from: edge.from,
                    to: edge.to,
                    capacity: edge.amount,
                });
            }
            if edge.from == edge.to || edge.amount == Cents::ZERO {
                continue;
            }
            let total = directed.entry((edge.from, edge.to)).or_insert(Cents::ZERO);
            *total = total.checked_add(edge.amount).ok_or(DebtError::Overflow)?;
        }

        let mut pairs: BTreeMap<(NodeId, NodeId), Cents> = BTreeMap::new();
        for ((from, to), amount) in directed {
            let (key, signed) = if from < to {
                ((from, to), amount)
            } else {
                ((to, from), -amount)
            };
            let net = pairs.entry(key).or_insert(Cents::ZERO);
            *net = net.checked_add(signed).ok_or(DebtError::Overflow)?;
        }
        pairs.retain(|_, net| *net != Cents::ZERO);

        Ok(Self { node_count, pairs })
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of person pairs with an outstanding debt.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Outstanding debts oriented from debtor to creditor, ordered by pair.
    pub fn edges(&self) -> Vec<DebtEdge> {
        self.pairs
            .iter()
            .map(|(&(low, high), &net)| {
                if net.is_positive() {
                    DebtEdge::new(low, high, net)
                } else {
                    DebtEdge::new(high, low, net.abs())
                }
            })
            .collect()
    }

    /// Amount `from` owes `to` after netting; zero if the debt runs the other way.
    pub fn owed(&self, from: NodeId, to: NodeId) -> Cents {
        let signed = if from < to {
            self.pairs.get(&(from, to)).copied()
        } else {
            self.pairs.get(&(to, from)).map(|net| -*net)
        };
        signed.filter(|v| v.is_positive()).unwrap_or(Cents::ZERO)
    }

    /// Sum of all outstanding pairwise debts.
    pub fn total(&self) -> Result<Cents, DebtError> {
        Cents::checked_sum(self.pairs.values().map(|net| net.abs())).ok_or(DebtError::Overflow)
    }

    /// Build a flow network with one edge per outstanding debt.
    pub fn to_flow_graph(&self) -> Result<FlowGraph, DebtError> {
        let mut graph = FlowGraph::new(self.node_count);
        for edge in self.edges() {
            graph.add_edge(edge.from, edge.to, edge.amount)?;
        }
        Ok(graph)
    }
}

/// Turns bills into debt edges between graph nodes.
#[derive(Debug, Clone, Copy)]
pub struct DebtAggregator<'a> {
    index: &'a PersonIndex,
}

impl<'a> DebtAggregator<'a> {
    pub fn new(index: &'a PersonIndex) -> Self {
        Self { index }
    }

    /// One edge per bill involver who is not the payer, worth one truncated share.
    pub fn bill_edges(&self, bills: &[Bill]) -> Result<Vec<DebtEdge>, DebtError> {
        let mut edges = Vec::new();
        for bill in bills {
            let share = bill.share()?;
            let payer = self.index.index_of(&bill.payer())?;
            for debtor in bill.debtors() {
                let from = self.index.index_of(debtor)?;
                edges.push(DebtEdge::new(from, payer, share));
            }
        }
        Ok(edges)
    }

    /// Net pairwise debts implied by the bills.
    pub fn net_debts(&self, bills: &[Bill]) -> Result<NetDebts, DebtError> {
        NetDebts::from_debt_edges(self.index.len(), self.bill_edges(bills)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn people(n: u128) -> Vec<PersonId> {
        (1..=n)
            .map(|i| PersonId::from_uuid(Uuid::from_u128(i)))
            .collect()
    }

    #[test]
    fn test_person_index_dedupes() {
        let ids = people(2);
        let index = PersonIndex::new(&[ids[0], ids[1], ids[0]]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.index_of(&ids[1]).unwrap(), 1);
        assert_eq!(index.person(0), Some(&ids[0]));
        assert!(index.person(2).is_none());
    }

    #[test]
    fn test_bill_edges_skip_payer() {
        let ids = people(3);
        let index = PersonIndex::new(&ids);
        let bill = Bill::new("Dinner", Cents::new(9_000), ids[0], ids.clone()).unwrap();

        let edges = DebtAggregator::new(&index).bill_edges(&[bill]).unwrap();
        assert_eq!(
            edges,
            vec![
                DebtEdge::new(1, 0, Cents::new(3_000)),
                DebtEdge::new(2, 0, Cents::new(3_000))
            ]
        );
    }

    #[test]
    fn test_bill_edges_unknown_payer() {
        let ids = people(3);
        let index = PersonIndex::new(&ids[..2]);
        let bill = Bill::new("Dinner", Cents::new(100), ids[2], vec![ids[0]]).unwrap();

        let result = DebtAggregator::new(&index).bill_edges(&[bill]);
        assert_eq!(result, Err(DebtError::UnknownPerson(ids[2])));
    }

    #[test]
    fn test_bill_edges_one_per_distinct_debtor_after_deserialize() {
        let ids = people(3);
        let index = PersonIndex::new(&ids);
        let json = format!(
            r#"{{"id":"{}","title":"Boat","amount":900,"payer":"{}","involvers":["{}","{}","{}"],"date":"2024-01-01T00:00:00Z"}}"#,
            Uuid::from_u128(77),
            ids[0],
            ids[1],
            ids[2],
            ids[1]
        );
        let bill: Bill = serde_json::from_str(&json).unwrap();

        let edges = DebtAggregator::new(&index).bill_edges(&[bill]).unwrap();
        assert_eq!(
            edges,
            vec![
                DebtEdge::new(1, 0, Cents::new(450)),
                DebtEdge::new(2, 0, Cents::new(450))
            ]
        );
    }

    #[test]
    fn test_net_debts_accumulate_same_direction() {
        let net = NetDebts::from_debt_edges(
            2,
            vec![
                DebtEdge::new(1, 0, Cents::new(500)),
                DebtEdge::new(1, 0, Cents::new(250)),
            ],
        )
        .unwrap();
        assert_eq!(net.edges(), vec![DebtEdge::new(1, 0, Cents::new(750))]);
        assert_eq!(net.owed(1, 0), Cents::new(750));
        assert_eq!(net.owed(0, 1), Cents::ZERO);
    }

    #[test]
    fn test_net_debts_collapse_opposing() {
        let net = NetDebts::from_debt_edges(
            2,
            vec![
                DebtEdge::new(0, 1, Cents::new(90)),
                DebtEdge::new(1, 0, Cents::new(13)),
            ],
        )
        .unwrap();
        assert_eq!(net.edges(), vec![DebtEdge::new(0, 1, Cents::new(77))]);
        assert_eq!(net.total().unwrap(), Cents::new(77));
    }

    #[test]
    fn test_net_debts_equal_opposing_cancel() {
        let net = NetDebts::from_debt_edges(
            2,
            vec![
                DebtEdge::new(0, 1, Cents::new(40)),
                DebtEdge::new(1, 0, Cents::new(40)),
            ],
        )
        .unwrap();
        assert!(net.is_empty());
        assert_eq!(net.total().unwrap(), Cents::ZERO);
    }

    #[test]
    fn test_net_debts_reject_negative_amount() {
        let result =
            NetDebts::from_debt_edges(2, vec![DebtEdge::new(0, 1, Cents::new(-5))]);
        assert!(matches!(result, Err(DebtError::InvalidCapacity { .. })));
    }

    #[test]
    fn test_net_debts_is_idempotent() {
        let ids = people(3);
        let index = PersonIndex::new(&ids);
        let bills = vec![
            Bill::new("Fuel", Cents::new(6_000), ids[0], ids.clone()).unwrap(),
            Bill::new("Tolls", Cents::new(1_500), ids[1], vec![ids[0], ids[2]]).unwrap(),
        ];
        let aggregator = DebtAggregator::new(&index);
        assert_eq!(
            aggregator.net_debts(&bills).unwrap(),
            aggregator.net_debts(&bills).unwrap()
        );
    }

    #[test]
    fn test_to_flow_graph() {
        let net = NetDebts::from_debt_edges(
            3,
            vec![
                DebtEdge::new(0, 1, Cents::new(10)),
                DebtEdge::new(2, 1, Cents::new(20)),
            ],
        )
        .unwrap();
        let graph = net.to_flow_graph().unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.forward_edges().count(), 2);
    }
}
