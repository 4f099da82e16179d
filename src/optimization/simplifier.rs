use crate::core::bill::Bill;
use crate::core::money::Cents;
use crate::core::person::PersonId;
use crate::error::DebtError;
use crate::graph::dinic::{Dinic, MaxFlowSolver};
use crate::graph::flow_graph::{EdgeId, FlowGraph, NodeId};
use crate::optimization::aggregator::{DebtAggregator, DebtEdge, NetDebts, PersonIndex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One settling payment: `from` pays `to` the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimplifiedTransaction {
    from: PersonId,
    to: PersonId,
    amount: Cents,
}

impl SimplifiedTransaction {
    pub fn new(from: PersonId, to: PersonId, amount: Cents) -> Self {
        Self { from, to, amount }
    }

    pub fn from(&self) -> PersonId {
        self.from
    }

    pub fn to(&self) -> PersonId {
        self.to
    }

    pub fn amount(&self) -> Cents {
        self.amount
    }

    /// Amount in major currency units, for display.
    pub fn amount_major(&self) -> Decimal {
        self.amount.to_major()
    }
}

/// Outcome of simplifying a trip's debts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplificationResult {
    transactions: Vec<SimplifiedTransaction>,
    /// Sum of every bill-derived debt before any netting.
    gross_debt: Cents,
    /// Sum of pairwise debts after opposing debts cancel.
    net_debt: Cents,
    /// Sum of the payments in `transactions`.
    settled_total: Cents,
}

impl SimplificationResult {
    pub fn transactions(&self) -> &[SimplifiedTransaction] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<SimplifiedTransaction> {
        self.transactions
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn gross_debt(&self) -> Cents {
        self.gross_debt
    }

    pub fn net_debt(&self) -> Cents {
        self.net_debt
    }

    /// Total money that changes hands under the simplified plan.
    pub fn settled_total(&self) -> Cents {
        self.settled_total
    }
}

impl std::fmt::Display for SimplificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Simplified Debts ===")?;
        writeln!(f, "Gross Debt:     {}", self.gross_debt)?;
        writeln!(f, "Pairwise Net:   {}", self.net_debt)?;
        writeln!(f, "Settled Total:  {}", self.settled_total())?;
        writeln!(f, "Transactions:   {}", self.transactions.len())?;
        for tx in &self.transactions {
            writeln!(f, "  {} -> {}: {}", tx.from, tx.to, tx.amount)?;
        }
        Ok(())
    }
}

/// Reduces a set of net debts to a short list of settling payments.
///
/// A run has two passes over a flow graph built from the net debts:
///
/// 1. **Circulation removal.** For each debt `u -> v`, as much flow as the
///    debt allows is pushed from `v` back to `u`; together with the debt it
///    forms a cycle of obligations that cancels without anyone paying. After
///    this pass the graph is acyclic.
/// 2. **Extraction.** For each remaining debt `u -> v` not yet visited, the
///    max flow from `u` to `v` across the whole graph becomes a single
///    payment `u -> v`, and that flow is removed from the graph.
///
/// After every max-flow run the graph is rebuilt from the remaining
/// capacities. Both passes preserve every person's net balance.
///
/// Visited pairs belong to the instance and are reset at the start of each
/// run; `&mut self` keeps one instance from being used re-entrantly.
#[derive(Debug, Default)]
pub struct DebtSimplifier<S = Dinic> {
    solver: S,
    visited_pairs: HashSet<(NodeId, NodeId)>,
}

impl DebtSimplifier<Dinic> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: MaxFlowSolver> DebtSimplifier<S> {
    pub fn with_solver(solver: S) -> Self {
        Self {
            solver,
            visited_pairs: HashSet::new(),
        }
    }

    /// Simplify net debts into payments between node indices.
    pub fn simplify_net(&mut self, net: &NetDebts) -> Result<Vec<DebtEdge>, DebtError> {
        let graph = net.to_flow_graph()?;
        let graph = self.cancel_circulations(graph)?;
        self.extract_payments(graph)
    }

    /// First forward edge, in insertion order, whose pair has not been visited.
    fn next_unvisited(&self, graph: &FlowGraph) -> Option<(EdgeId, NodeId, NodeId)> {
        graph
            .forward_edges()
            .map(|(id, e)| (id, e.from(), e.to()))
            .find(|(_, from, to)| !self.visited_pairs.contains(&(*from, *to)))
    }

    fn cancel_circulations(&mut self, mut graph: FlowGraph) -> Result<FlowGraph, DebtError> {
        self.visited_pairs.clear();
        while let Some((id, from, to)) = self.next_unvisited(&graph) {
            self.visited_pairs.insert((from, to));
            let debt = graph.edge(id).remaining_capacity();
            let returned = self.solver.solve_bounded(&mut graph, to, from, debt)?;
            if returned.is_positive() {
                graph.augment(id, returned);
                log::debug!("cancelled circular debt of {returned} through {from} -> {to}");
            }
            graph = graph.residual_graph();
        }
        Ok(graph)
    }

    fn extract_payments(&mut self, mut graph: FlowGraph) -> Result<Vec<DebtEdge>, DebtError> {
        self.visited_pairs.clear();
        let mut payments = Vec::new();
        while let Some((_, from, to)) = self.next_unvisited(&graph) {
            graph.set_source(from)?;
            graph.set_sink(to)?;
            let flow = graph.max_flow_with(&mut self.solver)?;
            if flow.is_positive() {
                log::debug!("payment {from} -> {to}: {flow}");
                payments.push(DebtEdge::new(from, to, flow));
            }
            self.visited_pairs.insert((from, to));
            graph = graph.residual_graph();
        }
        Ok(payments)
    }
}

/// Compute the simplified payments that settle a trip.
///
/// `people` lists the trip members; every bill payer and involver must be
/// among them. Returns an empty plan when nothing is owed.
///
/// # Examples
///
/// ```
/// use debt_simplifier::prelude::*;
///
/// let a = PersonId::random();
/// let b = PersonId::random();
/// let bill = Bill::new("Dinner", Cents::new(15_000), a, vec![a, b]).unwrap();
///
/// let result = simplify(&[a, b], &[bill]).unwrap();
/// assert_eq!(result.transactions(), &[SimplifiedTransaction::new(b, a, Cents::new(7_500))]);
/// ```
pub fn simplify(people: &[PersonId], bills: &[Bill]) -> Result<SimplificationResult, DebtError> {
    let index = PersonIndex::new(people);
    let aggregator = DebtAggregator::new(&index);
    let bill_edges = aggregator.bill_edges(bills)?;
    let gross_debt =
        Cents::checked_sum(bill_edges.iter().map(|e| e.amount)).ok_or(DebtError::Overflow)?;
    let net = NetDebts::from_debt_edges(index.len(), bill_edges)?;
    let net_debt = net.total()?;

    let payments = DebtSimplifier::new().simplify_net(&net)?;
    let transactions = payments
        .into_iter()
        .filter(|p| p.amount.is_positive())
        .map(|p| {
            let from = index.person(p.from).copied();
            let to = index.person(p.to).copied();
            from.zip(to)
                .map(|(from, to)| SimplifiedTransaction::new(from, to, p.amount))
                .ok_or(DebtError::NodeOutOfRange {
                    node: p.from.max(p.to),
                    node_count: index.len(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let settled_total = Cents::checked_sum(transactions.iter().map(SimplifiedTransaction::amount))
        .ok_or(DebtError::Overflow)?;

    log::info!(
        "simplified {} bills among {} people into {} payments (gross {}, net {})",
        bills.len(),
        index.len(),
        transactions.len(),
        gross_debt,
        net_debt
    );

    Ok(SimplificationResult {
        transactions,
        gross_debt,
        net_debt,
        settled_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(node_count: usize, edges: &[(usize, usize, i64)]) -> NetDebts {
        NetDebts::from_debt_edges(
            node_count,
            edges
                .iter()
                .map(|&(from, to, amount)| DebtEdge::new(from, to, Cents::new(amount))),
        )
        .unwrap()
    }

    fn balances(node_count: usize, edges: &[DebtEdge]) -> Vec<i64> {
        let mut balance = vec![0i64; node_count];
        for e in edges {
            balance[e.from] -= e.amount.value();
            balance[e.to] += e.amount.value();
        }
        balance
    }

    #[test]
    fn test_single_debt_passes_through() {
        let payments = DebtSimplifier::new()
            .simplify_net(&net(2, &[(1, 0, 7_500)]))
            .unwrap();
        assert_eq!(payments, vec![DebtEdge::new(1, 0, Cents::new(7_500))]);
    }

    #[test]
    fn test_equal_cycle_cancels() {
        let payments = DebtSimplifier::new()
            .simplify_net(&net(3, &[(0, 1, 1_000), (1, 2, 1_000), (2, 0, 1_000)]))
            .unwrap();
        assert!(payments.is_empty());
    }

    #[test]
    fn test_unequal_cycle_leaves_remainder() {
        // A->B 30, B->C 20, C->A 10: the 10 circulating cancels.
        let debts = net(3, &[(0, 1, 3_000), (1, 2, 2_000), (2, 0, 1_000)]);
        let payments = DebtSimplifier::new().simplify_net(&debts).unwrap();
        assert_eq!(balances(3, &payments), balances(3, &debts.edges()));
        assert_eq!(
            Cents::checked_sum(payments.iter().map(|p| p.amount)),
            Some(Cents::new(3_000))
        );
    }

    #[test]
    fn test_chain_collapses_into_one_payment() {
        // 0 owes 2 and 2 owes 1 the same amount, so 0 pays 1 directly.
        let debts = net(3, &[(0, 2, 500), (2, 1, 500), (0, 1, 100)]);
        let payments = DebtSimplifier::new().simplify_net(&debts).unwrap();
        assert_eq!(payments, vec![DebtEdge::new(0, 1, Cents::new(600))]);
    }

    #[test]
    fn test_repository_example_balances() {
        let debts = net(
            4,
            &[
                (0, 1, 90),
                (0, 3, 20),
                (1, 2, 40),
                (1, 3, 20),
                (1, 0, 13),
                (2, 1, 50),
                (2, 0, 28),
                (3, 2, 40),
                (3, 1, 40),
                (3, 0, 13),
            ],
        );
        let payments = DebtSimplifier::new().simplify_net(&debts).unwrap();

        assert_eq!(balances(4, &payments), vec![-56, 107, 2, -53]);
        assert!(payments.len() <= debts.len());
        assert!(payments.iter().all(|p| p.from != p.to && p.amount.is_positive()));
    }

    #[test]
    fn test_disconnected_groups_stay_separate() {
        let payments = DebtSimplifier::new()
            .simplify_net(&net(4, &[(1, 0, 400), (3, 2, 900)]))
            .unwrap();
        assert_eq!(
            payments,
            vec![
                DebtEdge::new(1, 0, Cents::new(400)),
                DebtEdge::new(3, 2, Cents::new(900))
            ]
        );
    }

    #[test]
    fn test_empty_net_debts() {
        let payments = DebtSimplifier::new().simplify_net(&net(3, &[])).unwrap();
        assert!(payments.is_empty());
    }

    #[test]
    fn test_simplifier_instance_is_reusable() {
        let mut simplifier = DebtSimplifier::new();
        let first = simplifier.simplify_net(&net(2, &[(0, 1, 5)])).unwrap();
        let second = simplifier.simplify_net(&net(2, &[(0, 1, 5)])).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_simplify_maps_back_to_people() {
        let a = PersonId::random();
        let b = PersonId::random();
        let bill = Bill::new("Dinner", Cents::new(15_000), a, vec![a, b]).unwrap();

        let result = simplify(&[a, b], &[bill]).unwrap();
        assert_eq!(
            result.transactions(),
            &[SimplifiedTransaction::new(b, a, Cents::new(7_500))]
        );
        assert_eq!(result.gross_debt(), Cents::new(7_500));
        assert_eq!(result.net_debt(), Cents::new(7_500));
        assert_eq!(result.settled_total(), Cents::new(7_500));
        assert_eq!(result.transactions()[0].amount_major().to_string(), "75.00");
    }

    #[test]
    fn test_simplify_no_bills() {
        let result = simplify(&[PersonId::random()], &[]).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.gross_debt(), Cents::ZERO);
    }

    #[test]
    fn test_display_lists_payments() {
        let a = PersonId::random();
        let b = PersonId::random();
        let bill = Bill::new("Dinner", Cents::new(1_000), a, vec![b]).unwrap();
        let text = simplify(&[a, b], &[bill]).unwrap().to_string();
        assert!(text.contains("Transactions:   1"));
        assert!(text.contains(&format!("{} -> {}: 10.00", b, a)));
    }
}
