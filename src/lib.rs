//! # debt-simplifier
//!
//! Debt simplification for group expenses.
//!
//! Given the people on a trip and the bills they paid for one another, this
//! engine computes a short list of payments that settles everyone. Money is
//! kept in integer cents throughout; the graph work uses Dinic's max-flow
//! algorithm.
//!
//! ## Architecture
//!
//! - **core**: Money, people, bills, trips and the balance ledger
//! - **graph**: Flow network arena and the Dinic max-flow solver
//! - **optimization**: Bill aggregation into net debts and the simplifier
//! - **simulation**: Random trip generation for stress tests and benchmarks

pub mod core;
pub mod error;
pub mod graph;
pub mod optimization;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::bill::Bill;
    pub use crate::core::ledger::Ledger;
    pub use crate::core::money::Cents;
    pub use crate::core::person::{Person, PersonId};
    pub use crate::core::trip::Trip;
    pub use crate::error::DebtError;
    pub use crate::graph::dinic::{Dinic, MaxFlowSolver};
    pub use crate::graph::flow_graph::FlowGraph;
    pub use crate::optimization::simplifier::{
        simplify, DebtSimplifier, SimplificationResult, SimplifiedTransaction,
    };
}
