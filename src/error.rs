use crate::core::money::Cents;
use crate::core::person::PersonId;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the debt simplification engine.
///
/// Every failure is deterministic: the same input always fails the same way,
/// so callers should propagate rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebtError {
    #[error("edge {from} -> {to} has negative capacity {capacity}")]
    InvalidCapacity {
        from: usize,
        to: usize,
        capacity: Cents,
    },
    #[error("bill {bill} has no involvers")]
    EmptyInvolverSet { bill: Uuid },
    #[error("bill amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Cents },
    #[error("person {0} is not part of this trip")]
    UnknownPerson(PersonId),
    #[error("node {node} is out of range for a graph of {node_count} nodes")]
    NodeOutOfRange { node: usize, node_count: usize },
    #[error("source and sink must be set before computing a max flow")]
    TerminalsNotSet,
    #[error("amount {0} cannot be represented in minor units")]
    AmountOutOfRange(Decimal),
    #[error("arithmetic overflow while accumulating amounts")]
    Overflow,
}
