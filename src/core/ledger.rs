use crate::core::bill::Bill;
use crate::core::money::Cents;
use crate::core::person::PersonId;
use crate::error::DebtError;
use crate::optimization::simplifier::SimplifiedTransaction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tracks the net position of each person across a trip.
///
/// A positive balance means the person is owed (net creditor).
/// A negative balance means the person owes (net debtor).
///
/// Built straight from the bills, the ledger is the reference the simplified
/// transactions are checked against: applying every transaction must bring
/// each position back to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    positions: HashMap<PersonId, Cents>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Net positions implied by a list of bills.
    ///
    /// Each non-payer involver loses one truncated share and the payer gains
    /// that share, so any truncation remainder stays with the payer.
    pub fn from_bills(bills: &[Bill]) -> Result<Self, DebtError> {
        let mut ledger = Self::new();
        for bill in bills {
            let share = bill.share()?;
            for debtor in bill.debtors() {
                ledger.apply_debt(*debtor, bill.payer(), share)?;
            }
        }
        Ok(ledger)
    }

    /// Record that `debtor` owes `creditor` the given amount.
    pub fn apply_debt(
        &mut self,
        debtor: PersonId,
        creditor: PersonId,
        amount: Cents,
    ) -> Result<(), DebtError> {
        self.adjust(debtor, -amount)?;
        self.adjust(creditor, amount)
    }

    /// Apply a settling payment: the payer's debt shrinks, the payee's claim shrinks.
    pub fn apply_transaction(&mut self, transaction: &SimplifiedTransaction) -> Result<(), DebtError> {
        self.apply_debt(transaction.to(), transaction.from(), transaction.amount())
    }

    fn adjust(&mut self, person: PersonId, delta: Cents) -> Result<(), DebtError> {
        let position = self.positions.entry(person).or_insert(Cents::ZERO);
        *position = position.checked_add(delta).ok_or(DebtError::Overflow)?;
        Ok(())
    }

    /// Net position of a person; zero for people the ledger has not seen.
    pub fn position(&self, person: &PersonId) -> Cents {
        self.positions.get(person).copied().unwrap_or(Cents::ZERO)
    }

    pub fn all_positions(&self) -> &HashMap<PersonId, Cents> {
        &self.positions
    }

    /// Sum of all positions is zero.
    ///
    /// Summed in `i128`, so the check holds even when the running total
    /// leaves the `i64` range.
    pub fn is_balanced(&self) -> bool {
        self.positions
            .values()
            .map(|v| i128::from(v.value()))
            .sum::<i128>()
            == 0
    }

    /// Every position is zero: nobody owes anybody anything.
    pub fn is_settled(&self) -> bool {
        self.positions.values().all(|v| *v == Cents::ZERO)
    }

    /// Total amount that must change hands to settle (sum of positive positions).
    pub fn total_net_settlement(&self) -> Result<Cents, DebtError> {
        Cents::checked_sum(self.positions.values().copied().filter(|v| v.is_positive()))
            .ok_or(DebtError::Overflow)
    }
}
