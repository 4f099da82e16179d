use crate::core::money::Cents;
use crate::core::person::PersonId;
use crate::error::DebtError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A bill paid by one person on behalf of a group of involvers.
///
/// The amount is split evenly between the involvers; every involver other
/// than the payer ends up owing the payer one share. The payer may or may not
/// be an involver.
///
/// # Examples
///
/// ```
/// use debt_simplifier::core::bill::Bill;
/// use debt_simplifier::core::money::Cents;
/// use debt_simplifier::core::person::PersonId;
///
/// let alice = PersonId::random();
/// let bob = PersonId::random();
/// let dinner = Bill::new("Dinner", Cents::new(15_000), alice, vec![alice, bob]).unwrap();
///
/// assert_eq!(dinner.share().unwrap(), Cents::new(7_500));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Bill {
    id: Uuid,
    title: String,
    /// Total paid. Must be positive.
    amount: Cents,
    payer: PersonId,
    /// Distinct involvers in the order they were given. Must be non-empty.
    involvers: Vec<PersonId>,
    date: DateTime<Utc>,
}

impl Bill {
    /// Create a bill dated now.
    ///
    /// Duplicate involvers are collapsed, keeping the first occurrence.
    pub fn new(
        title: impl Into<String>,
        amount: Cents,
        payer: PersonId,
        involvers: Vec<PersonId>,
    ) -> Result<Self, DebtError> {
        Self::with_id(Uuid::new_v4(), title, amount, payer, involvers)
    }

    /// Create a bill with a specific ID (useful for testing / determinism).
    pub fn with_id(
        id: Uuid,
        title: impl Into<String>,
        amount: Cents,
        payer: PersonId,
        involvers: Vec<PersonId>,
    ) -> Result<Self, DebtError> {
        if !amount.is_positive() {
            return Err(DebtError::NonPositiveAmount { amount });
        }
        let mut distinct: Vec<PersonId> = Vec::with_capacity(involvers.len());
        for person in involvers {
            if !distinct.contains(&person) {
                distinct.push(person);
            }
        }
        if distinct.is_empty() {
            return Err(DebtError::EmptyInvolverSet { bill: id });
        }
        Ok(Self {
            id,
            title: title.into(),
            amount,
            payer,
            involvers: distinct,
            date: Utc::now(),
        })
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Per-involver share, truncated to whole cents.
    pub fn share(&self) -> Result<Cents, DebtError> {
        self.amount
            .split_even(self.involvers.len())
            .map(|(share, _)| share)
            .ok_or(DebtError::EmptyInvolverSet { bill: self.id })
    }

    /// Cents lost to truncation when splitting this bill.
    pub fn rounding_loss(&self) -> Result<Cents, DebtError> {
        self.amount
            .split_even(self.involvers.len())
            .map(|(_, remainder)| remainder)
            .ok_or(DebtError::EmptyInvolverSet { bill: self.id })
    }

    /// Involvers that owe the payer a share.
    pub fn debtors(&self) -> impl Iterator<Item = &PersonId> + '_ {
        self.involvers.iter().filter(move |p| **p != self.payer)
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn amount(&self) -> Cents {
        self.amount
    }

    pub fn payer(&self) -> PersonId {
        self.payer
    }

    pub fn involvers(&self) -> &[PersonId] {
        &self.involvers
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// Wire form of a [`Bill`], checked by [`Bill::with_id`] before use.
#[derive(Deserialize)]
struct BillRecord {
    id: Uuid,
    title: String,
    amount: Cents,
    payer: PersonId,
    involvers: Vec<PersonId>,
    date: DateTime<Utc>,
}

impl<'de> Deserialize<'de> for Bill {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = BillRecord::deserialize(deserializer)?;
        Bill::with_id(
            record.id,
            record.title,
            record.amount,
            record.payer,
            record.involvers,
        )
        .map(|bill| bill.with_date(record.date))
        .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(n: u128) -> PersonId {
        PersonId::from_uuid(Uuid::from_u128(n))
    }

    #[test]
    fn test_bill_creation() {
        let bill = Bill::new("Taxi", Cents::new(3_000), person(1), vec![person(1), person(2)])
            .unwrap();
        assert_eq!(bill.title(), "Taxi");
        assert_eq!(bill.amount(), Cents::new(3_000));
        assert_eq!(bill.payer(), person(1));
        assert_eq!(bill.involvers().len(), 2);
    }

    #[test]
    fn test_bill_zero_amount() {
        let result = Bill::new("Free", Cents::ZERO, person(1), vec![person(2)]);
        assert_eq!(
            result.unwrap_err(),
            DebtError::NonPositiveAmount { amount: Cents::ZERO }
        );
    }

    #[test]
    fn test_bill_empty_involvers() {
        let id = Uuid::from_u128(99);
        let result = Bill::with_id(id, "Nobody", Cents::new(100), person(1), vec![]);
        assert_eq!(result.unwrap_err(), DebtError::EmptyInvolverSet { bill: id });
    }

    #[test]
    fn test_bill_duplicate_involvers_collapse() {
        let bill = Bill::new(
            "Snacks",
            Cents::new(900),
            person(1),
            vec![person(2), person(3), person(2)],
        )
        .unwrap();
        assert_eq!(bill.involvers(), &[person(2), person(3)]);
        assert_eq!(bill.share().unwrap(), Cents::new(450));
    }

    #[test]
    fn test_bill_share_and_rounding_loss() {
        let bill = Bill::new(
            "Museum",
            Cents::new(10_000),
            person(1),
            vec![person(1), person(2), person(3)],
        )
        .unwrap();
        assert_eq!(bill.share().unwrap(), Cents::new(3_333));
        assert_eq!(bill.rounding_loss().unwrap(), Cents::new(1));
    }

    fn bill_json(amount: i64, involvers: &[PersonId]) -> String {
        let involvers: Vec<String> = involvers.iter().map(|p| format!("\"{}\"", p)).collect();
        format!(
            r#"{{"id":"{}","title":"Boat","amount":{},"payer":"{}","involvers":[{}],"date":"2024-05-01T12:00:00Z"}}"#,
            Uuid::from_u128(500),
            amount,
            person(1),
            involvers.join(",")
        )
    }

    #[test]
    fn test_bill_deserialize_collapses_duplicate_involvers() {
        let json = bill_json(900, &[person(2), person(3), person(2)]);
        let bill: Bill = serde_json::from_str(&json).unwrap();
        assert_eq!(bill.involvers(), &[person(2), person(3)]);
        assert_eq!(bill.share().unwrap(), Cents::new(450));
        assert_eq!(bill.id(), Uuid::from_u128(500));
        assert_eq!(bill.date().to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn test_bill_deserialize_rejects_invalid() {
        let empty = serde_json::from_str::<Bill>(&bill_json(900, &[]));
        assert!(empty.unwrap_err().to_string().contains("has no involvers"));

        let free = serde_json::from_str::<Bill>(&bill_json(0, &[person(2)]));
        assert!(free.unwrap_err().to_string().contains("must be positive"));
    }

    #[test]
    fn test_bill_serialize_then_deserialize() {
        let bill = Bill::new("Taxi", Cents::new(3_000), person(1), vec![person(1), person(2)])
            .unwrap();
        let restored: Bill = serde_json::from_str(&serde_json::to_string(&bill).unwrap()).unwrap();
        assert_eq!(restored.id(), bill.id());
        assert_eq!(restored.involvers(), bill.involvers());
        assert_eq!(restored.amount(), bill.amount());
    }

    #[test]
    fn test_bill_debtors_skip_payer() {
        let bill = Bill::new("Hotel", Cents::new(600), person(1), vec![person(1), person(2)])
            .unwrap();
        let debtors: Vec<_> = bill.debtors().copied().collect();
        assert_eq!(debtors, vec![person(2)]);
    }
}
