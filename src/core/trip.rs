use crate::core::bill::Bill;
use crate::core::ledger::Ledger;
use crate::core::money::Cents;
use crate::core::person::{Person, PersonId};
use crate::error::DebtError;
use crate::optimization::simplifier::{simplify, SimplificationResult};
use serde::{Deserialize, Deserializer, Serialize};

/// The people of a trip and the bills they paid for each other.
///
/// This is the snapshot handed to the simplifier. Bills may only reference
/// members of the trip.
///
/// # Examples
///
/// ```
/// use debt_simplifier::prelude::*;
///
/// let mut trip = Trip::new("Lisbon");
/// let alice = trip.add_person("Alice");
/// let bob = trip.add_person("Bob");
/// trip.add_bill(Bill::new("Dinner", Cents::new(15_000), alice, vec![alice, bob]).unwrap())
///     .unwrap();
///
/// let result = trip.simplify().unwrap();
/// assert_eq!(result.transactions().len(), 1);
/// assert_eq!(result.transactions()[0].amount(), Cents::new(7_500));
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trip {
    name: String,
    people: Vec<Person>,
    bills: Vec<Bill>,
}

impl Trip {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            people: Vec::new(),
            bills: Vec::new(),
        }
    }

    /// Add a member and return their identifier.
    pub fn add_person(&mut self, name: impl Into<String>) -> PersonId {
        let person = Person::new(name);
        let id = person.id();
        self.people.push(person);
        id
    }

    /// Add an existing person; a person already on the trip is ignored.
    pub fn insert_person(&mut self, person: Person) {
        if self.person(&person.id()).is_none() {
            self.people.push(person);
        }
    }

    /// Add a bill after checking that the payer and every involver belong to the trip.
    pub fn add_bill(&mut self, bill: Bill) -> Result<(), DebtError> {
        let payer = bill.payer();
        for id in std::iter::once(&payer).chain(bill.involvers()) {
            if self.person(id).is_none() {
                return Err(DebtError::UnknownPerson(*id));
            }
        }
        self.bills.push(bill);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        self.people.iter().find(|p| p.id() == *id)
    }

    pub fn person_ids(&self) -> Vec<PersonId> {
        self.people.iter().map(Person::id).collect()
    }

    /// Total of all bill amounts.
    pub fn total_spent(&self) -> Result<Cents, DebtError> {
        Cents::checked_sum(self.bills.iter().map(Bill::amount)).ok_or(DebtError::Overflow)
    }

    /// Net position of every member, computed directly from the bills.
    pub fn ledger(&self) -> Result<Ledger, DebtError> {
        Ledger::from_bills(&self.bills)
    }

    /// Compute the simplified set of payments that settles this trip.
    pub fn simplify(&self) -> Result<SimplificationResult, DebtError> {
        simplify(&self.person_ids(), &self.bills)
    }
}

/// Wire form of a [`Trip`]; members and bills are re-added one by one so
/// the usual membership checks apply.
#[derive(Deserialize)]
struct TripRecord {
    name: String,
    people: Vec<Person>,
    bills: Vec<Bill>,
}

impl<'de> Deserialize<'de> for Trip {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = TripRecord::deserialize(deserializer)?;
        let mut trip = Trip::new(record.name);
        for person in record.people {
            trip.insert_person(person);
        }
        for bill in record.bills {
            trip.add_bill(bill).map_err(serde::de::Error::custom)?;
        }
        Ok(trip)
    }
}
