//! Random trip generation for stress testing and benchmarks.
//!
//! Produces trips with many people and overlapping bills so the simplifier
//! sees realistic, densely connected debt graphs.

use crate::core::bill::Bill;
use crate::core::money::Cents;
use crate::core::trip::Trip;
use crate::error::DebtError;
use rand::seq::SliceRandom;
use rand::Rng;

/// Configuration for generating a random trip.
#[derive(Debug, Clone)]
pub struct TripConfig {
    /// Number of people on the trip.
    pub person_count: usize,
    /// Number of bills to generate.
    pub bill_count: usize,
    /// Upper bound on involvers per bill (capped at `person_count`).
    pub max_involvers: usize,
    /// Minimum bill amount.
    pub min_amount: Cents,
    /// Maximum bill amount.
    pub max_amount: Cents,
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            person_count: 6,
            bill_count: 20,
            max_involvers: 6,
            min_amount: Cents::new(500),
            max_amount: Cents::new(50_000),
        }
    }
}

/// Generate a random trip.
pub fn generate_random_trip(config: &TripConfig) -> Result<Trip, DebtError> {
    generate_random_trip_with(&mut rand::thread_rng(), config)
}

/// Generate a random trip from a caller-supplied RNG (seed it for reproducible runs).
pub fn generate_random_trip_with<R: Rng>(
    rng: &mut R,
    config: &TripConfig,
) -> Result<Trip, DebtError> {
    let mut trip = Trip::new("Random trip");
    let people: Vec<_> = (0..config.person_count)
        .map(|i| trip.add_person(format!("Person {:03}", i + 1)))
        .collect();
    if people.is_empty() {
        return Ok(trip);
    }

    let min_amount = config.min_amount.value().max(1);
    let max_amount = config.max_amount.value().max(min_amount);
    let max_involvers = config.max_involvers.clamp(1, people.len());

    for n in 0..config.bill_count {
        let payer = people[rng.gen_range(0..people.len())];
        let involver_count = rng.gen_range(1..=max_involvers);
        let involvers: Vec<_> = people
            .choose_multiple(rng, involver_count)
            .copied()
            .collect();
        let amount = Cents::new(rng.gen_range(min_amount..=max_amount));

        trip.add_bill(Bill::new(format!("Bill {}", n + 1), amount, payer, involvers)?)?;
    }

    Ok(trip)
}
