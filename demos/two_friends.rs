//! Two friends, one dinner.
//!
//! The smallest possible trip: one bill split evenly gives one payment.

use debt_simplifier::prelude::*;
use rust_decimal_macros::dec;

fn main() -> Result<(), DebtError> {
    println!("╔══════════════════════════════════════════╗");
    println!("║  debt-simplifier: Two Friends Example    ║");
    println!("╚══════════════════════════════════════════╝\n");

    let mut trip = Trip::new("Dinner out");
    let alice = trip.add_person("Alice");
    let bob = trip.add_person("Bob");

    let amount = Cents::from_major(dec!(150.00))?;
    trip.add_bill(Bill::new("Dinner", amount, alice, vec![alice, bob])?)?;
    println!("Alice paid {} for dinner shared with Bob.\n", amount);

    let result = trip.simplify()?;
    for tx in result.transactions() {
        let from = trip.person(&tx.from()).map(Person::name).unwrap_or("?");
        let to = trip.person(&tx.to()).map(Person::name).unwrap_or("?");
        println!("  {} pays {} {}", from, to, tx.amount());
    }

    Ok(())
}
