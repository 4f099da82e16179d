//! A week away with four friends.
//!
//! Overlapping bills build up a tangle of debts, including a cycle. The
//! simplifier nets it down to a handful of payments and the ledger confirms
//! that they settle everyone.

use debt_simplifier::prelude::*;
use rust_decimal_macros::dec;

fn name(trip: &Trip, id: PersonId) -> &str {
    trip.person(&id).map(Person::name).unwrap_or("?")
}

fn main() -> Result<(), DebtError> {
    env_logger::init();

    println!("╔══════════════════════════════════════════╗");
    println!("║  debt-simplifier: Group Trip Example     ║");
    println!("╚══════════════════════════════════════════╝\n");

    let mut trip = Trip::new("Lisbon week");
    let ana = trip.add_person("Ana");
    let ben = trip.add_person("Ben");
    let caio = trip.add_person("Caio");
    let dani = trip.add_person("Dani");
    let everyone = vec![ana, ben, caio, dani];

    let bills = [
        ("Apartment", dec!(820.00), ana, everyone.clone()),
        ("Groceries", dec!(96.40), ben, everyone.clone()),
        ("Tram passes", dec!(45.00), caio, vec![ana, ben, caio]),
        ("Fado night", dec!(120.00), dani, vec![ben, caio, dani]),
        ("Pastéis", dec!(18.30), ana, vec![ana, dani]),
        ("Sintra tickets", dec!(100.00), caio, vec![ana, caio]),
    ];

    println!("━━━ Bills ━━━\n");
    for (title, amount, payer, involvers) in bills {
        let bill = Bill::new(title, Cents::from_major(amount)?, payer, involvers)?;
        println!(
            "  {:<16} {:>10}  paid by {:<5} split {} ways",
            bill.title(),
            bill.amount(),
            name(&trip, payer),
            bill.involvers().len()
        );
        trip.add_bill(bill)?;
    }

    let mut ledger = trip.ledger()?;
    println!("\n━━━ Balances ━━━\n");
    for person in trip.people() {
        println!("  {:<5} {:>10}", person.name(), ledger.position(&person.id()));
    }

    let result = trip.simplify()?;
    println!("\n━━━ Payments ━━━\n");
    println!("  Gross debt:    {}", result.gross_debt());
    println!("  Pairwise net:  {}", result.net_debt());
    println!("  Settled total: {}\n", result.settled_total());
    for tx in result.transactions() {
        println!(
            "  {:<5} → {:<5} {:>10}",
            name(&trip, tx.from()),
            name(&trip, tx.to()),
            tx.amount()
        );
        ledger.apply_transaction(tx)?;
    }

    println!(
        "\nEveryone settled: {}",
        if ledger.is_settled() { "yes" } else { "no" }
    );
    Ok(())
}
