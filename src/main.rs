//! debt-simplifier CLI
//!
//! Settle a group trip from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Simplify the debts of a trip described in JSON
//! debt-simplifier simplify --input trip.json
//!
//! # Output as JSON
//! debt-simplifier simplify --input trip.json --format json
//!
//! # Show who is owed and who owes
//! debt-simplifier balances --input trip.json
//!
//! # Generate a random trip for testing
//! debt-simplifier generate --people 8 --bills 40
//! ```
//!
//! Set `RUST_LOG=debug` to trace the simplification passes.

use debt_simplifier::core::bill::Bill;
use debt_simplifier::core::money::Cents;
use debt_simplifier::core::person::PersonId;
use debt_simplifier::core::trip::Trip;
use debt_simplifier::simulation::random_trip::{generate_random_trip, TripConfig};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"debt-simplifier: settle group expenses with as few payments as practical

USAGE:
    debt-simplifier <COMMAND> [OPTIONS]

COMMANDS:
    simplify    Compute the payments that settle a trip
    balances    Show each person's net position
    generate    Generate a random trip (for testing)
    help        Show this message

OPTIONS (simplify, balances):
    --input <FILE>      Path to JSON trip file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --people <N>        Number of people (default: 6)
    --bills <N>         Number of bills (default: 20)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    debt-simplifier simplify --input trip.json
    debt-simplifier balances --input trip.json --format json
    debt-simplifier generate --people 10 --bills 50 --output trip.json"#
    );
}

/// JSON schema for an input trip.
#[derive(serde::Deserialize, serde::Serialize)]
struct TripFile {
    #[serde(default)]
    name: String,
    people: Vec<String>,
    bills: Vec<BillInput>,
}

#[derive(serde::Deserialize, serde::Serialize)]
struct BillInput {
    title: String,
    payer: String,
    involvers: Vec<String>,
    amount: String,
}

/// JSON output schema for a simplified plan.
#[derive(serde::Serialize)]
struct PlanOutput {
    gross_debt: String,
    net_debt: String,
    settled_total: String,
    payments: Vec<PaymentOutput>,
}

#[derive(serde::Serialize)]
struct PaymentOutput {
    from: String,
    to: String,
    amount: String,
}

#[derive(serde::Serialize)]
struct BalanceOutput {
    person: String,
    net_position: String,
    status: String,
}

struct LoadedTrip {
    trip: Trip,
    names: HashMap<PersonId, String>,
}

impl LoadedTrip {
    fn name(&self, id: &PersonId) -> String {
        self.names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn load_trip(path: &str) -> LoadedTrip {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("Error reading file '{}': {}", path, e)));

    let file: TripFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "people": ["Alice", "Bob"],
  "bills": [
    {{ "title": "Dinner", "payer": "Alice", "involvers": ["Alice", "Bob"], "amount": "150.00" }}
  ]
}}"#
        );
        process::exit(1);
    });

    let mut trip = Trip::new(file.name);
    let mut by_name: HashMap<String, PersonId> = HashMap::new();
    let mut names: HashMap<PersonId, String> = HashMap::new();
    for name in file.people {
        if by_name.contains_key(&name) {
            continue;
        }
        let id = trip.add_person(name.clone());
        by_name.insert(name.clone(), id);
        names.insert(id, name);
    }

    let lookup = |name: &str| {
        by_name
            .get(name)
            .copied()
            .unwrap_or_else(|| fail(format!("Unknown person '{}'", name)))
    };

    for bill in file.bills {
        let amount: Decimal = bill
            .amount
            .parse()
            .unwrap_or_else(|e| fail(format!("Invalid amount '{}': {}", bill.amount, e)));
        let amount = Cents::from_major(amount).unwrap_or_else(|e| fail(e));
        let payer = lookup(&bill.payer);
        let involvers = bill.involvers.iter().map(|n| lookup(n)).collect();
        let parsed = Bill::new(bill.title.clone(), amount, payer, involvers)
            .unwrap_or_else(|e| fail(format!("Invalid bill '{}': {}", bill.title, e)));
        trip.add_bill(parsed).unwrap_or_else(|e| fail(e));
    }

    LoadedTrip { trip, names }
}

fn parse_input_and_format(args: &[String]) -> (String, String) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--input requires a file path")),
                );
            }
            "--format" => {
                i += 1;
                format = args
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| fail("--format requires 'text' or 'json'"));
            }
            _ => fail(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| fail("Error: --input <FILE> is required"));
    (path, format)
}

fn cmd_simplify(args: &[String]) {
    let (path, format) = parse_input_and_format(args);
    let loaded = load_trip(&path);
    let result = loaded.trip.simplify().unwrap_or_else(|e| fail(e));

    if format == "json" {
        let output = PlanOutput {
            gross_debt: result.gross_debt().to_string(),
            net_debt: result.net_debt().to_string(),
            settled_total: result.settled_total().to_string(),
            payments: result
                .transactions()
                .iter()
                .map(|tx| PaymentOutput {
                    from: loaded.name(&tx.from()),
                    to: loaded.name(&tx.to()),
                    amount: tx.amount().to_string(),
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&output).unwrap_or_else(|e| fail(e));
        println!("{}", json);
    } else {
        println!("=== {} ===", loaded.trip.name());
        println!("Gross Debt:     {}", result.gross_debt());
        println!("Pairwise Net:   {}", result.net_debt());
        println!("Settled Total:  {}", result.settled_total());
        if result.is_empty() {
            println!("\nEveryone is settled up.");
        } else {
            println!("\nPayments:");
            for tx in result.transactions() {
                println!(
                    "  {} pays {} {}",
                    loaded.name(&tx.from()),
                    loaded.name(&tx.to()),
                    tx.amount()
                );
            }
        }
    }
}

fn cmd_balances(args: &[String]) {
    let (path, format) = parse_input_and_format(args);
    let loaded = load_trip(&path);
    let ledger = loaded.trip.ledger().unwrap_or_else(|e| fail(e));

    let mut balances: Vec<BalanceOutput> = loaded
        .trip
        .people()
        .iter()
        .map(|person| {
            let position = ledger.position(&person.id());
            let status = if position.is_positive() {
                "OWED"
            } else if position.is_negative() {
                "OWES"
            } else {
                "SETTLED"
            };
            BalanceOutput {
                person: person.name().to_string(),
                net_position: position.to_string(),
                status: status.to_string(),
            }
        })
        .collect();
    balances.sort_by(|a, b| a.person.cmp(&b.person));

    if format == "json" {
        let json = serde_json::to_string_pretty(&balances).unwrap_or_else(|e| fail(e));
        println!("{}", json);
    } else {
        println!("=== Balances ===");
        for b in &balances {
            println!("  {:<20} {:>12}  {}", b.person, b.net_position, b.status);
        }
        println!(
            "\nTo settle: {}",
            ledger.total_net_settlement().unwrap_or_else(|e| fail(e))
        );
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = TripConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--people" => {
                i += 1;
                config.person_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--people requires a number"));
            }
            "--bills" => {
                i += 1;
                config.bill_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--bills requires a number"));
            }
            "--output" => {
                i += 1;
                output_path = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--output requires a file path")),
                );
            }
            _ => fail(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }
    config.max_involvers = config.person_count;

    let trip = generate_random_trip(&config).unwrap_or_else(|e| fail(e));
    let name_of = |id: PersonId| {
        trip.person(&id)
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| id.to_string())
    };

    let output = TripFile {
        name: trip.name().to_string(),
        people: trip.people().iter().map(|p| p.name().to_string()).collect(),
        bills: trip
            .bills()
            .iter()
            .map(|bill| BillInput {
                title: bill.title().to_string(),
                payer: name_of(bill.payer()),
                involvers: bill.involvers().iter().map(|id| name_of(*id)).collect(),
                amount: bill.amount().to_string(),
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&output).unwrap_or_else(|e| fail(e));

    if let Some(path) = output_path {
        fs::write(&path, &json)
            .unwrap_or_else(|e| fail(format!("Error writing to '{}': {}", path, e)));
        eprintln!(
            "Generated {} bills across {} people → {}",
            trip.bills().len(),
            trip.people().len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "simplify" => cmd_simplify(rest),
        "balances" => cmd_balances(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
