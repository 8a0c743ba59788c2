use chrono::{Duration, Utc};
use clap::Parser;
use rand::seq::IndexedRandom;
use rand::{Rng, rngs::ThreadRng};
use serde_json::{Value, json};
use shinsei::service::{ApplicationStatus, Record, SubmissionsPage};
use shinsei::value::group_thousands;
use std::fs;

/// A CLI tool to generate submission rows for the Shinsei table view
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_submissions.json")]
    output: String,

    /// The number of applications to generate
    #[arg(short, long, default_value_t = 25)]
    count: usize,

    /// How many days back submission dates may reach
    #[arg(long, default_value_t = 90)]
    days: i64,
}

const FIRST_NAMES: [&str; 8] = ["John", "Jane", "Akira", "Maria", "Lukas", "Amara", "Noah", "Sofia"];
const LAST_NAMES: [&str; 8] = ["Doe", "Smith", "Tanaka", "Garcia", "Weber", "Okafor", "Brown", "Rossi"];
const CITIES: [(&str, &str); 8] = [
    ("Los Angeles", "USA"),
    ("Houston", "USA"),
    ("Toronto", "Canada"),
    ("Montreal", "Canada"),
    ("Munich", "Germany"),
    ("Berlin", "Germany"),
    ("Paris", "France"),
    ("Lyon", "France"),
];
const VEHICLES: [&str; 5] = ["Toyota Camry", "Honda Civic", "Ford Focus", "BMW 320i", "Tesla Model 3"];
const STATUSES: [ApplicationStatus; 3] = [
    ApplicationStatus::Pending,
    ApplicationStatus::Approved,
    ApplicationStatus::Rejected,
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.days < 0 {
        eprintln!("Error: --days ({}) cannot be negative", cli.days);
        std::process::exit(1);
    }

    println!("Generating {} applications...", cli.count);

    let data: Vec<Record> = (1..=cli.count)
        .map(|id| generate_row(&mut rng, id, cli.days))
        .collect();
    let listing = SubmissionsPage {
        columns: [
            "Full Name",
            "Insurance Type",
            "City",
            "Status",
            "Submitted Date",
            "Property Value",
            "Vehicle",
            "Country",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect(),
        data,
    };

    let json_output = serde_json::to_string_pretty(&listing)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated and saved {} rows to '{}'",
        listing.data.len(),
        cli.output
    );

    Ok(())
}

/// One listing row; only the columns of the row's insurance line are filled in.
fn generate_row(rng: &mut ThreadRng, id: usize, days: i64) -> Record {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("N/A");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or_default();
    let (city, country) = CITIES.choose(rng).copied().unwrap_or(("N/A", "N/A"));
    let status = STATUSES.choose(rng).copied().unwrap_or(ApplicationStatus::Pending);
    let submitted = Utc::now() - Duration::days(rng.random_range(0..=days));

    let (insurance_type, property_value, vehicle) = match rng.random_range(0..3) {
        0 => ("Health", "N/A".to_string(), "N/A".to_string()),
        1 => {
            let value: u32 = rng.random_range(50..=5000) * 1000;
            ("Home", format!("${}", group_thousands(f64::from(value))), "N/A".to_string())
        }
        _ => (
            "Car",
            "N/A".to_string(),
            VEHICLES.choose(rng).copied().unwrap_or("N/A").to_string(),
        ),
    };

    let row = json!({
        "id": id.to_string(),
        "Full Name": format!("{} {}", first, last),
        "Insurance Type": insurance_type,
        "City": city,
        "Status": status.as_str(),
        "Submitted Date": submitted.format("%Y-%m-%d").to_string(),
        "Property Value": property_value,
        "Vehicle": vehicle,
        "Country": country,
    });
    match row {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}
