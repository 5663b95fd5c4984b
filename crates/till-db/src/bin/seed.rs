//! # Seed Data Generator
//!
//! Populates a database with a demo cashier for trying the invoice hooks.
//!
//! ## Usage
//! ```bash
//! # Seed ./till_dev.db for cashier@till
//! cargo run -p till-db --bin seed
//!
//! # Custom cashier and database path
//! cargo run -p till-db --bin seed -- --user jane@shop --db ./data/till.db
//! ```
//!
//! ## Seeded Data
//! - POS user mapping: cost center "Main - TP", price list "Standard Selling"
//! - Global selling price list "Standard Selling"
//! - One open shift for the cashier
//! - Exchange rates from USD to KES, ZAR, EUR and GBP

use chrono::Utc;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use till_core::{CurrencyCode, UserPosDefaults, BASE_CURRENCY};
use till_db::{Database, DbConfig};

/// Demo rates quoted from USD.
const RATES: &[(&str, &str)] = &[
    ("KES", "129.50"),
    ("ZAR", "18.25"),
    ("EUR", "0.92"),
    ("GBP", "0.79"),
];

const PRICE_LIST: &str = "Standard Selling";
const COST_CENTER: &str = "Main - TP";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut user = String::from("cashier@till");
    let mut db_path = String::from("./till_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--user" | "-u" => {
                if i + 1 < args.len() {
                    user = args[i + 1].clone();
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Till POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -u, --user <USER>  Cashier to map (default: cashier@till)");
                println!("  -d, --db <PATH>    Database file path (default: ./till_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Till POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Cashier:  {}", user);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let settings = db.pos_settings();
    settings.set_selling_price_list(Some(PRICE_LIST)).await?;
    settings
        .map_user(
            &user,
            &UserPosDefaults {
                cost_center: COST_CENTER.to_string(),
                price_list: Some(PRICE_LIST.to_string()),
            },
        )
        .await?;
    println!("✓ Mapped {} to {}", user, COST_CENTER);

    match db.shifts().last_open_for_user(&user).await? {
        Some(shift) => println!("⚠ {} already has open shift {}", user, shift.as_str()),
        None => {
            let now = Utc::now();
            let name = format!("SHIFT-{}", now.format("%Y%m%d-%H%M%S"));
            let shift = db.shifts().open_shift(&name, &user, now).await?;
            println!("✓ Opened shift {}", shift.as_str());
        }
    }

    let base = CurrencyCode::new(BASE_CURRENCY);
    for (code, rate) in RATES {
        let rate = Decimal::from_str(rate)?;
        db.exchange_rates()
            .upsert_rate(&base, &CurrencyCode::new(code), rate)
            .await?;
        println!("  {} → {} = {}", BASE_CURRENCY, code, rate);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
