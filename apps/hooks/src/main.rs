//! # Till Hooks Entry Point
//!
//! Runs one hook operation and prints its JSON result.
//!
//! ## Usage
//! ```bash
//! echo '{"customer": "Walk-in Customer", "items": [{"item_code": "TEA", "rate": 2}]}' \
//!   | till-hooks create_sales_invoice --user cashier@till
//!
//! till-hooks get_exchange_rates --user cashier@till
//! ```
//!
//! ## Streams
//! - stdin: JSON request payload (may be empty)
//! - stdout: JSON result
//! - stderr: logs and queued user messages

use std::env;
use std::io::{self, Read};
use std::process::ExitCode;

use serde_json::Value;
use tracing::{error, info};

use till_hooks::config::HooksConfig;
use till_hooks::state::SessionContext;
use till_hooks::{init_tracing, Hooks, OPERATIONS};

fn print_usage() {
    eprintln!("Usage: till-hooks <OPERATION> --user <USER>");
    eprintln!();
    eprintln!("Reads the JSON payload from stdin and prints the result to stdout.");
    eprintln!();
    eprintln!("Operations:");
    for operation in OPERATIONS {
        eprintln!("  {}", operation);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    let mut operation: Option<String> = None;
    let mut user: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--user" | "-u" => {
                if i + 1 < args.len() {
                    user = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            other if operation.is_none() => operation = Some(other.to_string()),
            _ => {}
        }
        i += 1;
    }

    let (Some(operation), Some(user)) = (operation, user) else {
        print_usage();
        return ExitCode::from(2);
    };

    let config = match HooksConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    let payload = match read_payload() {
        Ok(payload) => payload,
        Err(err) => {
            error!(error = %err, "Could not read request payload");
            return ExitCode::FAILURE;
        }
    };

    let hooks = match Hooks::connect(config).await {
        Ok(hooks) => hooks,
        Err(err) => {
            error!(error = %err, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let session = SessionContext::new(user);
    let result = hooks.call(&session, &operation, payload).await;

    for message in hooks.messages().drain() {
        eprintln!("[{}] {}", message.title, message.message);
    }

    let code = match result {
        Ok(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Err(err) => {
            match serde_json::to_string(&err) {
                Ok(json) => println!("{}", json),
                Err(_) => println!("{}", Value::Null),
            }
            ExitCode::FAILURE
        }
    };

    hooks.db().inner().close().await;
    info!(operation = %operation, "Hook finished");
    code
}

/// Reads stdin; blank input means no payload.
fn read_payload() -> Result<Value, Box<dyn std::error::Error>> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    if input.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&input)?)
}
