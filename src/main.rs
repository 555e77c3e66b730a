//! SOLAMI CLI - card synthesis and checkout field detection
//!
//! Exposes the solami library to the shell and to the extension's native
//! messaging host. Every command prints JSON on stdout.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;
use serde_json::json;
use std::io::Read;
use std::path::PathBuf;

use solami::checkout::{self, PageContext, WindowCooldown};
use solami::price::{self, PriceElement};
use solami::{fill, locate, synthesize, BalanceClient, Config, InputDescriptor};

/// Main CLI arguments
#[derive(Parser)]
#[command(name = "solami")]
#[command(about = "SOLAMI - synthetic card and checkout field detection for the pay-with-crypto demo")]
#[command(version = "0.1.0")]
struct Args {
    /// Config file (defaults to <config dir>/solami/config.json when present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Solana RPC URL (overrides config)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Derive the synthetic card for a wallet address
    Card {
        /// Wallet address (defaults to the configured address)
        address: Option<String>,
        /// Generation date as YYYY-MM-DD (defaults to today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Classify form inputs into card field roles
    Locate {
        /// JSON array of input descriptors, or '-' for stdin
        input: String,
    },
    /// Plan the values to write into located card fields
    Fill {
        /// JSON array of input descriptors, or '-' for stdin
        input: String,
        /// Wallet address (defaults to the configured address)
        #[arg(long)]
        address: Option<String>,
        /// Generation date as YYYY-MM-DD (defaults to today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Decide whether to offer the pay prompt on a page
    Checkout {
        /// JSON page context, or '-' for stdin
        input: String,
        /// When the prompt was last shown (RFC 3339)
        #[arg(long)]
        last_shown: Option<DateTime<Utc>>,
    },
    /// Detect the order total among price-like page elements
    Price {
        /// JSON array of price elements, or '-' for stdin
        input: String,
    },
    /// Fetch the USDC balance of a wallet address
    Balance {
        /// Wallet address (defaults to the configured address)
        address: Option<String>,
    },
}

fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))
    }
}

fn read_descriptors(source: &str) -> Result<Vec<InputDescriptor>> {
    let raw = read_input(source)?;
    serde_json::from_str(&raw).context("Invalid input descriptor JSON")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(url) = args.rpc_url {
        config.rpc_url = url;
        config.validate()?;
    }
    debug!("Using RPC endpoint {}", config.rpc_url);

    match args.command {
        Commands::Card { address, date } => {
            let address = address.unwrap_or_else(|| config.wallet_address.clone());
            let card = synthesize(&address, date.unwrap_or_else(today));
            print_json(&json!({
                "number": card.number,
                "formattedNumber": card.formatted_number(),
                "expiryMonth": card.expiry_month,
                "expiryYear": card.expiry_year,
                "expiry": card.expiry_mm_yy(),
                "cvv": card.cvv,
                "holderName": card.holder_name,
            }))?;
        }
        Commands::Locate { input } => {
            let candidates = read_descriptors(&input)?;
            let fields = locate(&candidates);
            info!("Located {} card field(s) among {} inputs", fields.iter().count(), candidates.len());
            print_json(&fields)?;
        }
        Commands::Fill {
            input,
            address,
            date,
        } => {
            let candidates = read_descriptors(&input)?;
            let address = address.unwrap_or_else(|| config.wallet_address.clone());
            let card = synthesize(&address, date.unwrap_or_else(today));
            let fields = locate(&candidates);
            print_json(&fill::plan(&card, &fields, &candidates))?;
        }
        Commands::Checkout { input, last_shown } => {
            let raw = read_input(&input)?;
            let page: PageContext =
                serde_json::from_str(&raw).context("Invalid page context JSON")?;
            let cooldown = WindowCooldown::new(last_shown, config.cooldown());
            print_json(&checkout::offer_decision(&page, &cooldown, Utc::now()))?;
        }
        Commands::Price { input } => {
            let raw = read_input(&input)?;
            let elements: Vec<PriceElement> =
                serde_json::from_str(&raw).context("Invalid price element JSON")?;
            print_json(&json!({ "price": price::detect_price_or_zero(&elements) }))?;
        }
        Commands::Balance { address } => {
            let address = address.unwrap_or_else(|| config.wallet_address.clone());
            let client = BalanceClient::new(&config).context("Failed to create HTTP client")?;
            let report = client.fetch_usdc_balance(&address).await;
            print_json(&report)?;
        }
    }

    Ok(())
}
