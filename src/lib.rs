//! Solami core library
//!
//! Deterministic logic behind the Solami "pay with crypto" checkout helper:
//! - Synthetic card generation from a wallet address
//! - Card field detection over form input descriptors
//! - Fill planning, checkout page and order total detection
//! - Read-only USDC balance lookup over Solana JSON-RPC

pub mod card;
pub mod checkout;
pub mod config;
pub mod error;
pub mod fields;
pub mod fill;
pub mod price;
pub mod rpc;

pub use card::{synthesize, SyntheticCard};
pub use config::Config;
pub use error::{Error, Result};
pub use fields::{locate, FieldRole, FieldSet, InputDescriptor};
pub use rpc::{BalanceClient, BalanceReport};
