//! Runtime configuration
//!
//! Loaded from a JSON file, either given explicitly or found at
//! `<config dir>/solami/config.json`. Every key is optional; missing keys
//! take the demo defaults below.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Wallet address the demo flow falls back to when none is connected
pub const DEMO_WALLET_ADDRESS: &str = "Eho5sAfpYE3n1o54X6QJhe6rAA3ezyg32DGavzbxary5";
/// Public Solana mainnet RPC endpoint
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
/// USDC SPL token mint on Solana mainnet
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub wallet_address: String,
    pub rpc_url: String,
    pub usdc_mint: String,
    /// How long the pay prompt stays suppressed after it was shown
    pub cooldown_secs: u64,
    /// HTTP timeout for the balance request
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wallet_address: DEMO_WALLET_ADDRESS.to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            usdc_mint: USDC_MINT.to_string(),
            cooldown_secs: 300,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// `<config dir>/solami/config.json`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("solami").join("config.json"))
    }

    /// Load from `path`, or from [`Config::default_path`] when it exists
    ///
    /// An explicit path must exist. Without one, a missing default file
    /// yields [`Config::default`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => p,
                None => {
                    debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        info!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "rpc_url must be an http(s) URL, got '{}'",
                self.rpc_url
            )));
        }
        if self.usdc_mint.trim().is_empty() {
            return Err(Error::InvalidConfig("usdc_mint must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::InvalidConfig("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cooldown(), Duration::from_secs(300));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"rpc_url": "http://localhost:8899", "cooldown_secs": 60}}"#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.rpc_url, "http://localhost:8899");
        assert_eq!(config.cooldown_secs, 60);
        assert_eq!(config.wallet_address, DEMO_WALLET_ADDRESS);
    }

    #[test]
    fn test_load_rejects_bad_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"rpc_url": "ftp://example.com"}}"#).unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_load_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
