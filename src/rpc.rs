//! Solana JSON-RPC balance lookup
//!
//! The only network access in the crate: a read-only
//! `getTokenAccountsByOwner` call that reports the owner's USDC balance.
//! Failures never escape [`BalanceClient::fetch_usdc_balance`]; they come
//! back as a zero balance with the error text attached.

use log::{debug, warn};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::{Error, Result};

/// RPC request
#[derive(Serialize, Debug)]
struct RpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: Value,
}

/// RPC response
#[derive(Deserialize, Debug)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

/// RPC error object
#[derive(Deserialize, Debug)]
struct RpcError {
    code: i64,
    message: String,
}

/// Outcome of a balance lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub address: String,
    /// UI amount in USDC; 0 when the lookup failed
    pub balance: f64,
    pub error: Option<String>,
}

impl BalanceReport {
    fn failed(address: &str, error: impl Into<String>) -> Self {
        Self {
            address: address.to_string(),
            balance: 0.0,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Client for the USDC balance query
pub struct BalanceClient {
    client: Client,
    rpc_url: String,
    usdc_mint: String,
}

impl BalanceClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            rpc_url: config.rpc_url.clone(),
            usdc_mint: config.usdc_mint.clone(),
        })
    }

    /// USDC balance of `address`, degrading to zero on any failure
    pub async fn fetch_usdc_balance(&self, address: &str) -> BalanceReport {
        if address.trim().is_empty() {
            return BalanceReport::failed(address, "no address provided");
        }

        match self.query_usdc_balance(address).await {
            Ok(balance) => {
                debug!("USDC balance for {}: {}", address, balance);
                BalanceReport {
                    address: address.to_string(),
                    balance,
                    error: None,
                }
            }
            Err(e) => {
                warn!("Balance fetch for {} failed: {}", address, e);
                BalanceReport::failed(address, e.to_string())
            }
        }
    }

    async fn query_usdc_balance(&self, address: &str) -> Result<f64> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "getTokenAccountsByOwner",
            params: json!([
                address,
                { "mint": self.usdc_mint },
                { "encoding": "jsonParsed" }
            ]),
        };
        debug!("Calling {} on {}", request.method, self.rpc_url);

        let response = self
            .client
            .post(&self.rpc_url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: RpcResponse = serde_json::from_str(&body)?;
        match (parsed.result, parsed.error) {
            (Some(result), _) => ui_amount_of_first_account(&result),
            (None, Some(err)) => Err(Error::Rpc {
                code: err.code,
                message: err.message,
            }),
            (None, None) => Err(Error::UnexpectedResponse(
                "response has neither result nor error".to_string(),
            )),
        }
    }
}

/// `value[0].account.data.parsed.info.tokenAmount.uiAmount`, 0 for no accounts
fn ui_amount_of_first_account(result: &Value) -> Result<f64> {
    let accounts = result
        .get("value")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::UnexpectedResponse("missing result.value".to_string()))?;

    let Some(first) = accounts.first() else {
        return Ok(0.0);
    };

    let amount = first
        .pointer("/account/data/parsed/info/tokenAmount")
        .ok_or_else(|| Error::UnexpectedResponse("missing tokenAmount".to_string()))?;

    // uiAmount is null for zero balances on some nodes
    Ok(amount.get("uiAmount").and_then(Value::as_f64).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_amount_of_first_account() {
        let result = json!({
            "context": { "slot": 1 },
            "value": [{
                "pubkey": "x",
                "account": { "data": { "parsed": { "info": {
                    "tokenAmount": { "amount": "2847530000", "decimals": 6, "uiAmount": 2847.53 }
                }}}}
            }]
        });
        assert_eq!(ui_amount_of_first_account(&result).unwrap(), 2847.53);
    }

    #[test]
    fn test_no_accounts_is_zero() {
        let result = json!({ "value": [] });
        assert_eq!(ui_amount_of_first_account(&result).unwrap(), 0.0);
    }

    #[test]
    fn test_null_ui_amount_is_zero() {
        let result = json!({
            "value": [{ "account": { "data": { "parsed": { "info": {
                "tokenAmount": { "uiAmount": null }
            }}}}}]
        });
        assert_eq!(ui_amount_of_first_account(&result).unwrap(), 0.0);
    }

    #[test]
    fn test_malformed_account() {
        let result = json!({ "value": [{ "account": {} }] });
        assert!(matches!(
            ui_amount_of_first_account(&result),
            Err(Error::UnexpectedResponse(_))
        ));
    }
}
