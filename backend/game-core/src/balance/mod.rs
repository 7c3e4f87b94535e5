//! Token balance lookup over Ethereum JSON-RPC.
//!
//! The balance lives in an ERC-20 style contract, so reading it is a single
//! `eth_call` of `balanceOf(address)` against a node. The result is published on
//! [`ApplicationState::balance`] once the wallet is known.

use crate::app_state::ApplicationState;
use crate::error::balance::BalanceError;

use common::ErrorLocation;

use std::future::Future;
use std::panic::Location;
use std::time::Duration;

use log::{debug, info};
use models::Address;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

const DEFAULT_TIMEOUT_DURATION: Duration = Duration::from_secs(10);

/// First four bytes of `keccak256("balanceOf(address)")`.
pub const BALANCE_OF_SELECTOR: &str = "70a08231";
/// Largest number of significant hex digits a `u128` holds.
const MAX_BALANCE_DIGITS: usize = 32;

/// Something that can report how many tokens a wallet holds.
pub trait BalanceSource: Send + Sync {
    fn balance_of(&self, wallet: &Address) -> impl Future<Output = Result<u128, BalanceError>> + Send;
}

/// Reads `balanceOf` from a token contract through a JSON-RPC node.
#[derive(Debug, Clone)]
pub struct RpcBalanceSource {
    rpc_url: Url,
    contract: Address,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcFailure>,
}

#[derive(Debug, Deserialize)]
struct RpcFailure {
    code: i64,
    message: String,
}

impl RpcBalanceSource {
    pub fn new(rpc_url: &str, contract: Address) -> Result<Self, BalanceError> {
        let rpc_url = Url::parse(rpc_url)?;
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT_DURATION)
            .build()?;

        Ok(Self {
            rpc_url,
            contract,
            client,
        })
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }
}

impl BalanceSource for RpcBalanceSource {
    async fn balance_of(&self, wallet: &Address) -> Result<u128, BalanceError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": self.contract.as_str(), "data": balance_of_call_data(wallet) },
                "latest"
            ]
        });

        debug!("eth_call balanceOf({}) on {}", wallet, self.contract);
        let response = self
            .client
            .post(self.rpc_url.clone())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BalanceError::Http {
                message: format!(
                    "HTTP {} - {}",
                    response.status().as_u16(),
                    response.text().await.unwrap_or_default()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let text = response.text().await?;
        let reply: RpcResponse = serde_json::from_str(&text)?;

        if let Some(failure) = reply.error {
            return Err(BalanceError::Rpc {
                code: failure.code,
                message: failure.message,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let result = reply
            .result
            .ok_or_else(|| BalanceError::invalid_result("reply carries neither result nor error"))?;
        parse_balance(&result)
    }
}

/// `0x` + selector + the wallet left-padded to one 32-byte word.
pub fn balance_of_call_data(wallet: &Address) -> String {
    let digits = wallet.as_str().trim_start_matches("0x").to_ascii_lowercase();
    format!("0x{BALANCE_OF_SELECTOR}{digits:0>64}")
}

/// Decode a `uint256` return word.
///
/// An empty `0x` result means nothing answered at the contract address.
pub fn parse_balance(word: &str) -> Result<u128, BalanceError> {
    let digits = word
        .strip_prefix("0x")
        .ok_or_else(|| BalanceError::invalid_result(format!("missing 0x prefix: {word}")))?;

    if digits.is_empty() {
        return Err(BalanceError::invalid_result(
            "empty result, no contract at the configured address",
        ));
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > MAX_BALANCE_DIGITS {
        return Err(BalanceError::invalid_result(format!(
            "balance does not fit in 128 bits: {word}"
        )));
    }
    if significant.is_empty() {
        return Ok(0);
    }

    u128::from_str_radix(significant, 16)
        .map_err(|e| BalanceError::invalid_result(format!("{word}: {e}")))
}

/// Look up `wallet`'s balance and publish it on `state.balance`.
///
/// The cell keeps its previous value when the lookup fails.
pub async fn refresh_balance<B: BalanceSource>(
    source: &B,
    wallet: &Address,
    state: &ApplicationState,
) -> Result<u128, BalanceError> {
    let balance = source.balance_of(wallet).await?;
    info!("Token balance for {}: {}", wallet.short(), balance);
    state.balance.set(balance);
    Ok(balance)
}
