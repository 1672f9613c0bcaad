//! Ledger configuration and the provider's response schema.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default provider endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.blockcypher.com/v1";

/// Default chain path segment.
pub const DEFAULT_CHAIN: &str = "btc/main";

/// Default number of unspent outputs requested per listing.
pub const DEFAULT_UTXO_LIMIT: usize = 50;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the ledger client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    /// Coin and network path, e.g. `btc/main`.
    pub chain: String,
    /// Optional API token sent as the `token` query parameter.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum number of unspent outputs to request.
    pub utxo_limit: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chain: DEFAULT_CHAIN.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            utxo_limit: DEFAULT_UTXO_LIMIT,
        }
    }
}

/// `GET addrs/{address}/balance`.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    pub address: Option<String>,
    /// Confirmed balance in satoshis.
    pub balance: u64,
    #[serde(default)]
    pub unconfirmed_balance: i64,
    #[serde(default)]
    pub final_balance: i64,
}

/// `GET addrs/{address}?unspentOnly=true`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressResponse {
    pub address: Option<String>,
    /// Confirmed outputs. Absent when the address has none.
    #[serde(default)]
    pub txrefs: Vec<TxRef>,
}

/// One output reference in an address listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TxRef {
    /// Funding txid in display hex.
    pub tx_hash: String,
    /// Output index; the provider reports -1 for input references.
    pub tx_output_n: i64,
    /// Value in satoshis.
    pub value: u64,
    /// Locking script hex, present when `includeScript=true`.
    pub script: Option<String>,
    #[serde(default)]
    pub spent: bool,
    #[serde(default)]
    pub confirmations: u64,
}

/// `POST txs/push` request body.
#[derive(Debug, Clone, Serialize)]
pub struct PushRequest<'a> {
    pub tx: &'a str,
}

/// `POST txs/push` success body.
#[derive(Debug, Clone, Deserialize)]
pub struct PushResponse {
    pub tx: PushedTx,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushedTx {
    pub hash: String,
}

/// Provider error body, e.g. `{"error": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
