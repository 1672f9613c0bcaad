//! Ledger client trait and the BlockCypher HTTP implementation.

use std::future::Future;

use btc_script::{Address, Script};
use btc_transaction::UnspentOutput;
use reqwest::{Response, StatusCode};
use tracing::{debug, info, warn};

use crate::error::LedgerError;
use crate::types::{
    AddressResponse, BalanceResponse, ErrorResponse, LedgerConfig, PushRequest, PushResponse,
    TxRef,
};

/// Ledger operations the payment engine depends on.
///
/// Each call is a single request with no retry; failures surface to the
/// caller.
pub trait LedgerClient {
    /// Confirmed balance of `address` in satoshis. An address the provider
    /// has never seen has a balance of zero.
    fn balance(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<u64, LedgerError>> + Send;

    /// Up to `limit` confirmed unspent outputs of `address`, in provider
    /// order. No outputs is an empty list, not an error.
    fn list_unspent(
        &self,
        address: &Address,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<UnspentOutput>, LedgerError>> + Send;

    /// Relay a serialized transaction and return the provider's txid.
    fn broadcast(
        &self,
        raw_tx: &[u8],
    ) -> impl Future<Output = Result<String, LedgerError>> + Send;
}

/// HTTP client for the BlockCypher API.
#[derive(Debug, Clone)]
pub struct BlockCypherClient {
    config: LedgerConfig,
    client: reqwest::Client,
}

impl BlockCypherClient {
    /// Create a client using the configured timeout.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.chain,
            path
        )
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let req = self.client.get(self.url(path));
        self.with_token(req)
    }

    fn with_token(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.token {
            Some(ref token) => req.query(&[("token", token)]),
            None => req,
        }
    }
}

impl LedgerClient for BlockCypherClient {
    async fn balance(&self, address: &Address) -> Result<u64, LedgerError> {
        let path = format!("addrs/{}/balance", address);
        debug!(%address, "fetching balance");
        let resp = self.get(&path).send().await.map_err(LedgerError::transport)?;

        if resp.status() == StatusCode::NOT_FOUND {
            debug!(%address, "address unknown to provider");
            return Ok(0);
        }
        let body: BalanceResponse = decode(resp).await?;
        Ok(body.balance)
    }

    async fn list_unspent(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<UnspentOutput>, LedgerError> {
        let path = format!("addrs/{}", address);
        let limit_param = limit.to_string();
        debug!(%address, limit, "fetching unspent outputs");
        let resp = self
            .get(&path)
            .query(&[
                ("unspentOnly", "true"),
                ("includeScript", "true"),
                ("limit", limit_param.as_str()),
            ])
            .send()
            .await
            .map_err(LedgerError::transport)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let body: AddressResponse = decode(resp).await?;
        let fallback = address.locking_script();
        let utxos = body
            .txrefs
            .iter()
            .filter(|r| !r.spent && r.tx_output_n >= 0)
            .take(limit)
            .map(|r| to_unspent(r, &fallback))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(%address, count = utxos.len(), "unspent outputs");
        Ok(utxos)
    }

    async fn broadcast(&self, raw_tx: &[u8]) -> Result<String, LedgerError> {
        let hex_tx = hex::encode(raw_tx);
        let req = self
            .client
            .post(self.url("txs/push"))
            .json(&PushRequest { tx: &hex_tx });
        let resp = self
            .with_token(req)
            .send()
            .await
            .map_err(LedgerError::transport)?;

        let status = resp.status();
        if status.is_client_error() {
            let body = resp.text().await.map_err(LedgerError::transport)?;
            let reason = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            warn!(status = status.as_u16(), %reason, "broadcast rejected");
            return Err(LedgerError::Rejected(reason));
        }

        let body: PushResponse = decode(resp).await?;
        info!(txid = %body.tx.hash, "transaction broadcast");
        Ok(body.tx.hash)
    }
}

/// Check the status and decode a JSON body.
async fn decode<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, LedgerError> {
    let status = resp.status();
    let body = resp.text().await.map_err(LedgerError::transport)?;
    if !status.is_success() {
        return Err(LedgerError::ServerError {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| LedgerError::InvalidResponse(e.to_string()))
}

fn to_unspent(r: &TxRef, fallback: &Script) -> Result<UnspentOutput, LedgerError> {
    let vout = u32::try_from(r.tx_output_n).map_err(|_| {
        LedgerError::InvalidResponse(format!("output index {} out of range", r.tx_output_n))
    })?;
    let locking_script = match r.script {
        Some(ref script_hex) => Script::from_hex(script_hex)
            .map_err(|e| LedgerError::InvalidResponse(format!("script: {}", e)))?,
        None => fallback.clone(),
    };
    UnspentOutput::from_hex_txid(&r.tx_hash, vout, r.value, locking_script)
        .map_err(|e| LedgerError::InvalidResponse(e.to_string()))
}
