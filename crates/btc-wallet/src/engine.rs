//! Payment engine.
//!
//! Each operation is self-contained: unspent outputs are fetched fresh,
//! the transaction is built, signed and verified in memory, and only a
//! verified transaction is ever handed to the ledger for broadcast.

use btc_ledger::LedgerClient;
use btc_primitives::ec::PrivateKey;
use btc_script::Address;
use btc_transaction::fee::{estimate_size, FeePolicy, FixedFee};
use btc_transaction::selection::{CoinSelector, FirstFit, Selection};
use btc_transaction::{builder, signer, verify, Transaction, UnspentOutput};
use tracing::{debug, info, warn};

use crate::codec::derive_address;
use crate::config::WalletConfig;
use crate::WalletError;

/// Outputs of a standard payment: recipient plus change.
const PAYMENT_OUTPUTS: usize = 2;

/// Builds, signs, verifies and broadcasts payments.
pub struct PaymentEngine<L, S = FirstFit, F = FixedFee> {
    ledger: L,
    selector: S,
    fee_policy: F,
    utxo_limit: usize,
}

impl<L: LedgerClient> PaymentEngine<L> {
    /// First-fit selection and the configured flat fee.
    pub fn new(ledger: L, config: &WalletConfig) -> Self {
        Self::with_strategies(
            ledger,
            FirstFit,
            FixedFee(config.fee_satoshis),
            config.ledger.utxo_limit,
        )
    }
}

impl<L, S, F> PaymentEngine<L, S, F>
where
    L: LedgerClient,
    S: CoinSelector,
    F: FeePolicy,
{
    pub fn with_strategies(ledger: L, selector: S, fee_policy: F, utxo_limit: usize) -> Self {
        Self {
            ledger,
            selector,
            fee_policy,
            utxo_limit,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Confirmed balance of `address` in satoshis.
    pub async fn balance(&self, address: &Address) -> Result<u64, WalletError> {
        Ok(self.ledger.balance(address).await?)
    }

    /// Pay `amount` satoshis from `key`'s address to `recipient`, returning
    /// the txid reported by the ledger. Change goes back to `key`'s address.
    pub async fn send(
        &self,
        key: &PrivateKey,
        recipient: &Address,
        amount: u64,
    ) -> Result<String, WalletError> {
        let tx = self.prepare(key, recipient, amount).await?;
        self.broadcast_verified(&tx).await
    }

    /// Fetch outputs, select, assemble and sign without broadcasting.
    pub async fn prepare(
        &self,
        key: &PrivateKey,
        recipient: &Address,
        amount: u64,
    ) -> Result<Transaction, WalletError> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }
        let sender = derive_address(key);
        let utxos = self.ledger.list_unspent(&sender, self.utxo_limit).await?;
        debug!(address = %sender, candidates = utxos.len(), "fetched unspent outputs");

        let (selection, fee) = self.select_with_fee(&utxos, amount)?;
        let unsigned = builder::build(&selection, recipient, amount, fee, &sender)?;
        Ok(signer::sign(&unsigned, key)?)
    }

    /// Verify `tx` and broadcast it only if every input checks out.
    pub async fn broadcast_verified(&self, tx: &Transaction) -> Result<String, WalletError> {
        if !verify::verify(tx) {
            return Err(WalletError::VerificationFailed(format!(
                "transaction {} did not verify",
                tx.tx_id_hex()
            )));
        }
        let txid = self.ledger.broadcast(&tx.to_bytes()).await.map_err(|e| {
            warn!(error = %e, "broadcast failed");
            WalletError::from(e)
        })?;
        info!(%txid, size = tx.size(), "payment broadcast");
        Ok(txid)
    }

    /// Select inputs, raising the fee until it covers the selected input count.
    ///
    /// Terminates because the assumed input count only grows and a
    /// selection never exceeds the candidate count.
    fn select_with_fee(
        &self,
        utxos: &[UnspentOutput],
        amount: u64,
    ) -> Result<(Selection, u64), WalletError> {
        let mut inputs = 1;
        loop {
            let fee = self.fee_policy.fee(estimate_size(inputs, PAYMENT_OUTPUTS));
            let selection = self.selector.select(utxos, amount, fee)?;
            if selection.len() <= inputs {
                debug!(inputs = selection.len(), fee, total = selection.total, "fee settled");
                return Ok((selection, fee));
            }
            inputs = selection.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use btc_ledger::LedgerError;
    use btc_script::Script;
    use btc_transaction::fee::PerByteFee;
    use btc_transaction::selection::LargestFirst;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Balance(String),
        ListUnspent(String, usize),
        Broadcast(Vec<u8>),
    }

    /// In-memory ledger that records every call.
    #[derive(Default)]
    struct FakeLedger {
        balance: u64,
        utxos: Vec<UnspentOutput>,
        reject: Option<String>,
        unreachable: bool,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeLedger {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        fn record(&self, call: Call) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
        }

        fn broadcasts(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, Call::Broadcast(_)))
                .count()
        }
    }

    impl LedgerClient for FakeLedger {
        async fn balance(&self, address: &Address) -> Result<u64, LedgerError> {
            self.record(Call::Balance(address.to_string()));
            if self.unreachable {
                return Err(LedgerError::Timeout);
            }
            Ok(self.balance)
        }

        async fn list_unspent(
            &self,
            address: &Address,
            limit: usize,
        ) -> Result<Vec<UnspentOutput>, LedgerError> {
            self.record(Call::ListUnspent(address.to_string(), limit));
            if self.unreachable {
                return Err(LedgerError::Timeout);
            }
            Ok(self.utxos.iter().take(limit).cloned().collect())
        }

        async fn broadcast(&self, raw_tx: &[u8]) -> Result<String, LedgerError> {
            self.record(Call::Broadcast(raw_tx.to_vec()));
            match self.reject {
                Some(ref reason) => Err(LedgerError::Rejected(reason.clone())),
                None => Ok(Transaction::from_bytes(raw_tx)
                    .map(|tx| tx.tx_id_hex())
                    .unwrap_or_default()),
            }
        }
    }

    const RECIPIENT: &str = "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr";

    fn key() -> PrivateKey {
        PrivateKey::from_bytes(&[0x21; 32]).unwrap()
    }

    fn recipient() -> Address {
        Address::from_string(RECIPIENT).unwrap()
    }

    fn ledger_with(values: &[u64]) -> FakeLedger {
        let lock = derive_address(&key()).locking_script();
        FakeLedger {
            utxos: values
                .iter()
                .enumerate()
                .map(|(i, v)| UnspentOutput::new([i as u8 + 1; 32], 0, *v, lock.clone()))
                .collect(),
            ..Default::default()
        }
    }

    fn engine(ledger: FakeLedger) -> PaymentEngine<FakeLedger> {
        PaymentEngine::new(ledger, &WalletConfig::default())
    }

    #[tokio::test]
    async fn test_balance_passthrough() {
        let engine = engine(FakeLedger {
            balance: 123,
            ..Default::default()
        });
        assert_eq!(engine.balance(&recipient()).await.unwrap(), 123);
        assert_eq!(
            engine.ledger().calls(),
            vec![Call::Balance(RECIPIENT.to_string())]
        );
    }

    #[tokio::test]
    async fn test_balance_network_error() {
        let engine = engine(FakeLedger {
            unreachable: true,
            ..Default::default()
        });
        assert!(matches!(
            engine.balance(&recipient()).await,
            Err(WalletError::NetworkError(_))
        ));
    }

    #[tokio::test]
    async fn test_send_two_inputs_no_change() {
        let engine = engine(ledger_with(&[50_000, 60_000, 70_000]));
        let txid = engine.send(&key(), &recipient(), 100_000).await.unwrap();

        let calls = engine.ledger().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            Call::ListUnspent(derive_address(&key()).to_string(), 50)
        );
        let raw = match &calls[1] {
            Call::Broadcast(raw) => raw.clone(),
            other => panic!("expected broadcast, got {:?}", other),
        };
        let tx = Transaction::from_bytes(&raw).unwrap();
        assert_eq!(tx.tx_id_hex(), txid);
        assert_eq!(tx.input_count(), 2);
        assert_eq!(tx.output_count(), 1);
        assert_eq!(tx.outputs[0].satoshis, 100_000);
        assert_eq!(tx.outputs[0].locking_script, recipient().locking_script());
    }

    #[tokio::test]
    async fn test_send_single_input_with_change() {
        let engine = engine(ledger_with(&[1_000_000]));
        engine.send(&key(), &recipient(), 100_000).await.unwrap();

        let tx = engine.prepare(&key(), &recipient(), 100_000).await.unwrap();
        assert_eq!(tx.output_count(), 2);
        assert_eq!(tx.outputs[1].satoshis, 890_000);
        assert_eq!(
            tx.outputs[1].locking_script,
            derive_address(&key()).locking_script()
        );
        assert_eq!(tx.fee().unwrap(), 10_000);
        assert!(verify::verify(&tx));
    }

    #[tokio::test]
    async fn test_send_without_funds() {
        let engine = engine(ledger_with(&[]));
        assert!(matches!(
            engine.send(&key(), &recipient(), 100_000).await,
            Err(WalletError::InsufficientFunds { available: 0, required: 110_000 })
        ));
        assert_eq!(engine.ledger().broadcasts(), 0);
    }

    #[tokio::test]
    async fn test_send_zero_amount_never_touches_ledger() {
        let engine = engine(ledger_with(&[1_000_000]));
        assert!(matches!(
            engine.send(&key(), &recipient(), 0).await,
            Err(WalletError::InvalidAmount(_))
        ));
        assert!(engine.ledger().calls().is_empty());
    }

    #[tokio::test]
    async fn test_send_with_foreign_outputs_is_signing_error() {
        let mut ledger = ledger_with(&[1_000_000]);
        ledger.utxos[0].locking_script = Script::new_p2pkh(&[0x99; 20]);
        let engine = engine(ledger);
        assert!(matches!(
            engine.send(&key(), &recipient(), 100_000).await,
            Err(WalletError::SigningError(_))
        ));
        assert_eq!(engine.ledger().broadcasts(), 0);
    }

    #[tokio::test]
    async fn test_verification_failure_blocks_broadcast() {
        let engine = engine(ledger_with(&[1_000_000]));
        let mut tx = engine.prepare(&key(), &recipient(), 100_000).await.unwrap();
        tx.outputs[0].satoshis += 1;

        assert!(matches!(
            engine.broadcast_verified(&tx).await,
            Err(WalletError::VerificationFailed(_))
        ));
        assert_eq!(engine.ledger().broadcasts(), 0);
    }

    #[tokio::test]
    async fn test_rejection_reason_surfaces() {
        let mut ledger = ledger_with(&[1_000_000]);
        ledger.reject = Some("insufficient priority".to_string());
        let engine = engine(ledger);
        match engine.send(&key(), &recipient(), 100_000).await {
            Err(WalletError::BroadcastError(reason)) => {
                assert_eq!(reason, "insufficient priority")
            }
            other => panic!("expected BroadcastError, got {:?}", other),
        }
        assert_eq!(engine.ledger().broadcasts(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_on_listing() {
        let engine = engine(FakeLedger {
            unreachable: true,
            ..Default::default()
        });
        assert!(matches!(
            engine.send(&key(), &recipient(), 100_000).await,
            Err(WalletError::NetworkError(_))
        ));
    }

    #[tokio::test]
    async fn test_per_byte_fee_covers_selected_inputs() {
        let policy = PerByteFee { sat_per_byte: 10 };
        let engine = PaymentEngine::with_strategies(
            ledger_with(&[10_000, 10_000, 10_000, 10_000, 10_000]),
            FirstFit,
            policy,
            50,
        );
        let tx = engine.prepare(&key(), &recipient(), 15_000).await.unwrap();
        let fee = tx.fee().unwrap();
        assert!(fee >= policy.fee(tx.size()));
        assert_eq!(fee, policy.fee(estimate_size(tx.input_count(), 2)));
        assert!(verify::verify(&tx));
    }

    #[tokio::test]
    async fn test_largest_first_strategy() {
        let engine = PaymentEngine::with_strategies(
            ledger_with(&[20_000, 500_000, 30_000]),
            LargestFirst,
            FixedFee(10_000),
            50,
        );
        let tx = engine.prepare(&key(), &recipient(), 100_000).await.unwrap();
        assert_eq!(tx.input_count(), 1);
        assert_eq!(tx.inputs[0].source_satoshis(), Some(500_000));
    }
}
