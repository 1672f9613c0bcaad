//! Wallet configuration.

use btc_ledger::LedgerConfig;
use btc_transaction::fee::DEFAULT_FEE_SATOSHIS;

/// Settings for a [`PaymentEngine`](crate::PaymentEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    pub ledger: LedgerConfig,
    /// Flat fee attached to every payment.
    pub fee_satoshis: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            fee_satoshis: DEFAULT_FEE_SATOSHIS,
        }
    }
}
