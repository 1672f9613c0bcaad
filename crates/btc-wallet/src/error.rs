//! Wallet error taxonomy.
//!
//! Lower-layer errors are folded into these variants so the CLI can
//! report a specific cause for every failed operation.

use btc_ledger::LedgerError;
use btc_transaction::TransactionError;

/// Errors reported by wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("invalid private key format: {0}")]
    InvalidPrivateKeyFormat(String),

    #[error("invalid address format: {0}")]
    InvalidAddressFormat(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("insufficient funds: have {available} sat, need {required} sat")]
    InsufficientFunds { available: u64, required: u64 },

    /// The key cannot sign an input, or the transaction could not be built.
    #[error("signing error: {0}")]
    SigningError(String),

    /// The signed transaction failed the pre-broadcast check.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// Transport failure or unusable response from the ledger provider.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The provider refused the transaction; carries its explanation.
    #[error("broadcast rejected: {0}")]
    BroadcastError(String),
}

impl From<LedgerError> for WalletError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected(reason) => WalletError::BroadcastError(reason),
            other => WalletError::NetworkError(other.to_string()),
        }
    }
}

impl From<TransactionError> for WalletError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::InsufficientFunds {
                available,
                required,
            } => WalletError::InsufficientFunds {
                available,
                required,
            },
            TransactionError::InvalidAmount(reason) => WalletError::InvalidAmount(reason),
            TransactionError::SigningError(reason) => WalletError::SigningError(reason),
            other => WalletError::SigningError(other.to_string()),
        }
    }
}
