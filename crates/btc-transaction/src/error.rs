/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The transaction structure is invalid (e.g. missing inputs or outputs).
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// An input could not be signed: no source output, or no key for its
    /// locking script.
    #[error("signing error: {0}")]
    SigningError(String),

    /// Malformed wire bytes or hex.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// The candidate outputs cannot cover amount plus fee.
    #[error("insufficient funds: have {available} sat, need {required} sat")]
    InsufficientFunds { available: u64, required: u64 },

    /// A payment amount that is zero or overflows when the fee is added.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// An underlying script error (forwarded from `btc-script`).
    #[error("script error: {0}")]
    Script(#[from] btc_script::ScriptError),

    /// An underlying primitives error (forwarded from `btc-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] btc_primitives::PrimitivesError),
}
