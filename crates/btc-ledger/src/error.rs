//! Error types for ledger provider operations.

/// Errors that can occur when talking to the ledger provider.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The HTTP request could not be sent or its body not read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The provider answered with an unexpected status.
    #[error("server error ({status}): {body}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Response body as returned.
        body: String,
    },

    /// The response body did not match the expected schema.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The provider refused to relay the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),
}

impl LedgerError {
    /// Classify a transport error, separating timeouts.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LedgerError::Timeout
        } else {
            LedgerError::Http(err)
        }
    }
}
