//! Transaction assembly, signing and verification.
//!
//! Provides the wire-level [`Transaction`] type together with the pieces
//! of the payment pipeline built on it: UTXO selection, fee policies,
//! assembly of the unsigned skeleton, legacy `SIGHASH_ALL` signing and
//! script-level verification before broadcast.

pub mod builder;
pub mod fee;
pub mod input;
pub mod output;
pub mod selection;
pub mod sighash;
pub mod signer;
pub mod template;
pub mod transaction;
pub mod utxo;
pub mod verify;

mod error;
pub use error::TransactionError;
pub use input::TransactionInput;
pub use output::TransactionOutput;
pub use transaction::Transaction;
pub use utxo::UnspentOutput;
