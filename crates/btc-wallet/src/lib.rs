//! # btc-wallet
//!
//! Payment orchestration for a single-key mainnet wallet.
//!
//! [`PaymentEngine`] ties the pieces together: it fetches unspent outputs
//! from a [`LedgerClient`](btc_ledger::LedgerClient), selects inputs,
//! assembles, signs and verifies the transaction, and only then hands the
//! serialized bytes to the ledger for relay. Operator input is validated
//! at the boundary by [`codec`] and [`amount`] before it reaches the engine.

pub mod amount;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;

pub use config::WalletConfig;
pub use engine::PaymentEngine;
pub use error::WalletError;
