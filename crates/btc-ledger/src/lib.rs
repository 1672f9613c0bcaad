//! # btc-ledger
//!
//! Client for the public ledger provider the wallet talks to: confirmed
//! address balances, unspent output listings and raw transaction relay.
//!
//! The [`LedgerClient`] trait is what the payment engine consumes;
//! [`BlockCypherClient`] implements it over the BlockCypher REST API.
//! Provider JSON is decoded into typed structs in [`types`] and converted
//! to wallet types before it leaves this crate.
//!
//! # Example
//!
//! ```no_run
//! use btc_ledger::{BlockCypherClient, LedgerConfig};
//!
//! let client = BlockCypherClient::new(LedgerConfig {
//!     token: Some("my-token".to_string()),
//!     ..Default::default()
//! })
//! .expect("client");
//! ```

pub mod client;
pub mod error;
pub mod types;


pub use client::{BlockCypherClient, LedgerClient};
pub use error::LedgerError;
pub use types::LedgerConfig;
