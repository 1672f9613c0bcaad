//! Command-line arguments for `bitwallet`.

use std::time::Duration;

use btc_ledger::types::{DEFAULT_BASE_URL, DEFAULT_CHAIN, DEFAULT_UTXO_LIMIT};
use btc_ledger::LedgerConfig;
use btc_transaction::fee::DEFAULT_FEE_SATOSHIS;
use btc_wallet::WalletConfig;
use clap::Parser;

use crate::logging::LogFormat;

/// Simple Bitcoin wallet.
///
/// Generates keys, checks address balances and sends payments through a
/// public ledger API. Keys are never stored.
#[derive(Parser, Debug)]
#[command(name = "bitwallet", about = "Simple Bitcoin wallet", version)]
pub struct Cli {
    /// Ledger API root.
    #[arg(long, env = "BITWALLET_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Chain path on the ledger API.
    #[arg(long, env = "BITWALLET_CHAIN", default_value = DEFAULT_CHAIN)]
    pub chain: String,

    /// Optional ledger API token.
    #[arg(long, env = "BITWALLET_API_TOKEN")]
    pub api_token: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "BITWALLET_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Maximum unspent outputs fetched per payment.
    #[arg(long, env = "BITWALLET_UTXO_LIMIT", default_value_t = DEFAULT_UTXO_LIMIT)]
    pub utxo_limit: usize,

    /// Flat fee in satoshis.
    #[arg(long, env = "BITWALLET_FEE_SATS", default_value_t = DEFAULT_FEE_SATOSHIS)]
    pub fee_sats: u64,

    /// Log output format.
    #[arg(long, env = "BITWALLET_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn wallet_config(&self) -> WalletConfig {
        WalletConfig {
            ledger: LedgerConfig {
                base_url: self.api_url.clone(),
                chain: self.chain.clone(),
                token: self.api_token.clone(),
                timeout: Duration::from_secs(self.timeout_secs),
                utxo_limit: self.utxo_limit,
            },
            fee_satoshis: self.fee_sats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_wallet_config() {
        let cli = Cli::parse_from(["bitwallet"]);
        assert_eq!(cli.wallet_config(), WalletConfig::default());
        assert_eq!(cli.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "bitwallet",
            "--api-url",
            "http://localhost:8080",
            "--api-token",
            "t0k",
            "--fee-sats",
            "2500",
            "--utxo-limit",
            "5",
            "--log-format",
            "json",
        ]);
        let config = cli.wallet_config();
        assert_eq!(config.ledger.base_url, "http://localhost:8080");
        assert_eq!(config.ledger.token.as_deref(), Some("t0k"));
        assert_eq!(config.ledger.utxo_limit, 5);
        assert_eq!(config.fee_satoshis, 2500);
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
