//! # bitwallet
//!
//! Interactive single-key Bitcoin wallet. Generates keys, checks address
//! balances and sends payments through the BlockCypher API.

mod cli;
mod logging;
mod menu;

use anyhow::{Context, Result};
use clap::Parser;

use btc_ledger::BlockCypherClient;
use btc_wallet::PaymentEngine;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.log_format);

    let config = cli.wallet_config();
    tracing::info!(
        api = %config.ledger.base_url,
        chain = %config.ledger.chain,
        fee_sats = config.fee_satoshis,
        "starting bitwallet"
    );

    let client = BlockCypherClient::new(config.ledger.clone())
        .context("failed to build ledger HTTP client")?;
    let engine = PaymentEngine::new(client, &config);

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout();
    menu::run(&engine, &mut input, &mut out)
        .await
        .context("terminal I/O failed")?;
    Ok(())
}
