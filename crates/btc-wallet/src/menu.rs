//! Interactive menu.
//!
//! Generic over input and output so tests can drive it with in-memory
//! buffers. Every failure prints a message and returns to the menu; only
//! terminal I/O errors end the loop.

use std::io::{self, BufRead, Write};

use btc_ledger::LedgerClient;
use btc_transaction::fee::FeePolicy;
use btc_transaction::selection::CoinSelector;
use btc_wallet::{amount, codec, PaymentEngine, WalletError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Generate,
    Balance,
    Send,
    Exit,
}

impl Choice {
    fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "1" => Some(Choice::Generate),
            "2" => Some(Choice::Balance),
            "3" => Some(Choice::Send),
            "4" => Some(Choice::Exit),
            _ => None,
        }
    }
}

/// Run the menu until the operator exits or input ends.
pub async fn run<L, S, F, R, W>(
    engine: &PaymentEngine<L, S, F>,
    input: &mut R,
    out: &mut W,
) -> io::Result<()>
where
    L: LedgerClient,
    S: CoinSelector,
    F: FeePolicy,
    R: BufRead,
    W: Write,
{
    writeln!(out, "Welcome to the Simple Bitcoin Wallet")?;
    writeln!(out, "-------------------------------------")?;

    loop {
        writeln!(out)?;
        writeln!(out, "Please select an option:")?;
        writeln!(out, "1. Generate New Wallet")?;
        writeln!(out, "2. Check Balance")?;
        writeln!(out, "3. Send Bitcoin")?;
        writeln!(out, "4. Exit")?;
        let choice = match prompt(input, out, "Enter your choice (1-4): ")? {
            Some(choice) => choice,
            None => return Ok(()),
        };

        match Choice::parse(&choice) {
            Some(Choice::Generate) => generate(out)?,
            Some(Choice::Balance) => check_balance(engine, input, out).await?,
            Some(Choice::Send) => send(engine, input, out).await?,
            Some(Choice::Exit) => {
                writeln!(out, "Exiting the application. Goodbye!")?;
                return Ok(());
            }
            None => writeln!(out, "Invalid choice. Please select a valid option.")?,
        }
    }
}

fn generate<W: Write>(out: &mut W) -> io::Result<()> {
    let key = codec::generate_key();
    let address = codec::derive_address(&key);
    writeln!(out)?;
    writeln!(out, "--- New Bitcoin Wallet Generated ---")?;
    writeln!(out, "Private Key (WIF): {}", key.to_wif())?;
    writeln!(out, "Public Address: {}", address)?;
    writeln!(out, "------------------------------------")?;
    writeln!(out, "** IMPORTANT: Store your private key securely! **")
}

async fn check_balance<L, S, F, R, W>(
    engine: &PaymentEngine<L, S, F>,
    input: &mut R,
    out: &mut W,
) -> io::Result<()>
where
    L: LedgerClient,
    S: CoinSelector,
    F: FeePolicy,
    R: BufRead,
    W: Write,
{
    let text = match prompt(input, out, "\nEnter the Bitcoin address to check balance: ")? {
        Some(text) => text,
        None => return Ok(()),
    };
    let address = match codec::parse_address(&text) {
        Ok(address) => address,
        Err(e) => return report(out, &e),
    };
    match engine.balance(&address).await {
        Ok(sats) => writeln!(
            out,
            "\nBalance for {}: {} BTC",
            address,
            amount::format_btc(sats)
        ),
        Err(e) => report(out, &e),
    }
}

async fn send<L, S, F, R, W>(
    engine: &PaymentEngine<L, S, F>,
    input: &mut R,
    out: &mut W,
) -> io::Result<()>
where
    L: LedgerClient,
    S: CoinSelector,
    F: FeePolicy,
    R: BufRead,
    W: Write,
{
    let Some(wif) = prompt(input, out, "\nEnter your Private Key (WIF): ")? else {
        return Ok(());
    };
    let key = match codec::parse_key(&wif) {
        Ok(key) => key,
        Err(e) => return report(out, &e),
    };
    writeln!(out, "From Address: {}", codec::derive_address(&key))?;

    let Some(to) = prompt(input, out, "Enter recipient address: ")? else {
        return Ok(());
    };
    let recipient = match codec::parse_address(&to) {
        Ok(address) => address,
        Err(e) => return report(out, &e),
    };

    let Some(amount_text) = prompt(input, out, "Enter amount in BTC: ")? else {
        return Ok(());
    };
    let sats = match amount::parse_btc(&amount_text) {
        Ok(sats) => sats,
        Err(e) => return report(out, &e),
    };

    match engine.send(&key, &recipient, sats).await {
        Ok(txid) => writeln!(out, "Transaction successfully sent. TXID: {}", txid),
        Err(e) => report(out, &e),
    }
}

/// Print `text`, then read one line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    text: &str,
) -> io::Result<Option<String>> {
    write!(out, "{}", text)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn report<W: Write>(out: &mut W, err: &WalletError) -> io::Result<()> {
    tracing::debug!(error = %err, "operation failed");
    writeln!(out, "Error: {}", err)
}
