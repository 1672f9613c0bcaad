//! BTC amount parsing and formatting.
//!
//! Operator amounts are decimal BTC strings, converted to satoshis exactly.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::WalletError;

pub const SATOSHIS_PER_BTC: u64 = 100_000_000;

/// Total supply cap in satoshis.
pub const MAX_MONEY: u64 = 21_000_000 * SATOSHIS_PER_BTC;

/// Decimal places of one satoshi.
const BTC_SCALE: u32 = 8;

/// Parse a positive BTC amount such as `"0.001"` into satoshis.
///
/// # Returns
/// `InvalidAmount` if the text is not a decimal number, is zero or
/// negative, has more than eight significant fractional digits, or
/// exceeds the supply cap.
pub fn parse_btc(text: &str) -> Result<u64, WalletError> {
    let text = text.trim();
    let btc = Decimal::from_str(text)
        .map_err(|_| WalletError::InvalidAmount(format!("'{}' is not a number", text)))?;
    if btc.is_sign_negative() || btc.is_zero() {
        return Err(WalletError::InvalidAmount(
            "amount must be positive".to_string(),
        ));
    }
    if btc.normalize().scale() > BTC_SCALE {
        return Err(WalletError::InvalidAmount(format!(
            "'{}' has more than {} decimal places",
            text, BTC_SCALE
        )));
    }

    let sats = btc
        .checked_mul(Decimal::from(SATOSHIS_PER_BTC))
        .and_then(|d| d.to_u64())
        .filter(|s| *s <= MAX_MONEY)
        .ok_or_else(|| WalletError::InvalidAmount(format!("'{}' is too large", text)))?;
    Ok(sats)
}

/// Format satoshis as BTC with eight decimals, e.g. `0.00100000`.
pub fn format_btc(satoshis: u64) -> String {
    Decimal::from_i128_with_scale(i128::from(satoshis), BTC_SCALE).to_string()
}
