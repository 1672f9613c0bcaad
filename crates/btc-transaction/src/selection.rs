//! UTXO selection strategies.
//!
//! A [`CoinSelector`] picks inputs covering `amount + fee` from the
//! candidates the ledger returned. [`FirstFit`] keeps provider order and
//! stops at the first sufficient prefix; [`LargestFirst`] spends the
//! biggest outputs first to keep the input count low.

use std::collections::HashSet;

use tracing::debug;

use crate::utxo::UnspentOutput;
use crate::TransactionError;

/// Chosen inputs and their summed value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub utxos: Vec<UnspentOutput>,
    pub total: u64,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}

/// Strategy for choosing which outputs to spend.
pub trait CoinSelector {
    /// Select outputs whose total is at least `amount + fee`.
    ///
    /// A candidate whose outpoint already appeared earlier in the list is
    /// skipped and never counted. With repeated outpoints in `candidates`,
    /// selection can therefore fail even though a prefix of the raw list
    /// sums to the target; the reported `available` counts each outpoint
    /// once.
    ///
    /// # Returns
    /// `InsufficientFunds` when the candidates cannot cover the target,
    /// `InvalidAmount` when `amount + fee` overflows.
    fn select(
        &self,
        candidates: &[UnspentOutput],
        amount: u64,
        fee: u64,
    ) -> Result<Selection, TransactionError>;
}

/// Accumulate candidates in the order given until the target is met.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstFit;

/// Accumulate candidates from the largest value down.
#[derive(Clone, Copy, Debug, Default)]
pub struct LargestFirst;

impl CoinSelector for FirstFit {
    fn select(
        &self,
        candidates: &[UnspentOutput],
        amount: u64,
        fee: u64,
    ) -> Result<Selection, TransactionError> {
        accumulate(candidates.iter(), amount, fee)
    }
}

impl CoinSelector for LargestFirst {
    fn select(
        &self,
        candidates: &[UnspentOutput],
        amount: u64,
        fee: u64,
    ) -> Result<Selection, TransactionError> {
        let mut ordered: Vec<&UnspentOutput> = candidates.iter().collect();
        // Stable sort keeps provider order among equal values.
        ordered.sort_by(|a, b| b.satoshis.cmp(&a.satoshis));
        accumulate(ordered.into_iter(), amount, fee)
    }
}

fn accumulate<'a>(
    candidates: impl Iterator<Item = &'a UnspentOutput>,
    amount: u64,
    fee: u64,
) -> Result<Selection, TransactionError> {
    let target = amount.checked_add(fee).ok_or_else(|| {
        TransactionError::InvalidAmount(format!("{} + {} overflows", amount, fee))
    })?;

    let mut seen = HashSet::new();
    let mut utxos = Vec::new();
    let mut total: u64 = 0;

    for utxo in candidates {
        if total >= target && !utxos.is_empty() {
            break;
        }
        if !seen.insert(utxo.outpoint()) {
            debug!(txid = %utxo.txid_hex(), vout = utxo.vout, "skipping duplicate outpoint");
            continue;
        }
        total = total.saturating_add(utxo.satoshis);
        utxos.push(utxo.clone());
    }

    if utxos.is_empty() || total < target {
        return Err(TransactionError::InsufficientFunds {
            available: total,
            required: target,
        });
    }

    debug!(inputs = utxos.len(), total, target, "selected inputs");
    Ok(Selection { utxos, total })
}
