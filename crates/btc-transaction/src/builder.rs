//! Assembly of the unsigned payment transaction.

use std::collections::HashSet;

use btc_script::Address;
use tracing::debug;

use crate::output::TransactionOutput;
use crate::selection::Selection;
use crate::template::p2pkh;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Build an unsigned transaction paying `amount` to `recipient`.
///
/// Inputs follow the selection order and carry their source outputs. The
/// first output pays the recipient. A second output returns the remainder
/// of the selected values after `amount + fee` to `change_address` when
/// that remainder is non-zero, so inputs minus outputs is exactly `fee`.
/// The remainder is computed from the selected outputs themselves;
/// `selection.total` is not consulted.
///
/// # Returns
/// - `InvalidAmount` for a zero amount or an overflowing `amount + fee`
/// - `InsufficientFunds` if the selected outputs do not cover `amount + fee`
/// - `InvalidTransaction` if the selection spends an outpoint twice or its
///   values overflow
pub fn build(
    selection: &Selection,
    recipient: &Address,
    amount: u64,
    fee: u64,
    change_address: &Address,
) -> Result<Transaction, TransactionError> {
    if amount == 0 {
        return Err(TransactionError::InvalidAmount(
            "amount must be positive".to_string(),
        ));
    }
    let required = amount.checked_add(fee).ok_or_else(|| {
        TransactionError::InvalidAmount(format!("{} + {} overflows", amount, fee))
    })?;

    let mut seen = HashSet::with_capacity(selection.len());
    let mut available: u64 = 0;
    let mut tx = Transaction::new();
    for utxo in &selection.utxos {
        if !seen.insert(utxo.outpoint()) {
            return Err(TransactionError::InvalidTransaction(format!(
                "outpoint {}:{} selected twice",
                utxo.txid_hex(),
                utxo.vout
            )));
        }
        available = available.checked_add(utxo.satoshis).ok_or_else(|| {
            TransactionError::InvalidTransaction("selected values overflow".to_string())
        })?;
        tx.add_input(utxo.to_input());
    }

    let change = available
        .checked_sub(required)
        .ok_or(TransactionError::InsufficientFunds { available, required })?;

    tx.add_output(TransactionOutput::new(amount, p2pkh::lock(recipient)));
    if change > 0 {
        tx.add_output(TransactionOutput::new(change, p2pkh::lock(change_address)));
    }

    debug!(
        inputs = tx.input_count(),
        outputs = tx.output_count(),
        amount,
        fee,
        change,
        "assembled transaction"
    );
    Ok(tx)
}
