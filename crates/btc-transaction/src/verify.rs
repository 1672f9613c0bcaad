//! Pre-broadcast verification.
//!
//! Every input's unlocking script is executed against the locking script
//! of the output it spends. `OP_CHECKSIG` recomputes the same legacy
//! digest the signer used, through [`SighashContext`].

use btc_primitives::ec::{PublicKey, Signature};
use btc_script::interpreter::{Engine, InterpreterError, InterpreterErrorCode, TxContext};
use btc_script::Script;
use tracing::warn;

use crate::sighash::{self, SIGHASH_ALL};
use crate::transaction::Transaction;
use crate::TransactionError;

/// Checks signatures against the legacy digest of one transaction.
pub struct SighashContext<'a> {
    tx: &'a Transaction,
}

impl<'a> SighashContext<'a> {
    pub fn new(tx: &'a Transaction) -> Self {
        SighashContext { tx }
    }
}

impl TxContext for SighashContext<'_> {
    fn verify_signature(
        &self,
        full_sig: &[u8],
        pub_key: &[u8],
        sub_script: &Script,
        input_idx: usize,
    ) -> Result<bool, InterpreterError> {
        let (hash_type, der) = match full_sig.split_last() {
            Some((ht, der)) => (u32::from(*ht), der),
            None => return Ok(false),
        };
        if hash_type != SIGHASH_ALL {
            return Ok(false);
        }
        let (sig, key) = match (Signature::from_der(der), PublicKey::from_bytes(pub_key)) {
            (Ok(sig), Ok(key)) => (sig, key),
            _ => return Ok(false),
        };
        let digest = sighash::signature_hash(self.tx, input_idx, sub_script, hash_type)
            .map_err(|e| {
                InterpreterError::new(InterpreterErrorCode::InvalidParams, e.to_string())
            })?;
        Ok(key.verify(&digest, &sig))
    }
}

/// Verify one input.
///
/// # Returns
/// `InvalidTransaction` naming the reason the input does not validate.
pub fn verify_input(tx: &Transaction, input_index: usize) -> Result<(), TransactionError> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        TransactionError::InvalidTransaction(format!("no input {}", input_index))
    })?;
    let source = input.source_output().ok_or_else(|| {
        TransactionError::InvalidTransaction(format!(
            "missing source output on input {}",
            input_index
        ))
    })?;
    let ctx = SighashContext::new(tx);
    Engine::new()
        .execute(
            &input.unlocking_script,
            &source.locking_script,
            Some(&ctx),
            input_index,
        )
        .map_err(|e| {
            TransactionError::InvalidTransaction(format!("input {}: {}", input_index, e))
        })
}

/// Verify every input and that outputs do not exceed inputs.
///
/// Never errors: any failure is logged and reported as `false`.
pub fn verify(tx: &Transaction) -> bool {
    if tx.inputs.is_empty() || tx.outputs.is_empty() {
        warn!("verification failed: transaction has no inputs or no outputs");
        return false;
    }
    if let Err(e) = tx.fee() {
        warn!(error = %e, "verification failed");
        return false;
    }
    for idx in 0..tx.inputs.len() {
        if let Err(e) = verify_input(tx, idx) {
            warn!(input = idx, error = %e, "verification failed");
            return false;
        }
    }
    true
}
