//! Script templates for producing unlocking scripts.
//!
//! A template knows how to compute the signature hash for one input, sign
//! it and assemble the resulting unlocking script. It can also estimate
//! the script's size before signing, which size-aware fee policies need.

pub mod p2pkh;

use btc_script::Script;

use crate::transaction::Transaction;
use crate::TransactionError;

/// Trait for script templates that produce unlocking scripts.
pub trait UnlockingScriptTemplate {
    /// Produce an unlocking script for the given input.
    ///
    /// The input must carry its source output so the signature hash can
    /// commit to the locking script being spent.
    fn sign(&self, tx: &Transaction, input_index: usize) -> Result<Script, TransactionError>;

    /// Upper bound on the byte length of the unlocking script.
    fn estimate_length(&self, tx: &Transaction, input_index: usize) -> usize;
}
