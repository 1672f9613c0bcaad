//! Script interpreter.
//!
//! Runs an input's unlocking script followed by the locking script of the
//! output it spends, and succeeds when the final top stack item is true.
//! Only the opcodes that standard pay-to-public-key-hash spends and simple
//! hash puzzles need are implemented; anything else fails execution.
//!
//! The interpreter does not depend on the transaction crate. Callers
//! provide a [`TxContext`] that computes the signature digest and checks
//! signatures for `OP_CHECKSIG`.

pub mod error;
pub mod stack;
mod thread;

pub use error::{InterpreterError, InterpreterErrorCode};
pub use stack::Stack;
pub use thread::{MAX_OPS_PER_SCRIPT, MAX_SCRIPT_ELEMENT_SIZE, MAX_SCRIPT_SIZE};

use crate::Script;
use thread::Thread;

/// Signature checking on behalf of `OP_CHECKSIG`.
pub trait TxContext {
    /// Verify `full_sig` (DER signature followed by the hash type byte)
    /// against `pub_key` for input `input_idx`.
    ///
    /// `sub_script` is the script code to commit to, already stripped of
    /// the signature and of `OP_CODESEPARATOR`s.
    ///
    /// Returns Ok(true) if valid, Ok(false) if invalid, Err on failure.
    fn verify_signature(
        &self,
        full_sig: &[u8],
        pub_key: &[u8],
        sub_script: &Script,
        input_idx: usize,
    ) -> Result<bool, InterpreterError>;
}

/// The script execution engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Engine
    }

    /// Execute unlocking + locking scripts.
    ///
    /// # Arguments
    /// * `unlocking_script` - The input's unlocking script. Must be push-only.
    /// * `locking_script` - The spent output's locking script.
    /// * `tx_context` - Signature checker, required if `OP_CHECKSIG` runs.
    /// * `input_idx` - The input index being verified.
    pub fn execute(
        &self,
        unlocking_script: &Script,
        locking_script: &Script,
        tx_context: Option<&dyn TxContext>,
        input_idx: usize,
    ) -> Result<(), InterpreterError> {
        Thread::new(unlocking_script, locking_script, tx_context, input_idx)?.execute()
    }
}
