//! Script execution thread.

use btc_primitives::hash::{hash160, ripemd160, sha256, sha256d};

use crate::chunk::{encode_chunks, ScriptChunk};
use crate::opcodes::*;
use crate::Script;

use super::error::{InterpreterError, InterpreterErrorCode};
use super::stack::Stack;
use super::TxContext;

/// Largest script accepted for execution.
pub const MAX_SCRIPT_SIZE: usize = 10_000;
/// Largest single push.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;
/// Largest number of non-push opcodes per script.
pub const MAX_OPS_PER_SCRIPT: usize = 201;

/// Executes an unlocking script followed by a locking script on one stack.
pub(crate) struct Thread<'a> {
    dstack: Stack,
    /// Parsed unlocking script, then locking script.
    scripts: [Vec<ScriptChunk>; 2],
    script_idx: usize,
    /// Chunk index just past the most recent OP_CODESEPARATOR.
    last_code_sep: usize,
    num_ops: usize,
    tx_context: Option<&'a dyn TxContext>,
    input_idx: usize,
}

impl<'a> Thread<'a> {
    pub(crate) fn new(
        unlocking_script: &Script,
        locking_script: &Script,
        tx_context: Option<&'a dyn TxContext>,
        input_idx: usize,
    ) -> Result<Self, InterpreterError> {
        for (name, script) in [("unlocking", unlocking_script), ("locking", locking_script)] {
            if script.len() > MAX_SCRIPT_SIZE {
                return Err(InterpreterError::new(
                    InterpreterErrorCode::ScriptTooBig,
                    format!(
                        "{} script size {} is larger than the max allowed size {}",
                        name,
                        script.len(),
                        MAX_SCRIPT_SIZE
                    ),
                ));
            }
        }

        let parse = |script: &Script| {
            script.chunks().map_err(|e| {
                InterpreterError::new(InterpreterErrorCode::MalformedPush, e.to_string())
            })
        };
        let unlocking = parse(unlocking_script)?;
        let locking = parse(locking_script)?;

        if !unlocking.iter().all(ScriptChunk::is_push) {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NotPushOnly,
                "unlocking script is not push only",
            ));
        }

        Ok(Thread {
            dstack: Stack::new(),
            scripts: [unlocking, locking],
            script_idx: 0,
            last_code_sep: 0,
            num_ops: 0,
            tx_context,
            input_idx,
        })
    }

    /// Run both scripts and check that the top stack item is true.
    pub(crate) fn execute(&mut self) -> Result<(), InterpreterError> {
        for script_idx in 0..self.scripts.len() {
            self.script_idx = script_idx;
            self.last_code_sep = 0;
            self.num_ops = 0;
            for pc in 0..self.scripts[script_idx].len() {
                let chunk = self.scripts[script_idx][pc].clone();
                self.step(pc, &chunk)?;
            }
        }

        if self.dstack.depth() == 0 {
            return Err(InterpreterError::new(
                InterpreterErrorCode::EmptyStack,
                "stack empty at end of script execution",
            ));
        }
        if !self.dstack.pop_bool()? {
            return Err(InterpreterError::new(
                InterpreterErrorCode::EvalFalse,
                "false stack entry at end of script execution",
            ));
        }
        Ok(())
    }

    fn step(&mut self, pc: usize, chunk: &ScriptChunk) -> Result<(), InterpreterError> {
        if let Some(data) = &chunk.data {
            if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
                return Err(InterpreterError::new(
                    InterpreterErrorCode::ElementTooBig,
                    format!(
                        "element size {} exceeds max allowed size {}",
                        data.len(),
                        MAX_SCRIPT_ELEMENT_SIZE
                    ),
                ));
            }
            return self.dstack.push(data.clone());
        }

        if chunk.op > OP_16 {
            self.num_ops += 1;
            if self.num_ops > MAX_OPS_PER_SCRIPT {
                return Err(InterpreterError::new(
                    InterpreterErrorCode::TooManyOperations,
                    format!("exceeded max operation limit of {}", MAX_OPS_PER_SCRIPT),
                ));
            }
        }

        match chunk.op {
            OP_0 => self.dstack.push(Vec::new()),
            OP_1NEGATE => self.dstack.push(vec![0x81]),
            OP_1..=OP_16 => self.dstack.push(vec![chunk.op - OP_1 + 1]),
            OP_NOP => Ok(()),
            OP_VERIFY => self.verify(InterpreterErrorCode::Verify),
            OP_RETURN => Err(InterpreterError::new(
                InterpreterErrorCode::EarlyReturn,
                "script returned early",
            )),
            OP_DROP => self.dstack.pop().map(|_| ()),
            OP_DUP => {
                let top = self.dstack.peek(0)?.to_vec();
                self.dstack.push(top)
            }
            OP_SWAP => self.dstack.swap_top(),
            OP_EQUAL => self.op_equal(),
            OP_EQUALVERIFY => {
                self.op_equal()?;
                self.verify(InterpreterErrorCode::EqualVerify)
            }
            OP_RIPEMD160 => self.hash_top(|d| ripemd160(d).to_vec()),
            OP_SHA256 => self.hash_top(|d| sha256(d).to_vec()),
            OP_HASH160 => self.hash_top(|d| hash160(d).to_vec()),
            OP_HASH256 => self.hash_top(|d| sha256d(d).to_vec()),
            OP_CODESEPARATOR => {
                self.last_code_sep = pc + 1;
                Ok(())
            }
            OP_CHECKSIG => self.op_checksig(),
            OP_CHECKSIGVERIFY => {
                self.op_checksig()?;
                self.verify(InterpreterErrorCode::CheckSigVerify)
            }
            OP_RESERVED => Err(InterpreterError::new(
                InterpreterErrorCode::ReservedOpcode,
                "attempt to execute reserved opcode OP_RESERVED",
            )),
            op => Err(InterpreterError::new(
                InterpreterErrorCode::UnsupportedOpcode,
                format!("unsupported opcode 0x{:02x}", op),
            )),
        }
    }

    fn verify(&mut self, code: InterpreterErrorCode) -> Result<(), InterpreterError> {
        if self.dstack.pop_bool()? {
            Ok(())
        } else {
            Err(InterpreterError::new(code, format!("{} failed", code)))
        }
    }

    fn op_equal(&mut self) -> Result<(), InterpreterError> {
        let a = self.dstack.pop()?;
        let b = self.dstack.pop()?;
        self.dstack.push_bool(a == b)
    }

    fn hash_top(&mut self, f: impl Fn(&[u8]) -> Vec<u8>) -> Result<(), InterpreterError> {
        let data = self.dstack.pop()?;
        self.dstack.push(f(&data))
    }

    /// The part of the executing script after the last OP_CODESEPARATOR,
    /// with the signature pushes and remaining separators removed.
    fn sub_script(&self, full_sig: &[u8]) -> Script {
        let chunks = &self.scripts[self.script_idx][self.last_code_sep..];
        Script::from(encode_chunks(chunks))
            .find_and_delete(full_sig)
            .remove_opcode(OP_CODESEPARATOR)
    }

    fn op_checksig(&mut self) -> Result<(), InterpreterError> {
        let pub_key = self.dstack.pop()?;
        let full_sig = self.dstack.pop()?;

        if full_sig.is_empty() {
            return self.dstack.push_bool(false);
        }

        let ctx = self.tx_context.ok_or_else(|| {
            InterpreterError::new(
                InterpreterErrorCode::InvalidParams,
                "no tx context for checksig",
            )
        })?;

        let sub_script = self.sub_script(&full_sig);
        let valid = ctx
            .verify_signature(&full_sig, &pub_key, &sub_script, self.input_idx)
            .unwrap_or(false);
        self.dstack.push_bool(valid)
    }
}
