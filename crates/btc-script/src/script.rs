//! Bitcoin script as a byte vector newtype.
//!
//! Scripts appear in outputs (locking) and inputs (unlocking). The wallet
//! only ever builds pay-to-public-key-hash locking scripts and
//! `<sig> <pubkey>` unlocking scripts, but parses arbitrary scripts it is
//! handed by the ledger provider.

use std::fmt;

use crate::chunk::{decode_script, encode_chunks, push_data_prefix, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// A Bitcoin script.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Script(Vec<u8>);

impl Script {
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Decode a script from hex, e.g. `"76a914...88ac"`.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        Ok(Script(hex::decode(hex_str)?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Build `OP_DUP OP_HASH160 <pkh> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn new_p2pkh(public_key_hash: &[u8; 20]) -> Self {
        let mut b = Vec::with_capacity(25);
        b.extend_from_slice(&[OP_DUP, OP_HASH160, OP_DATA_20]);
        b.extend_from_slice(public_key_hash);
        b.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Script(b)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Human-readable assembly. Empty for scripts that fail to parse.
    pub fn to_asm(&self) -> String {
        match self.chunks() {
            Ok(chunks) => chunks
                .iter()
                .map(ScriptChunk::to_asm_string)
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => String::new(),
        }
    }

    /// Check for the exact 25-byte pay-to-public-key-hash pattern.
    pub fn is_p2pkh(&self) -> bool {
        let b = &self.0;
        b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// True when every chunk is a push. Unparseable scripts are not push-only.
    pub fn is_push_only(&self) -> bool {
        match self.chunks() {
            Ok(chunks) => chunks.iter().all(ScriptChunk::is_push),
            Err(_) => false,
        }
    }

    /// The 20-byte hash locked by a P2PKH script.
    pub fn public_key_hash(&self) -> Result<[u8; 20], ScriptError> {
        if !self.is_p2pkh() {
            return Err(ScriptError::NotP2PKH);
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&self.0[3..23]);
        Ok(out)
    }

    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    /// Append `data` with the minimal push prefix.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append non-push opcodes. Push opcodes must go through `append_push_data`.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<(), ScriptError> {
        if let Some(op) = opcodes
            .iter()
            .find(|op| (0x01..=OP_PUSHDATA4).contains(*op))
        {
            return Err(ScriptError::InvalidOpcodeType(opcode_to_string(*op)));
        }
        self.0.extend_from_slice(opcodes);
        Ok(())
    }

    /// Copy of this script with every occurrence of `op` removed.
    ///
    /// Pushes are skipped whole, so a data byte equal to `op` is never
    /// touched. Scripts that do not parse are returned unchanged.
    pub fn remove_opcode(&self, op: u8) -> Script {
        match self.chunks() {
            Ok(mut chunks) => {
                chunks.retain(|c| !(c.data.is_none() && c.op == op));
                Script(encode_chunks(&chunks))
            }
            Err(_) => self.clone(),
        }
    }

    /// Copy of this script with every minimal push of `data` removed.
    pub fn find_and_delete(&self, data: &[u8]) -> Script {
        let target = match ScriptChunk::push(data) {
            Ok(chunk) => chunk,
            Err(_) => return self.clone(),
        };
        match self.chunks() {
            Ok(mut chunks) => {
                chunks.retain(|c| *c != target);
                Script(encode_chunks(&chunks))
            }
            Err(_) => self.clone(),
        }
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
