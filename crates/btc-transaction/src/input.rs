//! Transaction input referencing a previous output.
//!
//! Besides its wire fields an input can carry the output it spends
//! (value and locking script). That data never goes on the wire, but the
//! signer and verifier need it to compute signature digests.

use btc_primitives::util::{ByteReader, ByteWriter};
use btc_script::Script;

use crate::output::TransactionOutput;
use crate::TransactionError;

/// Sequence number that opts out of relative lock-time and replacement.
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A transaction input.
///
/// Equality compares the wire fields only; the attached source output is
/// ignored so that a parsed transaction equals the one it was encoded from.
#[derive(Clone, Debug)]
pub struct TransactionInput {
    /// Txid of the spent output, in internal (hash) byte order.
    pub source_txid: [u8; 32],
    pub source_tx_out_index: u32,
    pub sequence_number: u32,
    /// Empty until the input is signed.
    pub unlocking_script: Script,
    source_output: Option<TransactionOutput>,
}

impl TransactionInput {
    /// An unsigned input spending `source_txid:vout`.
    pub fn new(source_txid: [u8; 32], source_tx_out_index: u32) -> Self {
        TransactionInput {
            source_txid,
            source_tx_out_index,
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
            unlocking_script: Script::new(),
            source_output: None,
        }
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let source_txid = reader.read_array::<32>().map_err(|e| {
            TransactionError::SerializationError(format!("reading source txid: {}", e))
        })?;
        let source_tx_out_index = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading output index: {}", e))
        })?;
        let script_len = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading script length: {}", e))
        })?;
        let script_bytes = reader.read_bytes(script_len.value() as usize).map_err(|e| {
            TransactionError::SerializationError(format!("reading unlocking script: {}", e))
        })?;
        let sequence_number = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading sequence number: {}", e))
        })?;

        Ok(TransactionInput {
            source_txid,
            source_tx_out_index,
            sequence_number,
            unlocking_script: Script::from_bytes(script_bytes),
            source_output: None,
        })
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        self.write_with_script(writer, &self.unlocking_script);
    }

    /// Write the input with `script` in place of its unlocking script.
    pub(crate) fn write_with_script(&self, writer: &mut ByteWriter, script: &Script) {
        writer.write_bytes(&self.source_txid);
        writer.write_u32_le(self.source_tx_out_index);
        writer.write_var_bytes(script.to_bytes());
        writer.write_u32_le(self.sequence_number);
    }

    pub fn set_source_output(&mut self, output: Option<TransactionOutput>) {
        self.source_output = output;
    }

    pub fn source_output(&self) -> Option<&TransactionOutput> {
        self.source_output.as_ref()
    }

    pub fn source_satoshis(&self) -> Option<u64> {
        self.source_output.as_ref().map(|o| o.satoshis)
    }

    /// The spent txid in display (byte-reversed) hex.
    pub fn source_txid_hex(&self) -> String {
        let mut id = self.source_txid;
        id.reverse();
        hex::encode(id)
    }
}

impl PartialEq for TransactionInput {
    fn eq(&self, other: &Self) -> bool {
        self.source_txid == other.source_txid
            && self.source_tx_out_index == other.source_tx_out_index
            && self.sequence_number == other.sequence_number
            && self.unlocking_script == other.unlocking_script
    }
}

impl Eq for TransactionInput {}
