//! Unspent outputs supplied by the ledger provider.

use btc_script::Script;

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::TransactionError;

/// A spendable prior output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnspentOutput {
    /// Txid of the transaction that created the output, internal byte order.
    pub txid: [u8; 32],
    pub vout: u32,
    pub satoshis: u64,
    pub locking_script: Script,
}

impl UnspentOutput {
    pub fn new(txid: [u8; 32], vout: u32, satoshis: u64, locking_script: Script) -> Self {
        UnspentOutput {
            txid,
            vout,
            satoshis,
            locking_script,
        }
    }

    /// Build from a txid in display (byte-reversed) hex, as block explorers
    /// and the ledger API report it.
    pub fn from_hex_txid(
        txid_hex: &str,
        vout: u32,
        satoshis: u64,
        locking_script: Script,
    ) -> Result<Self, TransactionError> {
        let bytes = hex::decode(txid_hex).map_err(|e| {
            TransactionError::SerializationError(format!("invalid txid hex: {}", e))
        })?;
        let mut txid: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            TransactionError::SerializationError(format!(
                "txid must be 32 bytes, got {}",
                b.len()
            ))
        })?;
        txid.reverse();
        Ok(Self::new(txid, vout, satoshis, locking_script))
    }

    /// The txid in display hex.
    pub fn txid_hex(&self) -> String {
        let mut id = self.txid;
        id.reverse();
        hex::encode(id)
    }

    /// `(txid, vout)` identifying the output on chain.
    pub fn outpoint(&self) -> ([u8; 32], u32) {
        (self.txid, self.vout)
    }

    /// An unsigned input spending this output, with the output attached
    /// for signing and verification.
    pub fn to_input(&self) -> TransactionInput {
        let mut input = TransactionInput::new(self.txid, self.vout);
        input.set_source_output(Some(TransactionOutput::new(
            self.satoshis,
            self.locking_script.clone(),
        )));
        input
    }
}
