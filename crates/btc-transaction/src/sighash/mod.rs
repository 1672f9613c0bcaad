//! Signature hash computation for transaction signing.
//!
//! Implements the legacy (pre-segwit) digest. Only `SIGHASH_ALL` is
//! produced or accepted: every input and every output is committed to.

use btc_primitives::hash::sha256d;
use btc_primitives::util::{ByteWriter, VarInt};
use btc_script::opcodes::OP_CODESEPARATOR;
use btc_script::Script;

use crate::transaction::Transaction;
use crate::TransactionError;

/// Sign all inputs and all outputs.
pub const SIGHASH_ALL: u32 = 0x01;

/// Compute the legacy signature hash for input `input_index`.
///
/// # Arguments
/// * `tx`          - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `script_code` - Locking script of the spent output.
/// * `hash_type`   - Must be `SIGHASH_ALL`.
///
/// # Returns
/// The double-SHA256 of the preimage, in the byte order ECDSA signs.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    hash_type: u32,
) -> Result<[u8; 32], TransactionError> {
    let preimage = calc_preimage(tx, input_index, script_code, hash_type)?;
    Ok(sha256d(&preimage))
}

/// Build the bytes hashed by [`signature_hash`].
///
/// The transaction is serialized with every unlocking script empty except
/// the one at `input_index`, which is replaced by `script_code` with its
/// `OP_CODESEPARATOR`s removed. The hash type follows as a u32 LE.
pub fn calc_preimage(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    hash_type: u32,
) -> Result<Vec<u8>, TransactionError> {
    if input_index >= tx.inputs.len() {
        return Err(TransactionError::InvalidTransaction(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        )));
    }
    if hash_type != SIGHASH_ALL {
        return Err(TransactionError::SigningError(format!(
            "unsupported sighash type 0x{:02x}",
            hash_type
        )));
    }

    let sub_script = script_code.remove_opcode(OP_CODESEPARATOR);
    let empty = Script::new();

    let mut writer = ByteWriter::with_capacity(tx.size() + sub_script.len() + 4);
    writer.write_u32_le(tx.version);

    writer.write_varint(VarInt::from(tx.inputs.len()));
    for (i, input) in tx.inputs.iter().enumerate() {
        let script = if i == input_index { &sub_script } else { &empty };
        input.write_with_script(&mut writer, script);
    }

    writer.write_varint(VarInt::from(tx.outputs.len()));
    for output in &tx.outputs {
        output.write_to(&mut writer);
    }

    writer.write_u32_le(tx.lock_time);
    writer.write_u32_le(hash_type);
    Ok(writer.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TransactionInput;
    use crate::output::TransactionOutput;
    use btc_script::opcodes::*;

    fn sample_tx() -> Transaction {
        let mut tx = Transaction::new();
        tx.add_input(TransactionInput::new([0x11; 32], 0));
        tx.add_input(TransactionInput::new([0x22; 32], 3));
        tx.add_output(TransactionOutput::new(5000, Script::new_p2pkh(&[0xaa; 20])));
        tx
    }

    #[test]
    fn test_preimage_layout() {
        let tx = sample_tx();
        let lock = Script::new_p2pkh(&[0xbb; 20]);
        let preimage = calc_preimage(&tx, 1, &lock, SIGHASH_ALL).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.push(2);
        expected.extend_from_slice(&[0x11; 32]);
        expected.extend_from_slice(&0u32.to_le_bytes());
        expected.push(0);
        expected.extend_from_slice(&[0xff; 4]);
        expected.extend_from_slice(&[0x22; 32]);
        expected.extend_from_slice(&3u32.to_le_bytes());
        expected.push(25);
        expected.extend_from_slice(lock.to_bytes());
        expected.extend_from_slice(&[0xff; 4]);
        expected.push(1);
        expected.extend_from_slice(&5000u64.to_le_bytes());
        expected.push(25);
        expected.extend_from_slice(Script::new_p2pkh(&[0xaa; 20]).to_bytes());
        expected.extend_from_slice(&0u32.to_le_bytes());
        expected.extend_from_slice(&1u32.to_le_bytes());

        assert_eq!(preimage, expected);
        assert_eq!(
            signature_hash(&tx, 1, &lock, SIGHASH_ALL).unwrap(),
            sha256d(&expected)
        );
    }

    #[test]
    fn test_signed_input_position_changes_digest() {
        let tx = sample_tx();
        let lock = Script::new_p2pkh(&[0xbb; 20]);
        let h0 = signature_hash(&tx, 0, &lock, SIGHASH_ALL).unwrap();
        let h1 = signature_hash(&tx, 1, &lock, SIGHASH_ALL).unwrap();
        assert_ne!(h0, h1);
    }

    #[test]
    fn test_existing_unlocking_scripts_ignored() {
        let tx = sample_tx();
        let mut signed = tx.clone();
        signed.inputs[0].unlocking_script = Script::from_bytes(&[0x01, 0x02]);
        let lock = Script::new_p2pkh(&[0xbb; 20]);
        assert_eq!(
            signature_hash(&tx, 1, &lock, SIGHASH_ALL).unwrap(),
            signature_hash(&signed, 1, &lock, SIGHASH_ALL).unwrap()
        );
    }

    #[test]
    fn test_codeseparator_removed() {
        let tx = sample_tx();
        let plain = Script::new_p2pkh(&[0xbb; 20]);
        let mut with_sep = Script::new();
        with_sep.append_opcodes(&[OP_CODESEPARATOR]).unwrap();
        let mut bytes = with_sep.to_bytes().to_vec();
        bytes.extend_from_slice(plain.to_bytes());
        let with_sep = Script::from_bytes(&bytes);

        assert_eq!(
            signature_hash(&tx, 0, &plain, SIGHASH_ALL).unwrap(),
            signature_hash(&tx, 0, &with_sep, SIGHASH_ALL).unwrap()
        );
    }

    #[test]
    fn test_rejects_other_hash_types() {
        let tx = sample_tx();
        let lock = Script::new_p2pkh(&[0xbb; 20]);
        for ht in [0x00, 0x02, 0x03, 0x41, 0x81] {
            assert!(
                signature_hash(&tx, 0, &lock, ht).is_err(),
                "hash type 0x{:02x} should be rejected",
                ht
            );
        }
    }

    #[test]
    fn test_index_out_of_range() {
        let tx = sample_tx();
        let lock = Script::new_p2pkh(&[0xbb; 20]);
        assert!(matches!(
            signature_hash(&tx, 2, &lock, SIGHASH_ALL),
            Err(TransactionError::InvalidTransaction(_))
        ));
    }
}
