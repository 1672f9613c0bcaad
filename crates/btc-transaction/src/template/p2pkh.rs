//! Pay-to-Public-Key-Hash (P2PKH) script template.
//!
//! Creates standard P2PKH locking scripts (`OP_DUP OP_HASH160 <hash>
//! OP_EQUALVERIFY OP_CHECKSIG`) and unlocking scripts (`<sig> <pubkey>`).

use btc_primitives::ec::PrivateKey;
use btc_script::{Address, Script};
use tracing::trace;

use crate::sighash::SIGHASH_ALL;
use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Unlocking script size with a compressed key:
/// push(1) + DER signature with hash type (<= 73) + push(1) + key(33).
pub const COMPRESSED_UNLOCK_LEN: usize = 1 + 73 + 1 + 33;

/// Same as [`COMPRESSED_UNLOCK_LEN`] for a 65-byte uncompressed key.
pub const UNCOMPRESSED_UNLOCK_LEN: usize = 1 + 73 + 1 + 65;

/// Create the P2PKH locking script paying `address`.
pub fn lock(address: &Address) -> Script {
    Script::new_p2pkh(&address.public_key_hash)
}

/// Create a P2PKH unlocker that signs with `private_key` using `SIGHASH_ALL`.
pub fn unlock(private_key: &PrivateKey) -> P2PKH<'_> {
    P2PKH { private_key }
}

/// P2PKH signing template borrowing the key it signs with.
pub struct P2PKH<'a> {
    private_key: &'a PrivateKey,
}

impl UnlockingScriptTemplate for P2PKH<'_> {
    /// Sign input `input_index` and build `<DER sig || 0x01> <pubkey>`.
    ///
    /// The public key is pushed in the key's own encoding so that its
    /// Hash160 matches the address the key derives.
    ///
    /// # Returns
    /// `SigningError` if the input is out of range, lacks its source output,
    /// or is locked to a different public key hash.
    fn sign(&self, tx: &Transaction, input_index: usize) -> Result<Script, TransactionError> {
        let input = tx.inputs.get(input_index).ok_or_else(|| {
            TransactionError::SigningError(format!(
                "input index {} out of range (tx has {} inputs)",
                input_index,
                tx.inputs.len()
            ))
        })?;
        let source = input.source_output().ok_or_else(|| {
            TransactionError::SigningError(format!(
                "missing source output on input {}",
                input_index
            ))
        })?;

        let pub_key = self.private_key.pub_key();
        let owner = source.locking_script.public_key_hash().map_err(|_| {
            TransactionError::SigningError(format!(
                "input {} is not locked to a public key hash",
                input_index
            ))
        })?;
        if owner != pub_key.hash160() {
            return Err(TransactionError::SigningError(format!(
                "key does not own input {} (locked to {})",
                input_index,
                hex::encode(owner)
            )));
        }

        let sig_hash = tx.calc_input_signature_hash(input_index, SIGHASH_ALL)?;
        let signature = self.private_key.sign(&sig_hash)?;

        let mut sig_buf = signature.to_der();
        sig_buf.push(SIGHASH_ALL as u8);

        let mut script = Script::new();
        script.append_push_data(&sig_buf)?;
        script.append_push_data(&pub_key.to_bytes())?;

        trace!(input = input_index, len = script.len(), "signed input");
        Ok(script)
    }

    fn estimate_length(&self, _tx: &Transaction, _input_index: usize) -> usize {
        if self.private_key.is_compressed() {
            COMPRESSED_UNLOCK_LEN
        } else {
            UNCOMPRESSED_UNLOCK_LEN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TransactionInput;
    use crate::output::TransactionOutput;

    fn spend_from(key: &PrivateKey, sats: u64) -> Transaction {
        let lock_script = lock(&Address::from_public_key(&key.pub_key()));
        let mut input = TransactionInput::new([0x42; 32], 1);
        input.set_source_output(Some(TransactionOutput::new(sats, lock_script)));
        let mut tx = Transaction::new();
        tx.add_input(input);
        tx.add_output(TransactionOutput::new(sats - 1000, Script::new_p2pkh(&[0x01; 20])));
        tx
    }

    #[test]
    fn test_lock_matches_address() {
        let addr = Address::from_string("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH").unwrap();
        let script = lock(&addr);
        assert!(script.is_p2pkh());
        assert_eq!(
            script.to_hex(),
            "76a914751e76e8199196d454941c45d1b3a323f1433bd688ac"
        );
    }

    #[test]
    fn test_unlocking_script_shape() {
        let key = PrivateKey::from_bytes(&[0x07; 32]).unwrap();
        let tx = spend_from(&key, 50_000);
        let script = unlock(&key).sign(&tx, 0).unwrap();

        let chunks = script.chunks().unwrap();
        assert_eq!(chunks.len(), 2);
        let sig = chunks[0].data.as_ref().unwrap();
        assert_eq!(*sig.last().unwrap(), SIGHASH_ALL as u8);
        assert_eq!(chunks[1].data.as_deref(), Some(&key.pub_key().to_bytes()[..]));
        assert!(script.len() <= unlock(&key).estimate_length(&tx, 0));
    }

    #[test]
    fn test_uncompressed_key_pushes_uncompressed_pubkey() {
        let key = PrivateKey::from_bytes(&[0x09; 32])
            .unwrap()
            .with_compression(false);
        let tx = spend_from(&key, 50_000);
        let script = unlock(&key).sign(&tx, 0).unwrap();
        let chunks = script.chunks().unwrap();
        assert_eq!(chunks[1].data.as_ref().map(Vec::len), Some(65));
        assert!(script.len() <= UNCOMPRESSED_UNLOCK_LEN);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let key = PrivateKey::from_bytes(&[0x07; 32]).unwrap();
        let tx = spend_from(&key, 50_000);
        assert_eq!(
            unlock(&key).sign(&tx, 0).unwrap(),
            unlock(&key).sign(&tx, 0).unwrap()
        );
    }

    #[test]
    fn test_wrong_key_rejected() {
        let owner = PrivateKey::from_bytes(&[0x07; 32]).unwrap();
        let other = PrivateKey::from_bytes(&[0x08; 32]).unwrap();
        let tx = spend_from(&owner, 50_000);
        assert!(matches!(
            unlock(&other).sign(&tx, 0),
            Err(TransactionError::SigningError(_))
        ));
    }

    #[test]
    fn test_compression_mismatch_rejected() {
        let owner = PrivateKey::from_bytes(&[0x07; 32]).unwrap();
        let tx = spend_from(&owner, 50_000);
        let uncompressed = owner.clone().with_compression(false);
        assert!(unlock(&uncompressed).sign(&tx, 0).is_err());
    }

    #[test]
    fn test_missing_source_output() {
        let key = PrivateKey::from_bytes(&[0x07; 32]).unwrap();
        let mut tx = Transaction::new();
        tx.add_input(TransactionInput::new([0x42; 32], 0));
        assert!(matches!(
            unlock(&key).sign(&tx, 0),
            Err(TransactionError::SigningError(_))
        ));
        assert!(unlock(&key).sign(&tx, 5).is_err());
    }
}
