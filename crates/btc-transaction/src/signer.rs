//! Signing of assembled transactions.
//!
//! Which key signs an input is decided by a [`KeyRing`] lookup on that
//! input's locking script, so a single-key wallet and a multi-key store
//! go through the same path.

use std::collections::HashMap;

use btc_primitives::ec::PrivateKey;
use btc_script::Script;
use tracing::debug;

use crate::template::p2pkh;
use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Maps a locking script to the key able to spend it.
pub trait KeyRing {
    fn key_for(&self, locking_script: &Script) -> Option<&PrivateKey>;
}

impl KeyRing for PrivateKey {
    fn key_for(&self, locking_script: &Script) -> Option<&PrivateKey> {
        match locking_script.public_key_hash() {
            Ok(pkh) if pkh == self.pub_key().hash160() => Some(self),
            _ => None,
        }
    }
}

/// Several keys indexed by the Hash160 of their public key.
#[derive(Default)]
pub struct KeyStore {
    keys: HashMap<[u8; 20], PrivateKey>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key`, replacing any key with the same public key hash.
    pub fn insert(&mut self, key: PrivateKey) {
        self.keys.insert(key.pub_key().hash160(), key);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyRing for KeyStore {
    fn key_for(&self, locking_script: &Script) -> Option<&PrivateKey> {
        let pkh = locking_script.public_key_hash().ok()?;
        self.keys.get(&pkh)
    }
}

impl FromIterator<PrivateKey> for KeyStore {
    fn from_iter<I: IntoIterator<Item = PrivateKey>>(iter: I) -> Self {
        let mut store = KeyStore::new();
        for key in iter {
            store.insert(key);
        }
        store
    }
}

/// Sign every input of `tx`, returning the signed copy.
///
/// # Returns
/// `SigningError` if an input lacks its source output or no key in `keys`
/// owns its locking script. Nothing is returned partially signed.
pub fn sign<K: KeyRing + ?Sized>(
    tx: &Transaction,
    keys: &K,
) -> Result<Transaction, TransactionError> {
    let mut signed = tx.clone();
    for (idx, input) in tx.inputs.iter().enumerate() {
        let source = input.source_output().ok_or_else(|| {
            TransactionError::SigningError(format!("missing source output on input {}", idx))
        })?;
        let key = keys.key_for(&source.locking_script).ok_or_else(|| {
            TransactionError::SigningError(format!(
                "no key owns input {} ({}:{})",
                idx,
                input.source_txid_hex(),
                input.source_tx_out_index
            ))
        })?;
        signed.inputs[idx].unlocking_script = p2pkh::unlock(key).sign(tx, idx)?;
    }
    debug!(inputs = signed.input_count(), size = signed.size(), "signed transaction");
    Ok(signed)
}
