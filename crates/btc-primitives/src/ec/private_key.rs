//! secp256k1 private keys and Wallet Import Format.

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::base58;
use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Length of a raw private key scalar.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// WIF version byte for mainnet keys.
pub const MAINNET_WIF_PREFIX: u8 = 0x80;

/// WIF version byte for testnet keys. Recognised only to reject it clearly.
pub const TESTNET_WIF_PREFIX: u8 = 0xef;

/// Suffix marking a WIF whose public key is serialized compressed.
const COMPRESS_MAGIC: u8 = 0x01;

/// A secp256k1 private key.
///
/// Carries the public key format it was created for, so that a key imported
/// from an uncompressed WIF keeps deriving the same address and the same
/// unlocking-script public key.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
    compressed: bool,
}

impl PrivateKey {
    /// Generate a fresh random key from the OS RNG, using compressed format.
    pub fn generate() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
            compressed: true,
        }
    }

    /// Build a compressed-format key from a raw 32-byte scalar.
    ///
    /// # Returns
    /// `InvalidPrivateKey` when the length is wrong or the scalar is zero or
    /// not below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_bytes(bytes.into())
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey {
            inner,
            compressed: true,
        })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    /// Return the same scalar with the given public key format.
    pub fn with_compression(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    /// Decode a mainnet WIF string.
    ///
    /// The Base58Check payload is `0x80 || key` (uncompressed) or
    /// `0x80 || key || 0x01` (compressed).
    ///
    /// # Returns
    /// `ChecksumMismatch` for a bad checksum, `InvalidWif` for a wrong
    /// length, compression flag or network prefix.
    pub fn from_wif(wif: &str) -> Result<Self, PrimitivesError> {
        let mut payload = base58::check_decode(wif.trim()).map_err(|e| match e {
            PrimitivesError::ChecksumMismatch => e,
            other => PrimitivesError::InvalidWif(other.to_string()),
        })?;

        let compressed = match payload.len() {
            34 if payload[33] == COMPRESS_MAGIC => true,
            34 => {
                payload.zeroize();
                return Err(PrimitivesError::InvalidWif(
                    "invalid compression flag".to_string(),
                ));
            }
            33 => false,
            n => {
                payload.zeroize();
                return Err(PrimitivesError::InvalidWif(format!(
                    "invalid payload length {}",
                    n
                )));
            }
        };

        let prefix = payload[0];
        if prefix != MAINNET_WIF_PREFIX {
            payload.zeroize();
            let reason = if prefix == TESTNET_WIF_PREFIX {
                "testnet key, expected mainnet".to_string()
            } else {
                format!("unknown version byte 0x{:02x}", prefix)
            };
            return Err(PrimitivesError::InvalidWif(reason));
        }

        let key = Self::from_bytes(&payload[1..1 + PRIVATE_KEY_BYTES_LEN]);
        payload.zeroize();
        Ok(key?.with_compression(compressed))
    }

    /// Encode as a mainnet WIF string in this key's format.
    pub fn to_wif(&self) -> String {
        let mut payload = Vec::with_capacity(2 + PRIVATE_KEY_BYTES_LEN);
        payload.push(MAINNET_WIF_PREFIX);
        payload.extend_from_slice(&self.to_bytes());
        if self.compressed {
            payload.push(COMPRESS_MAGIC);
        }
        let wif = base58::check_encode(&payload);
        payload.zeroize();
        wif
    }

    /// The raw 32-byte big-endian scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// The matching public key, in this key's format.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(self.inner.verifying_key().clone(), self.compressed)
    }

    /// Sign a 32-byte digest (RFC6979, low-S).
    pub fn sign(&self, hash: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("compressed", &self.compressed)
            .finish_non_exhaustive()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes() && self.compressed == other.compressed
    }
}

impl Eq for PrivateKey {}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn test_wif_compressed_key_one() {
        let key = PrivateKey::from_wif("KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn")
            .unwrap();
        assert!(key.is_compressed());
        assert_eq!(hex::encode(key.to_bytes()), KEY_ONE);
        assert_eq!(
            key.pub_key().to_hex(),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(
            key.to_wif(),
            "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn"
        );
    }

    #[test]
    fn test_wif_uncompressed_key_one() {
        let key = PrivateKey::from_wif("5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf")
            .unwrap();
        assert!(!key.is_compressed());
        assert_eq!(hex::encode(key.to_bytes()), KEY_ONE);
        assert_eq!(key.pub_key().to_bytes().len(), 65);
        assert_eq!(
            key.to_wif(),
            "5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf"
        );
    }

    #[test]
    fn test_wif_uncompressed_known_key() {
        let key = PrivateKey::from_hex(
            "0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d",
        )
        .unwrap()
        .with_compression(false);
        assert_eq!(
            key.to_wif(),
            "5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ"
        );
        let parsed = PrivateKey::from_wif(&key.to_wif()).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_wif_rejects_testnet() {
        let mut payload = vec![TESTNET_WIF_PREFIX];
        payload.extend_from_slice(&hex::decode(KEY_ONE).unwrap());
        payload.push(COMPRESS_MAGIC);
        let testnet = base58::check_encode(&payload);
        match PrivateKey::from_wif(&testnet) {
            Err(PrimitivesError::InvalidWif(reason)) => assert!(reason.contains("testnet")),
            other => panic!("expected InvalidWif, got {:?}", other),
        }
    }

    #[test]
    fn test_wif_rejects_malformed() {
        assert!(PrivateKey::from_wif("").is_err());
        assert!(PrivateKey::from_wif("not a wif").is_err());
        // Valid checksum but the payload is an address, not a key.
        assert!(matches!(
            PrivateKey::from_wif("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"),
            Err(PrimitivesError::InvalidWif(_))
        ));
        // Bad compression flag.
        let mut payload = vec![MAINNET_WIF_PREFIX];
        payload.extend_from_slice(&hex::decode(KEY_ONE).unwrap());
        payload.push(0x02);
        assert!(PrivateKey::from_wif(&base58::check_encode(&payload)).is_err());
    }

    #[test]
    fn test_wif_rejects_bad_checksum() {
        let wif = "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWo";
        assert!(PrivateKey::from_wif(wif).is_err());
    }

    #[test]
    fn test_from_bytes_rejects_out_of_range() {
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(PrivateKey::from_bytes(&[0xffu8; 32]).is_err());
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
    }

    #[test]
    fn test_generate_round_trips_through_wif() {
        let key = PrivateKey::generate();
        assert!(key.is_compressed());
        let parsed = PrivateKey::from_wif(&key.to_wif()).unwrap();
        assert_eq!(parsed, key);
        assert_eq!(parsed.pub_key(), key.pub_key());
    }

    #[test]
    fn test_debug_hides_scalar() {
        let key = PrivateKey::from_hex(KEY_ONE).unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains(KEY_ONE));
    }
}
