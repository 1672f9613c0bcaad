//! Pay-to-public-key-hash addresses.
//!
//! The wallet pays to and receives on mainnet P2PKH addresses only: version
//! byte `0x00` followed by a 20-byte Hash160, Base58Check encoded. Other
//! well-formed addresses are recognised so they can be refused with a
//! precise reason.

use std::fmt;
use std::str::FromStr;

use btc_primitives::base58;
use btc_primitives::ec::PublicKey;
use btc_primitives::PrimitivesError;

use crate::{Script, ScriptError};

/// Mainnet P2PKH version byte.
pub const MAINNET_P2PKH: u8 = 0x00;
/// Mainnet P2SH version byte.
pub const MAINNET_P2SH: u8 = 0x05;
/// Testnet P2PKH version byte.
pub const TESTNET_P2PKH: u8 = 0x6f;
/// Testnet P2SH version byte.
pub const TESTNET_P2SH: u8 = 0xc4;

/// Version byte plus 20-byte hash.
const ADDRESS_PAYLOAD_LEN: usize = 21;

/// A mainnet P2PKH address.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    /// The Base58Check text form.
    pub address_string: String,
    /// The 20-byte RIPEMD-160(SHA-256(pubkey)) hash.
    pub public_key_hash: [u8; 20],
}

impl Address {
    /// Parse and validate address text.
    ///
    /// # Returns
    /// - `InvalidAddress` for non-Base58 text or a wrong payload length
    /// - `AddressChecksum` for a corrupted checksum
    /// - `WrongNetwork` for testnet addresses
    /// - `UnsupportedAddress` for P2SH and unknown version bytes
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        let addr = addr.trim();
        if addr.is_empty() {
            return Err(ScriptError::InvalidAddress("empty address".to_string()));
        }
        let payload = base58::check_decode(addr).map_err(|e| match e {
            PrimitivesError::ChecksumMismatch => ScriptError::AddressChecksum,
            other => ScriptError::InvalidAddress(other.to_string()),
        })?;

        if payload.len() != ADDRESS_PAYLOAD_LEN {
            return Err(ScriptError::InvalidAddress(format!(
                "decoded length {} for '{}'",
                payload.len(),
                addr
            )));
        }

        match payload[0] {
            MAINNET_P2PKH => {}
            TESTNET_P2PKH | TESTNET_P2SH => {
                return Err(ScriptError::WrongNetwork(format!(
                    "'{}' is a testnet address",
                    addr
                )))
            }
            MAINNET_P2SH => {
                return Err(ScriptError::UnsupportedAddress(format!(
                    "'{}' is a pay-to-script-hash address",
                    addr
                )))
            }
            other => {
                return Err(ScriptError::UnsupportedAddress(format!(
                    "unknown version byte 0x{:02x}",
                    other
                )))
            }
        }

        let mut public_key_hash = [0u8; 20];
        public_key_hash.copy_from_slice(&payload[1..]);
        Ok(Address {
            address_string: addr.to_string(),
            public_key_hash,
        })
    }

    /// Encode a 20-byte public key hash as a mainnet address.
    pub fn from_public_key_hash(hash: &[u8; 20]) -> Self {
        let mut payload = Vec::with_capacity(ADDRESS_PAYLOAD_LEN);
        payload.push(MAINNET_P2PKH);
        payload.extend_from_slice(hash);
        Address {
            address_string: base58::check_encode(&payload),
            public_key_hash: *hash,
        }
    }

    /// The address of a public key, hashed in the key's own serialization.
    pub fn from_public_key(pub_key: &PublicKey) -> Self {
        Self::from_public_key_hash(&pub_key.hash160())
    }

    /// The P2PKH locking script paying to this address.
    pub fn locking_script(&self) -> Script {
        Script::new_p2pkh(&self.public_key_hash)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address_string)
    }
}

impl FromStr for Address {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_string(s)
    }
}
