//! Key and address text codecs at the operator boundary.
//!
//! Everything typed by the operator passes through here before the
//! engine sees it, so malformed or wrong-network input never reaches
//! transaction assembly.

use btc_primitives::ec::PrivateKey;
use btc_script::Address;

use crate::WalletError;

/// Parse a mainnet WIF private key (compressed or uncompressed).
pub fn parse_key(wif: &str) -> Result<PrivateKey, WalletError> {
    PrivateKey::from_wif(wif.trim())
        .map_err(|e| WalletError::InvalidPrivateKeyFormat(e.to_string()))
}

/// The P2PKH address of `key`, using the key's public key encoding.
pub fn derive_address(key: &PrivateKey) -> Address {
    Address::from_public_key(&key.pub_key())
}

/// Parse and validate a mainnet P2PKH address.
pub fn parse_address(text: &str) -> Result<Address, WalletError> {
    Address::from_string(text).map_err(|e| WalletError::InvalidAddressFormat(e.to_string()))
}

pub fn address_to_text(address: &Address) -> String {
    address.to_string()
}

/// A fresh random key, compressed.
pub fn generate_key() -> PrivateKey {
    PrivateKey::generate()
}
