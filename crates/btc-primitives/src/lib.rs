/// Bitcoin wallet primitives - hashing, encoding, keys and wire helpers.
///
/// This crate provides the foundational building blocks for the wallet:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
/// - Base58 and Base58Check encoding
/// - secp256k1 private keys (WIF), public keys and DER signatures
/// - Variable-length integers and little-endian byte readers/writers

pub mod hash;
pub mod util;
pub mod base58;
pub mod ec;

mod error;
pub use error::PrimitivesError;
