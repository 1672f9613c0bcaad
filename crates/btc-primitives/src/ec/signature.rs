//! ECDSA signatures over secp256k1 in strict DER form.
//!
//! Signing is deterministic (RFC6979) and always yields a low-S value.
//! Parsing accepts only canonical DER as consensus requires for
//! transaction signatures.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// The secp256k1 group order n.
const CURVE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// n / 2, the largest S value considered low.
const HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// Longest DER signature: two 33-byte integers plus six header bytes.
const MAX_DER_LEN: usize = 72;
const MIN_DER_LEN: usize = 8;

/// An ECDSA signature as a pair of 32-byte big-endian integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Sign a 32-byte digest with RFC6979 nonces, normalized to low-S.
    pub fn sign(hash: &[u8; 32], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let sig: ecdsa::Signature = priv_key
            .signing_key()
            .sign_prehash(hash)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let (r_bytes, s_bytes) = sig.split_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&r_bytes);
        s.copy_from_slice(&s_bytes);
        Ok(Signature { r, s }.normalize_s())
    }

    /// Verify against a 32-byte digest. High-S signatures never verify.
    pub fn verify(&self, hash: &[u8; 32], pub_key: &PublicKey) -> bool {
        if !self.is_low_s() {
            return false;
        }
        let sig = match ecdsa::Signature::from_scalars(
            k256::FieldBytes::from(self.r),
            k256::FieldBytes::from(self.s),
        ) {
            Ok(sig) => sig,
            Err(_) => return false,
        };
        pub_key.verifying_key().verify_prehash(hash, &sig).is_ok()
    }

    /// True when S is at most half the curve order.
    pub fn is_low_s(&self) -> bool {
        self.s <= HALF_ORDER
    }

    /// Replace a high S with n - S. Low-S signatures are returned unchanged.
    pub fn normalize_s(self) -> Self {
        if self.is_low_s() {
            self
        } else {
            Signature {
                r: self.r,
                s: subtract_from_order(&self.s),
            }
        }
    }

    /// Parse a strict DER encoding.
    ///
    /// Rejects negative integers, superfluous leading zeros, zero values,
    /// length mismatches and trailing bytes.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let bad = |msg: &str| PrimitivesError::InvalidSignature(msg.to_string());

        if bytes.len() < MIN_DER_LEN || bytes.len() > MAX_DER_LEN {
            return Err(bad("invalid DER length"));
        }
        if bytes[0] != 0x30 {
            return Err(bad("missing sequence marker"));
        }
        if bytes[1] as usize != bytes.len() - 2 {
            return Err(bad("sequence length mismatch"));
        }

        let (r, rest) = read_der_integer(&bytes[2..])?;
        let (s, rest) = read_der_integer(rest)?;
        if !rest.is_empty() {
            return Err(bad("trailing bytes after S"));
        }
        Ok(Signature { r, s })
    }

    /// Serialize to DER with minimal integer encodings.
    pub fn to_der(&self) -> Vec<u8> {
        let r = canonical_int(&self.r);
        let s = canonical_int(&self.s);
        let mut out = Vec::with_capacity(6 + r.len() + s.len());
        out.push(0x30);
        out.push((4 + r.len() + s.len()) as u8);
        out.push(0x02);
        out.push(r.len() as u8);
        out.extend_from_slice(&r);
        out.push(0x02);
        out.push(s.len() as u8);
        out.extend_from_slice(&s);
        out
    }
}

/// Read one `0x02 len value` integer, returning it left-padded to 32 bytes.
fn read_der_integer(data: &[u8]) -> Result<([u8; 32], &[u8]), PrimitivesError> {
    let bad = |msg: &str| PrimitivesError::InvalidSignature(msg.to_string());

    if data.len() < 2 || data[0] != 0x02 {
        return Err(bad("missing integer marker"));
    }
    let len = data[1] as usize;
    if len == 0 {
        return Err(bad("zero-length integer"));
    }
    if data.len() < 2 + len {
        return Err(bad("integer overruns signature"));
    }
    let value = &data[2..2 + len];
    if value[0] & 0x80 != 0 {
        return Err(bad("negative integer"));
    }
    if len > 1 && value[0] == 0x00 && value[1] & 0x80 == 0 {
        return Err(bad("non-minimal integer padding"));
    }

    let digits = if value[0] == 0x00 { &value[1..] } else { value };
    if digits.len() > 32 {
        return Err(bad("integer larger than 32 bytes"));
    }
    let mut out = [0u8; 32];
    out[32 - digits.len()..].copy_from_slice(digits);
    if out == [0u8; 32] {
        return Err(bad("integer is zero"));
    }
    Ok((out, &data[2 + len..]))
}

/// Minimal big-endian encoding, with a 0x00 pad when the high bit is set.
fn canonical_int(val: &[u8; 32]) -> Vec<u8> {
    let start = val.iter().position(|b| *b != 0).unwrap_or(31);
    let digits = &val[start..];
    let mut out = Vec::with_capacity(33);
    if digits[0] & 0x80 != 0 {
        out.push(0x00);
    }
    out.extend_from_slice(digits);
    out
}

/// Compute n - val for 256-bit big-endian integers.
fn subtract_from_order(val: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = CURVE_ORDER[i] as i16 - val[i] as i16 - borrow;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out[i] = diff as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    fn hex_to_32(s: &str) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&hex::decode(s).unwrap());
        out
    }

    const MAINNET_SIG: &str = "304402204e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd410220181522ec8eca07de4860a4acdd12909d831cc56cbbac4622082221a8768d1d09";

    #[test]
    fn test_der_parse_valid() {
        let der = hex::decode(MAINNET_SIG).unwrap();
        let sig = Signature::from_der(&der).unwrap();
        assert_eq!(
            sig.r(),
            &hex_to_32("4e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd41")
        );
        assert_eq!(sig.to_der(), der);
    }

    #[test]
    fn test_der_parse_rejects_malformed() {
        let der = hex::decode(MAINNET_SIG).unwrap();

        assert!(Signature::from_der(&[]).is_err());

        let mut bad_magic = der.clone();
        bad_magic[0] = 0x31;
        assert!(Signature::from_der(&bad_magic).is_err());

        let mut bad_marker = der.clone();
        bad_marker[2] = 0x03;
        assert!(Signature::from_der(&bad_marker).is_err());

        let mut bad_len = der.clone();
        bad_len[1] = 0x45;
        assert!(Signature::from_der(&bad_len).is_err());

        let mut trailing = der.clone();
        trailing.push(0x00);
        assert!(Signature::from_der(&trailing).is_err());

        let mut negative_r = der.clone();
        negative_r[4] = 0x80;
        assert!(Signature::from_der(&negative_r).is_err());
    }

    #[test]
    fn test_der_parse_rejects_padding_and_zero() {
        // R padded with an unnecessary 0x00.
        let padded = hex::decode("300702020001020101").unwrap();
        assert!(Signature::from_der(&padded).is_err());
        // R = 0.
        let zero = hex::decode("3006020100020101").unwrap();
        assert!(Signature::from_der(&zero).is_err());
        // Smallest well-formed signature.
        let ok = hex::decode("3006020101020101").unwrap();
        assert!(Signature::from_der(&ok).is_ok());
    }

    #[test]
    fn test_normalize_high_s() {
        let sig = Signature::new(
            hex_to_32("a196ed0e7ebcbe7b63fe1d8eecbdbde03a67ceba4fc8f6482bdcb9606a911404"),
            hex_to_32("971729c7fa944b465b35250c6570a2f31acbb14b13d1565fab7330dcb2b3dfb1"),
        );
        assert!(!sig.is_low_s());
        let expected = "3045022100a196ed0e7ebcbe7b63fe1d8eecbdbde03a67ceba4fc8f6482bdcb9606a911404022068e8d638056bb4b9a4cadaf39a8f5d0b9fe32b9b9b7749dc145f2db01d826190";
        let normalized = sig.normalize_s();
        assert!(normalized.is_low_s());
        assert_eq!(hex::encode(normalized.to_der()), expected);
    }

    #[test]
    fn test_rfc6979_vectors() {
        let cases = [
            (
                "cca9fbcc1b41e5a95d369eaa6ddcff73b61a4efaa279cfc6567e8daa39cbaf50",
                "sample",
                "3045022100af340daf02cc15c8d5d08d7735dfe6b98a474ed373bdb5fbecf7571be52b384202205009fb27f37034a9b24b707b7c6b79ca23ddef9e25f7282e8a797efe53a8f124",
            ),
            (
                "0000000000000000000000000000000000000000000000000000000000000001",
                "Satoshi Nakamoto",
                "3045022100934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d802202442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
            ),
            (
                "f8b8af8ce3c7cca5e300d33939540c10d45ce001b8f252bfbc57ba0342904181",
                "Alan Turing",
                "304402207063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c022058dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea",
            ),
        ];

        for (key_hex, msg, expected) in cases {
            let key = PrivateKey::from_bytes(&hex::decode(key_hex).unwrap()).unwrap();
            let hash = sha256(msg.as_bytes());
            let sig = key.sign(&hash).unwrap();
            assert_eq!(hex::encode(sig.to_der()), expected, "message {msg:?}");
            assert!(key.pub_key().verify(&hash, &sig));
        }
    }

    #[test]
    fn test_verify_rejects_other_message_and_key() {
        let key = PrivateKey::generate();
        let other = PrivateKey::generate();
        let hash = sha256(b"pay to the order of");
        let sig = key.sign(&hash).unwrap();

        assert!(key.pub_key().verify(&hash, &sig));
        assert!(!key.pub_key().verify(&sha256(b"something else"), &sig));
        assert!(!other.pub_key().verify(&hash, &sig));
    }

    #[test]
    fn test_verify_rejects_high_s() {
        let key = PrivateKey::generate();
        let hash = sha256(b"malleable");
        let sig = key.sign(&hash).unwrap();
        let high = Signature::new(*sig.r(), subtract_from_order(sig.s()));
        assert!(!high.is_low_s());
        assert!(!key.pub_key().verify(&hash, &high));
    }
}
