//! Fee policies.
//!
//! The wallet's default is a flat fee independent of transaction size.
//! [`PerByteFee`] prices the estimated serialized size instead; both sit
//! behind [`FeePolicy`] so the engine does not care which one is in use.

use crate::template::p2pkh::COMPRESSED_UNLOCK_LEN;

/// Default flat fee: 0.0001 BTC.
pub const DEFAULT_FEE_SATOSHIS: u64 = 10_000;

/// Serialized size of a P2PKH output: value(8) + len(1) + script(25).
pub const P2PKH_OUTPUT_LEN: usize = 8 + 1 + 25;

/// Decides the fee attached to a transaction.
pub trait FeePolicy {
    /// Fee in satoshis for a transaction of `size` serialized bytes.
    fn fee(&self, size: usize) -> u64;
}

/// A constant fee regardless of size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedFee(pub u64);

impl Default for FixedFee {
    fn default() -> Self {
        FixedFee(DEFAULT_FEE_SATOSHIS)
    }
}

impl FeePolicy for FixedFee {
    fn fee(&self, _size: usize) -> u64 {
        self.0
    }
}

/// A fee proportional to size, in satoshis per byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerByteFee {
    pub sat_per_byte: u64,
}

impl FeePolicy for PerByteFee {
    fn fee(&self, size: usize) -> u64 {
        self.sat_per_byte.saturating_mul(size as u64)
    }
}

/// Upper bound on the signed size of a P2PKH transaction with `inputs`
/// compressed-key inputs and `outputs` P2PKH outputs.
pub fn estimate_size(inputs: usize, outputs: usize) -> usize {
    // txid(32) + vout(4) + script len(1) + script + sequence(4)
    let input_len = 32 + 4 + 1 + COMPRESSED_UNLOCK_LEN + 4;
    4 + varint_len(inputs)
        + inputs * input_len
        + varint_len(outputs)
        + outputs * P2PKH_OUTPUT_LEN
        + 4
}

fn varint_len(n: usize) -> usize {
    btc_primitives::util::VarInt::from(n).length()
}
