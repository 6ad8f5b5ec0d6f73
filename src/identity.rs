//! Identity keying
//!
//! Maps an opaque identity string to a stable numeric seed and to stable
//! indices into static tables. The mapping is a pure function of the bytes of
//! the identity, so it is identical across processes and restarts.
//!
//! The seed is a base-31 polynomial rolling hash over the UTF-8 bytes,
//! followed by a SplitMix64 finalizer so that short, similar identities
//! (`worker-1`, `worker-2`) still spread over the whole `u64` range.

use crate::random::mix64;

const POLY_BASE: u64 = 31;
const POLY_OFFSET: u64 = 1_469_598_103_934_665_603;

/// Stable seed for an identity
pub fn seed_for(identity: &str) -> u64 {
    let hash = identity.bytes().fold(POLY_OFFSET, |acc, byte| {
        acc.wrapping_mul(POLY_BASE).wrapping_add(byte as u64)
    });
    mix64(hash)
}

/// Stable index into a table of `table_size` entries, `None` for an empty table
pub fn index_for(identity: &str, table_size: usize) -> Option<usize> {
    if table_size == 0 {
        return None;
    }
    Some((seed_for(identity) % table_size as u64) as usize)
}

/// Normalized `[0, 1)` value derived from a seed
pub fn unit_from_seed(seed: u64) -> f64 {
    (seed >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Normalized `[0, 1)` value derived from an identity
pub fn unit_for(identity: &str) -> f64 {
    unit_from_seed(seed_for(identity))
}
