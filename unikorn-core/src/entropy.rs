//! Deterministic entropy derived from a resource's stable identifier.
//!
//! Used for per-resource load spreading: the same `stable_id` always maps
//! to the same bytes, and the mapping is approximately uniform over the id
//! space so a population of resources spreads across weekdays and hours.

use sha2::{Digest, Sha256};

/// Hash `stable_id` and return the raw digest. Only the first two bytes are
/// consumed by the time-window evaluator, but the full 256-bit digest is
/// returned so future consumers don't need to re-hash.
pub fn digest(stable_id: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(stable_id.as_bytes());
    hasher.finalize().into()
}
