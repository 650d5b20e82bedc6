//! Canonical hashing of chain links.
//!
//! Encoding v1, fed to SHA-256 in this order:
//!
//! 1. the scheme tag `linkchain-v1` followed by a single `0x00`
//! 2. `index` as u64 big-endian
//! 3. `timestamp` as i64 big-endian
//! 4. payload length as u64 big-endian, then the payload bytes
//! 5. previous-hash length as u64 big-endian, then its UTF-8 bytes
//!
//! The digest is rendered as 64 lowercase hex characters. Any change to this
//! layout must bump the scheme tag.

use sha2::{Digest, Sha256};

/// SHA-256 hash as lowercase hex string.
pub type LinkHash = String;

/// Scheme tag mixed into every digest.
pub const HASH_SCHEME: &[u8] = b"linkchain-v1\0";

/// Length of a rendered hash in hex characters.
pub const HASH_HEX_LEN: usize = 64;

/// Previous-hash value carried by the link at index 0.
pub const SENTINEL_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Compute the hash of a link from its fields.
pub fn compute_hash(index: u64, timestamp: i64, data: &[u8], previous_hash: &str) -> LinkHash {
    let mut hasher = Sha256::new();
    hasher.update(HASH_SCHEME);
    hasher.update(index.to_be_bytes());
    hasher.update(timestamp.to_be_bytes());
    hasher.update((data.len() as u64).to_be_bytes());
    hasher.update(data);
    hasher.update((previous_hash.len() as u64).to_be_bytes());
    hasher.update(previous_hash.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `s` has the shape of a rendered hash.
pub fn is_well_formed(s: &str) -> bool {
    s.len() == HASH_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// First eight characters of a hash, for display.
pub fn abbreviate(hash: &str) -> &str {
    match hash.char_indices().nth(8) {
        Some((end, _)) => &hash[..end],
        None => hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_with_same_inputs() {
        let a = compute_hash(3, 1_700_000_000_000, b"alpha", SENTINEL_HASH);
        let b = compute_hash(3, 1_700_000_000_000, b"alpha", SENTINEL_HASH);
        assert_eq!(a, b);
        assert!(is_well_formed(&a));
    }

    #[test]
    fn every_field_feeds_the_digest() {
        let base = compute_hash(1, 10, b"x", SENTINEL_HASH);
        assert_ne!(base, compute_hash(2, 10, b"x", SENTINEL_HASH));
        assert_ne!(base, compute_hash(1, 11, b"x", SENTINEL_HASH));
        assert_ne!(base, compute_hash(1, 10, b"y", SENTINEL_HASH));
        assert_ne!(base, compute_hash(1, 10, b"x", &"1".repeat(64)));
    }

    #[test]
    fn length_prefix_separates_fields() {
        // Moving a byte between payload and previous hash must change the digest.
        let a = compute_hash(0, 0, b"ab", "c");
        let b = compute_hash(0, 0, b"a", "bc");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_payload_hashes() {
        let h = compute_hash(0, 0, b"", SENTINEL_HASH);
        assert_eq!(h.len(), HASH_HEX_LEN);
    }

    #[test]
    fn abbreviate_respects_char_boundaries() {
        assert_eq!(abbreviate(SENTINEL_HASH), "00000000");
        assert_eq!(abbreviate("abc"), "abc");
        assert_eq!(abbreviate("aéééééééé"), "aééééééé");
        assert_eq!(abbreviate("aéééé"), "aéééé");
    }

    #[test]
    fn sentinel_is_well_formed() {
        assert!(is_well_formed(SENTINEL_HASH));
        assert!(!is_well_formed("ABC"));
        assert!(!is_well_formed(&"G".repeat(64)));
    }
}
