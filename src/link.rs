use crate::hash::{compute_hash, LinkHash};

/// One sealed record of a chain. Read-only once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    index: u64,
    timestamp: i64,
    data: Vec<u8>,
    previous_hash: LinkHash,
    hash: LinkHash,
}

impl ChainLink {
    /// Create a link and seal it; the hash is computed from all other fields.
    pub fn new(index: u64, timestamp: i64, data: Vec<u8>, previous_hash: LinkHash) -> Self {
        let hash = compute_hash(index, timestamp, &data, &previous_hash);
        Self {
            index,
            timestamp,
            data,
            previous_hash,
            hash,
        }
    }

    /// Rebuild a link from stored fields without resealing it.
    ///
    /// The stored hash is kept as given so that verification can detect
    /// tampering; nothing here checks it.
    pub fn restore(
        index: u64,
        timestamp: i64,
        data: Vec<u8>,
        previous_hash: LinkHash,
        hash: LinkHash,
    ) -> Self {
        Self {
            index,
            timestamp,
            data,
            previous_hash,
            hash,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Creation time in epoch milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Recompute the hash over the link's fields.
    pub fn recompute_hash(&self) -> LinkHash {
        compute_hash(self.index, self.timestamp, &self.data, &self.previous_hash)
    }

    /// Whether the stored hash matches the fields.
    pub fn verify_hash(&self) -> bool {
        self.recompute_hash() == self.hash
    }

    /// Whether this link points at `prev`.
    pub fn follows(&self, prev: &ChainLink) -> bool {
        self.previous_hash == prev.hash
    }
}
