use thiserror::Error;

/// Which structural check a link failed during verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    /// Recomputed hash differs from the stored one.
    HashMismatch,
    /// `previous_hash` does not equal the preceding link's hash.
    BrokenLink,
    /// Index is not contiguous with the preceding link.
    IndexGap,
    /// The first link does not start the chain: a full chain must begin at
    /// index 0 with the sentinel previous hash.
    BadGenesis,
}

impl std::fmt::Display for BreakKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BreakKind::HashMismatch => "hash mismatch",
            BreakKind::BrokenLink => "broken link",
            BreakKind::IndexGap => "index gap",
            BreakKind::BadGenesis => "bad genesis link",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Broken chain: {kind} at index {index}")]
    BrokenChain { index: u64, kind: BreakKind },

    #[error("Hash not found: {0}")]
    HashNotFound(String),

    #[error("Index {index} out of range (chain spans {first:?}..={last:?})")]
    IndexOutOfRange {
        index: u64,
        first: Option<u64>,
        last: Option<u64>,
    },

    #[error("No index left after {0}")]
    IndexExhausted(u64),

    #[error("Serializer key not found: {0}")]
    SerializerKeyNotFound(String),

    #[error("Serializer key is empty")]
    SerializerKeyNull,

    #[error("Malformed chain data: {0}")]
    Malformed(String),

    #[error("Chain not found: {0}")]
    ChainNotFound(String),
}

impl ChainError {
    /// True for integrity failures, as opposed to parse or lookup errors.
    pub fn is_broken_chain(&self) -> bool {
        matches!(self, ChainError::BrokenChain { .. })
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
