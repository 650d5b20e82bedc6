use crate::error::{BreakKind, ChainError, Result};
use crate::hash::{is_well_formed, LinkHash, SENTINEL_HASH};
use crate::link::ChainLink;
use chrono::Utc;
use log::{debug, warn};

/// An append-only, hash-linked sequence of [`ChainLink`]s.
///
/// Links are only created by [`append`](Self::append) or restored from a
/// serialized form; there is no way to edit or remove one in place.
/// `first_index`, `last_index` and `count` are always derived from the
/// link sequence.
///
/// A full chain starts at index 0 with the sentinel previous hash. Chains
/// built with [`from_segment`](Self::from_segment) are tails of a longer
/// chain and may start anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleBlockchain {
    id: String,
    links: Vec<ChainLink>,
    segment: bool,
}

impl Default for SimpleBlockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBlockchain {
    /// Create an empty chain with a freshly generated id.
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    /// Create an empty chain with an explicit id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self::from_links_unverified(id, Vec::new())
    }

    /// Rebuild a chain from restored links and verify it before returning.
    pub fn from_links(id: impl Into<String>, links: Vec<ChainLink>) -> Result<Self> {
        let chain = Self::from_links_unverified(id, links);
        chain.verify()?;
        Ok(chain)
    }

    /// Rebuild a chain without verifying it.
    ///
    /// The result must be treated as untrusted until [`verify`](Self::verify)
    /// succeeds.
    pub fn from_links_unverified(id: impl Into<String>, links: Vec<ChainLink>) -> Self {
        Self {
            id: id.into(),
            links,
            segment: false,
        }
    }

    /// Rebuild and verify a tail of a longer chain.
    ///
    /// The first link may sit at any index and point at any well-formed
    /// hash; everything after it is checked as usual. Codecs and the store
    /// never produce segments.
    pub fn from_segment(id: impl Into<String>, links: Vec<ChainLink>) -> Result<Self> {
        let chain = Self {
            id: id.into(),
            links,
            segment: true,
        };
        chain.verify()?;
        Ok(chain)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether this chain was built as a segment.
    pub fn is_segment(&self) -> bool {
        self.segment
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChainLink> {
        self.links.iter()
    }

    pub fn count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn first(&self) -> Option<&ChainLink> {
        self.links.first()
    }

    pub fn last(&self) -> Option<&ChainLink> {
        self.links.last()
    }

    /// Index of the first link, `None` when empty.
    pub fn first_index(&self) -> Option<u64> {
        self.first().map(ChainLink::index)
    }

    /// Index of the last link, `None` when empty.
    pub fn last_index(&self) -> Option<u64> {
        self.last().map(ChainLink::index)
    }

    // ── Append ────────────────────────────────────────────────

    /// Append a payload stamped with the current time.
    pub fn append(&mut self, data: Vec<u8>) -> Result<&ChainLink> {
        self.append_at(data, Utc::now().timestamp_millis())
    }

    /// Append a payload with an explicit timestamp (epoch milliseconds).
    ///
    /// Fails only when the last link already sits at `u64::MAX`.
    pub fn append_at(&mut self, data: Vec<u8>, timestamp: i64) -> Result<&ChainLink> {
        let (index, previous_hash): (u64, LinkHash) = match self.links.last() {
            Some(last) => {
                let index = last
                    .index()
                    .checked_add(1)
                    .ok_or(ChainError::IndexExhausted(last.index()))?;
                (index, last.hash().into())
            }
            None => (0, SENTINEL_HASH.into()),
        };
        let link = ChainLink::new(index, timestamp, data, previous_hash);
        debug!("chain {}: sealed link {} ({})", self.id, index, link.hash());
        self.links.push(link);
        Ok(&self.links[self.links.len() - 1])
    }

    // ── Verification ──────────────────────────────────────────

    /// Walk the chain from first to last link and report the first break.
    ///
    /// Each link is checked in this order before moving to the next one:
    /// its own hash, then genesis/index contiguity, then the pointer to the
    /// preceding link. A tampered link therefore surfaces as a
    /// [`BreakKind::HashMismatch`] at its own index; the linkage failure it
    /// causes further right is never reached.
    ///
    /// The first link of a full chain must have index 0 and the sentinel
    /// previous hash, otherwise the chain fails with
    /// [`BreakKind::BadGenesis`].
    pub fn verify(&self) -> Result<()> {
        let mut prev = None;
        for link in &self.links {
            if let Err(kind) = self.check_link(link, prev) {
                let index = self.expected_index(link, prev);
                warn!("chain {}: {} at index {}", self.id, kind, index);
                return Err(ChainError::BrokenChain { index, kind });
            }
            prev = Some(link);
        }
        Ok(())
    }

    /// Like [`verify`](Self::verify) but only reports success or failure.
    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// Check a single link against itself and its predecessor.
    pub fn verify_link(&self, index: u64) -> Result<()> {
        let pos = self.position_of(index)?;
        let prev = pos.checked_sub(1).map(|p| &self.links[p]);
        self.check_link(&self.links[pos], prev)
            .map_err(|kind| ChainError::BrokenChain { index, kind })
    }

    /// Index a link should carry given its predecessor.
    fn expected_index(&self, link: &ChainLink, prev: Option<&ChainLink>) -> u64 {
        match prev {
            Some(p) => p.index().checked_add(1).unwrap_or(link.index()),
            None if self.segment => link.index(),
            None => 0,
        }
    }

    fn check_link(
        &self,
        link: &ChainLink,
        prev: Option<&ChainLink>,
    ) -> std::result::Result<(), BreakKind> {
        if !link.verify_hash() {
            return Err(BreakKind::HashMismatch);
        }
        match prev {
            None => {
                let genesis_ok = if link.index() == 0 || !self.segment {
                    link.index() == 0 && link.previous_hash() == SENTINEL_HASH
                } else {
                    is_well_formed(link.previous_hash())
                };
                if !genesis_ok {
                    return Err(BreakKind::BadGenesis);
                }
            }
            Some(prev) => {
                if prev.index().checked_add(1) != Some(link.index()) {
                    return Err(BreakKind::IndexGap);
                }
                if !link.follows(prev) {
                    return Err(BreakKind::BrokenLink);
                }
            }
        }
        Ok(())
    }

    // ── Lookup ────────────────────────────────────────────────

    /// Find the link carrying `hash`.
    pub fn find_by_hash(&self, hash: &str) -> Result<&ChainLink> {
        self.links
            .iter()
            .find(|l| l.hash() == hash)
            .ok_or_else(|| ChainError::HashNotFound(hash.into()))
    }

    /// Find the link at `index`.
    pub fn find_by_index(&self, index: u64) -> Result<&ChainLink> {
        let pos = self.position_of(index)?;
        Ok(&self.links[pos])
    }

    fn position_of(&self, index: u64) -> Result<usize> {
        let out_of_range = || ChainError::IndexOutOfRange {
            index,
            first: self.first_index(),
            last: self.last_index(),
        };
        let first = self.first_index().ok_or_else(out_of_range)?;
        let pos = index.checked_sub(first).ok_or_else(out_of_range)?;
        let pos = usize::try_from(pos).map_err(|_| out_of_range())?;
        if pos >= self.links.len() {
            return Err(out_of_range());
        }
        Ok(pos)
    }
}

impl<'a> IntoIterator for &'a SimpleBlockchain {
    type Item = &'a ChainLink;
    type IntoIter = std::slice::Iter<'a, ChainLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}
