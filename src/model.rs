//! Wire projection of a chain, shared by every codec.

use crate::chain::SimpleBlockchain;
use crate::error::{ChainError, Result};
use crate::hash::is_well_formed;
use crate::link::ChainLink;
use crate::payload;
use serde::{Deserialize, Serialize};

/// Flat, codec-agnostic view of a [`SimpleBlockchain`].
///
/// `count`, `first_index` and `last_index` are derived on the way out and
/// checked against `chain_links` on the way in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainModel {
    pub blockchain_id: String,
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_index: Option<u64>,
    pub chain_links: Vec<LinkModel>,
}

/// Per-link projection; `data` is hex-encoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkModel {
    pub index: u64,
    pub timestamp: i64,
    #[serde(default)]
    pub data: String,
    pub previous_hash: String,
    pub hash: String,
}

impl From<&ChainLink> for LinkModel {
    fn from(link: &ChainLink) -> Self {
        Self {
            index: link.index(),
            timestamp: link.timestamp(),
            data: payload::encode(link.data()),
            previous_hash: link.previous_hash().into(),
            hash: link.hash().into(),
        }
    }
}

impl LinkModel {
    /// Restore the link exactly as stored; the hash is not recomputed.
    ///
    /// Hash fields that are not 64 lowercase hex characters are wire
    /// corruption and rejected as malformed.
    pub fn to_link(&self) -> Result<ChainLink> {
        for (name, value) in [("hash", &self.hash), ("previousHash", &self.previous_hash)] {
            if !is_well_formed(value) {
                return Err(ChainError::Malformed(format!(
                    "link {}: {} is not a hex digest: {:?}",
                    self.index, name, value
                )));
            }
        }
        Ok(ChainLink::restore(
            self.index,
            self.timestamp,
            payload::decode(&self.data)?,
            self.previous_hash.clone(),
            self.hash.clone(),
        ))
    }
}

impl From<&SimpleBlockchain> for ChainModel {
    fn from(chain: &SimpleBlockchain) -> Self {
        Self {
            blockchain_id: chain.id().into(),
            count: chain.count() as u64,
            first_index: chain.first_index(),
            last_index: chain.last_index(),
            chain_links: chain.iter().map(LinkModel::from).collect(),
        }
    }
}

impl ChainModel {
    /// Rebuild the chain without verifying link integrity.
    ///
    /// Only the derived header fields are checked here; a mismatch means the
    /// wire data itself is inconsistent and is reported as malformed.
    pub fn into_chain_unverified(self) -> Result<SimpleBlockchain> {
        let actual_count = self.chain_links.len() as u64;
        if self.count != actual_count {
            return Err(ChainError::Malformed(format!(
                "count is {} but {} links present",
                self.count, actual_count
            )));
        }
        let first = self.chain_links.first().map(|l| l.index);
        let last = self.chain_links.last().map(|l| l.index);
        if self.first_index != first || self.last_index != last {
            return Err(ChainError::Malformed(format!(
                "header spans {:?}..{:?} but links span {:?}..{:?}",
                self.first_index, self.last_index, first, last
            )));
        }
        let links = self
            .chain_links
            .iter()
            .map(LinkModel::to_link)
            .collect::<Result<Vec<_>>>()?;
        Ok(SimpleBlockchain::from_links_unverified(
            self.blockchain_id,
            links,
        ))
    }

    /// Rebuild and verify the chain.
    pub fn into_chain(self) -> Result<SimpleBlockchain> {
        let chain = self.into_chain_unverified()?;
        chain.verify()?;
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BreakKind;

    fn sample() -> SimpleBlockchain {
        let mut chain = SimpleBlockchain::with_id("C1");
        chain.append_at(b"alpha".to_vec(), 1).unwrap();
        chain.append_at(b"beta".to_vec(), 2).unwrap();
        chain
    }

    #[test]
    fn projection_carries_derived_fields() {
        let model = ChainModel::from(&sample());
        assert_eq!(model.blockchain_id, "C1");
        assert_eq!(model.count, 2);
        assert_eq!(model.first_index, Some(0));
        assert_eq!(model.last_index, Some(1));
        assert_eq!(model.chain_links[0].data, "616c706861");
    }

    #[test]
    fn model_restores_identical_chain() {
        let chain = sample();
        let back = ChainModel::from(&chain).into_chain().unwrap();
        assert_eq!(back, chain);
    }

    #[test]
    fn count_mismatch_is_malformed() {
        let mut model = ChainModel::from(&sample());
        model.count = 5;
        assert!(matches!(
            model.into_chain(),
            Err(ChainError::Malformed(_))
        ));
    }

    #[test]
    fn tampered_payload_is_broken_chain() {
        let mut model = ChainModel::from(&sample());
        model.chain_links[0].data = payload::encode(b"ALPHA");
        match model.into_chain() {
            Err(ChainError::BrokenChain { index, kind }) => {
                assert_eq!(index, 0);
                assert_eq!(kind, BreakKind::HashMismatch);
            }
            other => panic!("expected broken chain, got {:?}", other),
        }
    }

    #[test]
    fn badly_shaped_hashes_are_malformed() {
        let mut model = ChainModel::from(&sample());
        model.chain_links[1].previous_hash = "aéééé".into();
        assert!(matches!(
            model.clone().into_chain_unverified(),
            Err(ChainError::Malformed(_))
        ));

        let mut model = ChainModel::from(&sample());
        model.chain_links[0].hash = model.chain_links[0].hash.to_uppercase();
        assert!(matches!(model.into_chain(), Err(ChainError::Malformed(_))));
    }

    #[test]
    fn chain_with_leading_links_dropped_is_rejected() {
        let mut chain = sample();
        chain.append_at(b"gamma".to_vec(), 3).unwrap();
        let mut model = ChainModel::from(&chain);
        model.chain_links.remove(0);
        model.count = 2;
        model.first_index = Some(1);
        assert!(matches!(
            model.into_chain(),
            Err(ChainError::BrokenChain {
                index: 0,
                kind: BreakKind::BadGenesis
            })
        ));
    }

    #[test]
    fn unverified_keeps_tampered_links() {
        let mut model = ChainModel::from(&sample());
        model.chain_links[1].hash = "0".repeat(64);
        let chain = model.into_chain_unverified().unwrap();
        assert_eq!(chain.count(), 2);
        assert!(!chain.is_valid());
    }

    #[test]
    fn empty_chain_projection() {
        let chain = SimpleBlockchain::with_id("empty");
        let model = ChainModel::from(&chain);
        assert_eq!(model.first_index, None);
        assert_eq!(model.into_chain().unwrap(), chain);
    }
}
