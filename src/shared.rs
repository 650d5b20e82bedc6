use crate::chain::SimpleBlockchain;
use crate::error::Result;
use crate::link::ChainLink;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

/// Thread-safe handle to a chain.
///
/// Appends take the write lock; verification and lookups take the read lock,
/// so a verifier never observes a half-finished append.
#[derive(Debug, Clone, Default)]
pub struct SharedBlockchain {
    inner: Arc<RwLock<SimpleBlockchain>>,
}

impl SharedBlockchain {
    pub fn new(chain: SimpleBlockchain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    /// Append a payload and return a copy of the sealed link.
    pub fn append(&self, data: Vec<u8>) -> Result<ChainLink> {
        let mut chain = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        chain.append(data).cloned()
    }

    pub fn verify(&self) -> Result<()> {
        self.read().verify()
    }

    pub fn find_by_hash(&self, hash: &str) -> Result<ChainLink> {
        self.read().find_by_hash(hash).cloned()
    }

    pub fn find_by_index(&self, index: u64) -> Result<ChainLink> {
        self.read().find_by_index(index).cloned()
    }

    pub fn count(&self) -> usize {
        self.read().count()
    }

    /// Copy of the chain as it stands now.
    pub fn snapshot(&self) -> SimpleBlockchain {
        self.read().clone()
    }

    /// Take the chain back out if this is the last handle.
    pub fn into_inner(self) -> Option<SimpleBlockchain> {
        Arc::try_unwrap(self.inner)
            .ok()
            .map(|lock| lock.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    fn read(&self) -> RwLockReadGuard<'_, SimpleBlockchain> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn concurrent_appends_stay_contiguous() {
        let shared = SharedBlockchain::new(SimpleBlockchain::with_id("mt"));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..25u8 {
                        shared.append(vec![t, i]).unwrap();
                        shared.verify().unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(shared.count(), 100);
        let chain = shared.into_inner().unwrap();
        assert!(chain.verify().is_ok());
        assert_eq!(chain.last_index(), Some(99));
    }

    #[test]
    fn lookups_return_copies() {
        let shared = SharedBlockchain::default();
        let link = shared.append(b"hello".to_vec()).unwrap();
        assert_eq!(shared.find_by_hash(link.hash()).unwrap(), link);
        assert_eq!(shared.find_by_index(0).unwrap(), link);
        assert_eq!(shared.snapshot().count(), 1);
    }
}
