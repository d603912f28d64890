use crate::{FragmentCache, hash_key};
use async_trait::async_trait;
use dashmap::DashMap;
use fragment::{GraphFragment, Result};

/// In-process cache. Used as a test double for [`crate::JsonFileCache`] and
/// for embedded runs where durability doesn't matter.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, GraphFragment>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[async_trait]
impl FragmentCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<GraphFragment>> {
        Ok(self.entries.get(&hash_key(key)).map(|r| r.value().clone()))
    }

    async fn put(&self, key: &str, fragment: &GraphFragment) -> Result<()> {
        self.entries.insert(hash_key(key), fragment.clone());
        Ok(())
    }
}
