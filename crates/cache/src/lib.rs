pub mod file;
pub mod memory;

pub use file::JsonFileCache;
pub use memory::MemoryCache;

use async_trait::async_trait;
use fragment::{GraphFragment, Result};
use sha2::{Digest, Sha256};

/// Durable key -> fragment store. A cached fragment is final: once written,
/// it is returned verbatim on every later lookup until overwritten wholesale.
///
/// Error contract: `get` returns `MalformedCacheEntry` for an entry that
/// exists but does not deserialize, and `CacheUnavailable` for storage
/// failures; callers treat the former as a miss and the latter as
/// "proceed without caching".
#[async_trait]
pub trait FragmentCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<GraphFragment>>;

    /// Overwrites any existing entry for `key`.
    async fn put(&self, key: &str, fragment: &GraphFragment) -> Result<()>;
}

/// Stable filesystem-safe digest of a cache key.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_key_is_stable_and_filesystem_safe() {
        let a = hash_key("data/notes.txt");
        let b = hash_key("data/notes.txt");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));

        assert_ne!(hash_key("data/notes.txt"), hash_key("data/other.txt"));
    }
}
