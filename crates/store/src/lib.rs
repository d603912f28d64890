pub mod memory;
pub mod merger;
pub mod neo4j;

pub use memory::MemoryGraphStore;
pub use merger::{MergeReport, Merger};
pub use neo4j::{Neo4jGraphStore, StoreStats};

use async_trait::async_trait;
use fragment::{Node, Relationship, Result};

/// Idempotent upsert surface of the persistent graph. Every operation is
/// safe to repeat and safe under concurrent callers; node identity is `id`,
/// relationship identity is (sourceId, targetId, type).
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create-if-absent. An existing node's type and properties are left
    /// untouched (first write wins).
    async fn upsert_node(&self, node: &Node) -> Result<()>;

    /// Create-if-absent, keyed by (sourceId, targetId, type). Both endpoint
    /// nodes must already exist in the store.
    async fn upsert_relationship(&self, rel: &Relationship) -> Result<()>;

    async fn node_exists(&self, id: &str) -> Result<bool>;
}
