use crate::GraphStore;
use async_trait::async_trait;
use fragment::{GraphFragment, Node, PipelineError, Relationship, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    nodes: BTreeMap<String, Node>,
    relationships: BTreeMap<(String, String, String), Relationship>,
}

/// In-memory store with the same upsert semantics as the Neo4j backend.
/// Backs tests and dry runs.
#[derive(Default)]
pub struct MemoryGraphStore {
    inner: Mutex<Inner>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.inner.lock().unwrap().nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.inner.lock().unwrap().relationships.len()
    }

    pub fn get_node(&self, id: &str) -> Option<Node> {
        self.inner.lock().unwrap().nodes.get(id).cloned()
    }

    /// Deterministic dump of the whole store, for equality assertions.
    pub fn snapshot(&self) -> GraphFragment {
        let inner = self.inner.lock().unwrap();
        GraphFragment {
            nodes: inner.nodes.values().cloned().collect(),
            relationships: inner.relationships.values().cloned().collect(),
        }
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn upsert_node(&self, node: &Node) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .nodes
            .entry(node.id.clone())
            .or_insert_with(|| node.clone());
        Ok(())
    }

    async fn upsert_relationship(&self, rel: &Relationship) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.nodes.contains_key(&rel.source_id) || !inner.nodes.contains_key(&rel.target_id) {
            return Err(PipelineError::DanglingReference {
                source_id: rel.source_id.clone(),
                target_id: rel.target_id.clone(),
                rel_type: rel.rel_type.clone(),
            });
        }
        inner
            .relationships
            .entry(rel.key())
            .or_insert_with(|| rel.clone());
        Ok(())
    }

    async fn node_exists(&self, id: &str) -> Result<bool> {
        Ok(self.inner.lock().unwrap().nodes.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn node_upsert_is_first_write_wins() {
        let store = MemoryGraphStore::new();

        store.upsert_node(&Node::new("A", "Person")).await.unwrap();
        store.upsert_node(&Node::new("A", "Robot")).await.unwrap();

        assert_eq!(store.node_count(), 1);
        assert_eq!(store.get_node("A").unwrap().node_type, "Person");
    }

    #[tokio::test]
    async fn relationship_requires_both_endpoints() {
        let store = MemoryGraphStore::new();
        store.upsert_node(&Node::new("A", "Person")).await.unwrap();

        let err = store
            .upsert_relationship(&Relationship::new("A", "B", "KNOWS"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::DanglingReference { .. }));
        assert_eq!(store.relationship_count(), 0);
    }

    #[tokio::test]
    async fn relationship_upsert_is_idempotent() {
        let store = MemoryGraphStore::new();
        store.upsert_node(&Node::new("A", "Person")).await.unwrap();
        store.upsert_node(&Node::new("B", "Org")).await.unwrap();

        let rel = Relationship::new("A", "B", "WORKS_AT");
        store.upsert_relationship(&rel).await.unwrap();
        store.upsert_relationship(&rel).await.unwrap();

        assert_eq!(store.relationship_count(), 1);
    }
}
