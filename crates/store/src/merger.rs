use crate::GraphStore;
use fragment::{GraphFragment, PipelineError, Result};
use serde::Serialize;
use tracing::{info, warn};

/// Outcome of one merge: how much of the fragment landed, which edges were
/// skipped, and any errors recovered along the way.
#[derive(Debug, Default, Serialize)]
pub struct MergeReport {
    pub nodes_merged: usize,
    pub edges_merged: usize,
    pub edges_skipped: usize,
    pub errors: Vec<String>,
}

impl MergeReport {
    fn progress(&self) -> usize {
        self.nodes_merged + self.edges_merged
    }
}

/// Applies a canonical fragment to a graph store with idempotent upserts.
///
/// Ordering invariant: every node upsert completes before any relationship
/// upsert is attempted, so an edge never races its own endpoints. An edge
/// whose endpoints exist in neither the fragment nor the store is skipped and
/// reported, not fatal. Losing the store connection mid-merge stops the merge;
/// whatever was applied stands, and re-running the same fragment repairs the
/// rest.
pub struct Merger;

impl Merger {
    pub async fn merge(fragment: &GraphFragment, store: &dyn GraphStore) -> Result<MergeReport> {
        let mut report = MergeReport::default();

        for node in &fragment.nodes {
            match store.upsert_node(node).await {
                Ok(()) => report.nodes_merged += 1,
                Err(e @ PipelineError::StoreConnectionFailed(_)) => {
                    return abort_merge(report, e);
                }
                Err(e) => {
                    warn!(id = %node.id, error = %e, "node upsert failed, continuing");
                    report.errors.push(e.to_string());
                }
            }
        }

        for rel in &fragment.relationships {
            let endpoints_present = match endpoints_exist(rel, store).await {
                Ok(present) => present,
                Err(e @ PipelineError::StoreConnectionFailed(_)) => {
                    return abort_merge(report, e);
                }
                Err(e) => {
                    report.edges_skipped += 1;
                    report.errors.push(e.to_string());
                    continue;
                }
            };

            if !endpoints_present {
                let e = PipelineError::DanglingReference {
                    source_id: rel.source_id.clone(),
                    target_id: rel.target_id.clone(),
                    rel_type: rel.rel_type.clone(),
                };
                warn!(
                    source = %rel.source_id,
                    target = %rel.target_id,
                    rel_type = %rel.rel_type,
                    "skipping edge with missing endpoint"
                );
                report.edges_skipped += 1;
                report.errors.push(e.to_string());
                continue;
            }

            match store.upsert_relationship(rel).await {
                Ok(()) => report.edges_merged += 1,
                Err(e @ PipelineError::StoreConnectionFailed(_)) => {
                    return abort_merge(report, e);
                }
                Err(e) => {
                    // Covers an endpoint vanishing between the existence
                    // check and the upsert, and any other per-edge failure;
                    // either way the edge was not merged, so it counts as
                    // skipped and the rest of the fragment proceeds.
                    report.edges_skipped += 1;
                    report.errors.push(e.to_string());
                }
            }
        }

        info!(
            nodes_merged = report.nodes_merged,
            edges_merged = report.edges_merged,
            edges_skipped = report.edges_skipped,
            "merge complete"
        );
        Ok(report)
    }
}

async fn endpoints_exist(
    rel: &fragment::Relationship,
    store: &dyn GraphStore,
) -> Result<bool> {
    Ok(store.node_exists(&rel.source_id).await? && store.node_exists(&rel.target_id).await?)
}

/// Connection loss before any upsert landed is a hard failure; after progress
/// it becomes part of the report, since re-running the fragment is safe.
fn abort_merge(mut report: MergeReport, e: PipelineError) -> Result<MergeReport> {
    if report.progress() == 0 {
        return Err(e);
    }
    warn!(
        nodes_merged = report.nodes_merged,
        edges_merged = report.edges_merged,
        error = %e,
        "store connection lost mid-merge, reporting partial progress"
    );
    report.errors.push(e.to_string());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryGraphStore;
    use async_trait::async_trait;
    use fragment::{Node, Relationship};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_fragment() -> GraphFragment {
        GraphFragment {
            nodes: vec![Node::new("A", "Person"), Node::new("B", "Org")],
            relationships: vec![Relationship::new("A", "B", "WORKS_AT")],
        }
    }

    #[tokio::test]
    async fn merge_is_idempotent() {
        let store = MemoryGraphStore::new();
        let fragment = sample_fragment();

        let first = Merger::merge(&fragment, &store).await.unwrap();
        let after_first = store.snapshot();

        let second = Merger::merge(&fragment, &store).await.unwrap();
        let after_second = store.snapshot();

        assert_eq!(first.nodes_merged, 2);
        assert_eq!(first.edges_merged, 1);
        assert_eq!(second.nodes_merged, 2);
        assert_eq!(second.edges_merged, 1);
        assert_eq!(after_first, after_second);
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.relationship_count(), 1);
    }

    #[tokio::test]
    async fn dangling_edge_is_skipped_and_reported() {
        let store = MemoryGraphStore::new();
        // Bypasses normalization on purpose: "Ghost" exists nowhere.
        let fragment = GraphFragment {
            nodes: vec![Node::new("A", "Person")],
            relationships: vec![
                Relationship::new("A", "Ghost", "KNOWS"),
                Relationship::new("A", "A", "SELF"),
            ],
        };

        let report = Merger::merge(&fragment, &store).await.unwrap();

        assert_eq!(report.nodes_merged, 1);
        assert_eq!(report.edges_skipped, 1);
        assert_eq!(report.edges_merged, 1);
        assert!(report.errors.iter().any(|e| e.contains("dangling reference")));
    }

    #[tokio::test]
    async fn existing_node_attributes_are_not_thrashed() {
        let store = MemoryGraphStore::new();
        store.upsert_node(&Node::new("A", "Person")).await.unwrap();

        let fragment = GraphFragment {
            nodes: vec![Node::new("A", "Organization")],
            relationships: vec![],
        };
        Merger::merge(&fragment, &store).await.unwrap();

        assert_eq!(store.get_node("A").unwrap().node_type, "Person");
    }

    /// Store double that records the order of write operations.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryGraphStore,
        ops: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GraphStore for RecordingStore {
        async fn upsert_node(&self, node: &Node) -> fragment::Result<()> {
            self.ops.lock().unwrap().push(format!("node:{}", node.id));
            self.inner.upsert_node(node).await
        }

        async fn upsert_relationship(&self, rel: &Relationship) -> fragment::Result<()> {
            self.ops
                .lock()
                .unwrap()
                .push(format!("edge:{}->{}", rel.source_id, rel.target_id));
            self.inner.upsert_relationship(rel).await
        }

        async fn node_exists(&self, id: &str) -> fragment::Result<bool> {
            self.inner.node_exists(id).await
        }
    }

    #[tokio::test]
    async fn all_nodes_merge_before_any_edge() {
        let store = RecordingStore::default();
        let fragment = GraphFragment {
            nodes: vec![
                Node::new("A", "Person"),
                Node::new("B", "Org"),
                Node::new("C", "City"),
            ],
            relationships: vec![
                Relationship::new("A", "B", "WORKS_AT"),
                Relationship::new("B", "C", "LOCATED_IN"),
            ],
        };

        Merger::merge(&fragment, &store).await.unwrap();

        let ops = store.ops.lock().unwrap();
        let last_node = ops.iter().rposition(|op| op.starts_with("node:")).unwrap();
        let first_edge = ops.iter().position(|op| op.starts_with("edge:")).unwrap();
        assert!(last_node < first_edge, "ops out of order: {ops:?}");
    }

    /// Store double whose connection dies after a fixed number of writes.
    struct FlakyStore {
        inner: MemoryGraphStore,
        writes_before_failure: usize,
        writes: AtomicUsize,
    }

    impl FlakyStore {
        fn new(writes_before_failure: usize) -> Self {
            Self {
                inner: MemoryGraphStore::new(),
                writes_before_failure,
                writes: AtomicUsize::new(0),
            }
        }

        fn check(&self) -> fragment::Result<()> {
            if self.writes.fetch_add(1, Ordering::SeqCst) >= self.writes_before_failure {
                return Err(PipelineError::StoreConnectionFailed(
                    "connection reset".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl GraphStore for FlakyStore {
        async fn upsert_node(&self, node: &Node) -> fragment::Result<()> {
            self.check()?;
            self.inner.upsert_node(node).await
        }

        async fn upsert_relationship(&self, rel: &Relationship) -> fragment::Result<()> {
            self.check()?;
            self.inner.upsert_relationship(rel).await
        }

        async fn node_exists(&self, id: &str) -> fragment::Result<bool> {
            self.inner.node_exists(id).await
        }
    }

    /// Store double whose relationship upserts fail with a non-connection,
    /// non-dangling error.
    struct EdgeRejectingStore {
        inner: MemoryGraphStore,
    }

    #[async_trait]
    impl GraphStore for EdgeRejectingStore {
        async fn upsert_node(&self, node: &Node) -> fragment::Result<()> {
            self.inner.upsert_node(node).await
        }

        async fn upsert_relationship(&self, _rel: &Relationship) -> fragment::Result<()> {
            Err(serde_json::from_str::<serde_json::Value>("{").unwrap_err().into())
        }

        async fn node_exists(&self, id: &str) -> fragment::Result<bool> {
            self.inner.node_exists(id).await
        }
    }

    #[tokio::test]
    async fn every_edge_is_accounted_as_merged_or_skipped() {
        let store = EdgeRejectingStore {
            inner: MemoryGraphStore::new(),
        };
        let fragment = GraphFragment {
            nodes: vec![Node::new("A", "Person"), Node::new("B", "Org")],
            relationships: vec![
                Relationship::new("A", "B", "WORKS_AT"),
                Relationship::new("A", "Ghost", "KNOWS"),
            ],
        };

        let report = Merger::merge(&fragment, &store).await.unwrap();

        assert_eq!(report.edges_merged, 0);
        assert_eq!(report.edges_skipped, 2);
        assert_eq!(
            report.edges_merged + report.edges_skipped,
            fragment.relationships.len()
        );
        assert_eq!(report.errors.len(), 2);
    }

    #[tokio::test]
    async fn connection_loss_mid_merge_reports_partial_progress() {
        let store = FlakyStore::new(1);
        let report = Merger::merge(&sample_fragment(), &store).await.unwrap();

        assert_eq!(report.nodes_merged, 1);
        assert!(
            report
                .errors
                .iter()
                .any(|e| e.contains("store connection failed"))
        );
    }

    #[tokio::test]
    async fn connection_loss_before_progress_is_fatal() {
        let store = FlakyStore::new(0);
        let err = Merger::merge(&sample_fragment(), &store).await.unwrap_err();

        assert!(matches!(err, PipelineError::StoreConnectionFailed(_)));
    }

    #[tokio::test]
    async fn retry_after_partial_merge_repairs_the_rest() {
        let flaky = FlakyStore::new(2);
        let fragment = sample_fragment();

        let partial = Merger::merge(&fragment, &flaky).await.unwrap();
        assert_eq!(partial.nodes_merged, 2);
        assert_eq!(partial.edges_merged, 0);

        // Same fragment against the surviving state finishes the job.
        let report = Merger::merge(&fragment, &flaky.inner).await.unwrap();
        assert_eq!(report.edges_merged, 1);
        assert_eq!(flaky.inner.node_count(), 2);
        assert_eq!(flaky.inner.relationship_count(), 1);
    }
}
