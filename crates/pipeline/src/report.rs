use serde::Serialize;
use store::MergeReport;
use uuid::Uuid;

/// Structured summary of one pipeline run, suitable for logging or further
/// automation.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub cache_key: String,
    pub nodes_merged: usize,
    pub edges_merged: usize,
    pub edges_skipped: usize,
    pub errors: Vec<String>,
}

impl RunReport {
    pub(crate) fn from_merge(cache_key: &str, merge: MergeReport) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            cache_key: cache_key.to_string(),
            nodes_merged: merge.nodes_merged,
            edges_merged: merge.edges_merged,
            edges_skipped: merge.edges_skipped,
            errors: merge.errors,
        }
    }
}
