use crate::builder::FragmentBuilder;
use crate::config::PipelineConfig;
use crate::report::RunReport;
use cache::FragmentCache;
use extract::ExtractionModel;
use fragment::Result;
use std::sync::Arc;
use store::{GraphStore, Merger};
use tracing::info;

/// One document in, one report out: build the fragment (§cache-or-extract),
/// merge it into the store. Extraction failure aborts before anything is
/// merged; merge failures follow the merger's partial-progress rules.
///
/// A `Pipeline` is plain data — construct as many independently configured
/// instances as needed (different models, different stores) and run them
/// concurrently on different documents.
pub struct Pipeline {
    builder: FragmentBuilder,
    store: Arc<dyn GraphStore>,
}

impl Pipeline {
    pub fn new(
        cache: Arc<dyn FragmentCache>,
        model: Arc<dyn ExtractionModel>,
        store: Arc<dyn GraphStore>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            builder: FragmentBuilder::new(cache, model, config),
            store,
        }
    }

    pub async fn run(&self, text: &str, cache_key: &str) -> Result<RunReport> {
        let fragment = self.builder.build(text, cache_key).await?;
        let merge = Merger::merge(&fragment, self.store.as_ref()).await?;

        let report = RunReport::from_merge(cache_key, merge);
        info!(
            run_id = %report.run_id,
            cache_key,
            nodes_merged = report.nodes_merged,
            edges_merged = report.edges_merged,
            edges_skipped = report.edges_skipped,
            errors = report.errors.len(),
            "pipeline run complete"
        );
        Ok(report)
    }
}
