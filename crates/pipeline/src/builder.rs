use crate::config::PipelineConfig;
use crate::retry::RetryPolicy;
use cache::FragmentCache;
use extract::ExtractionModel;
use fragment::{GraphFragment, PipelineError, Result, normalize};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the canonical fragment for one document: cache lookup first, the
/// extraction model only on a miss, normalization, then a best-effort cache
/// write. A cached fragment is final — it is returned as-is, never
/// re-validated against the current text.
pub struct FragmentBuilder {
    cache: Arc<dyn FragmentCache>,
    model: Arc<dyn ExtractionModel>,
    retry: RetryPolicy,
    cache_enabled: bool,
}

impl FragmentBuilder {
    pub fn new(
        cache: Arc<dyn FragmentCache>,
        model: Arc<dyn ExtractionModel>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            cache,
            model,
            retry: RetryPolicy::new(&config.retry),
            cache_enabled: config.cache_enabled,
        }
    }

    pub async fn build(&self, text: &str, cache_key: &str) -> Result<GraphFragment> {
        if self.cache_enabled {
            match self.cache.get(cache_key).await {
                Ok(Some(fragment)) => {
                    info!(
                        key = cache_key,
                        nodes = fragment.nodes.len(),
                        relationships = fragment.relationships.len(),
                        "loaded fragment from cache"
                    );
                    return Ok(fragment);
                }
                Ok(None) => {}
                Err(PipelineError::MalformedCacheEntry { key, detail }) => {
                    warn!(key, detail, "corrupt cache entry, re-extracting");
                }
                Err(e) => {
                    // Cache is an optimization, not a correctness requirement.
                    warn!(key = cache_key, error = %e, "cache read failed, proceeding without cache");
                }
            }
        }

        let raw = self
            .retry
            .run("extraction", || self.model.extract(text))
            .await?;
        let fragment = normalize(raw);

        if self.cache_enabled {
            if let Err(e) = self.cache.put(cache_key, &fragment).await {
                warn!(key = cache_key, error = %e, "cache write failed, proceeding without caching");
            }
        }

        Ok(fragment)
    }
}
