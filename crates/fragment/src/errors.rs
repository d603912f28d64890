//! Error taxonomy for the extraction-and-materialization pipeline.

/// Alias for Results returning [`PipelineError`].
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The cache could not be read or written. Recoverable: the pipeline
    /// proceeds without caching.
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// A cache entry exists but does not deserialize. Recoverable: treated
    /// as a cache miss, triggering re-extraction.
    #[error("malformed cache entry for key '{key}': {detail}")]
    MalformedCacheEntry { key: String, detail: String },

    /// The extraction model call failed (timeout, quota, malformed response).
    /// Aborts the current document's run; nothing is cached or merged.
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// An edge references a node absent from both the fragment and the store.
    /// Recoverable: the edge is skipped and recorded in the run report.
    #[error("dangling reference: {rel_type} edge from '{source_id}' to '{target_id}'")]
    DanglingReference {
        source_id: String,
        target_id: String,
        rel_type: String,
    },

    /// Connectivity to the graph store was lost. Already-applied upserts
    /// stand; retrying the same fragment is safe because merge is idempotent.
    #[error("store connection failed: {0}")]
    StoreConnectionFailed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
