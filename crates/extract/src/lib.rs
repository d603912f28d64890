pub mod llm;
pub mod parse;
pub mod prompt;

pub use llm::OllamaClient;

use async_trait::async_trait;
use fragment::{GraphFragment, Result};
use tracing::info;

/// A generative model that turns raw text into a graph fragment.
///
/// Non-deterministic: two calls with identical input may produce different
/// output, which is why callers cache accepted fragments. Implementations do
/// not retry silently; retry policy belongs to the pipeline driver.
#[async_trait]
pub trait ExtractionModel: Send + Sync {
    async fn extract(&self, text: &str) -> Result<GraphFragment>;
}

/// Extractor backed by an LLM served over HTTP.
pub struct LlmExtractor {
    client: OllamaClient,
}

impl LlmExtractor {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExtractionModel for LlmExtractor {
    async fn extract(&self, text: &str) -> Result<GraphFragment> {
        let prompt = prompt::build_extraction_prompt(text);
        let response = self.client.generate(&prompt).await?;
        let raw = parse::parse_model_response(&response)?;

        info!(
            nodes = raw.nodes.len(),
            relationships = raw.relationships.len(),
            "model extraction complete"
        );
        Ok(raw)
    }
}
