use fragment::{PipelineError, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    format: String, // "json" for structured output
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url,
            model,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One model call, no retries. Any transport or HTTP-level failure
    /// surfaces as `ExtractionFailed`.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            format: "json".to_string(), // Force JSON output
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::ExtractionFailed(format!("model request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(PipelineError::ExtractionFailed(format!(
                "model returned HTTP {}",
                response.status()
            )));
        }

        let body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::ExtractionFailed(format!("unreadable model response: {e}")))?;

        Ok(body.response)
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new("http://localhost:11434".to_string(), "llama3".to_string())
    }
}
