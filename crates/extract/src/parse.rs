use fragment::{GraphFragment, PipelineError, Result};
use regex::Regex;

/// Parse a model response into a raw (un-normalized) fragment. Models wrap
/// JSON in markdown fences often enough that we strip them first; anything
/// that still fails to parse is `ExtractionFailed`.
pub fn parse_model_response(response: &str) -> Result<GraphFragment> {
    let cleaned = strip_code_fences(response);

    serde_json::from_str(cleaned).map_err(|e| {
        PipelineError::ExtractionFailed(format!("model produced malformed fragment JSON: {e}"))
    })
}

fn strip_code_fences(response: &str) -> &str {
    let re = Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").unwrap();
    match re.captures(response) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(response),
        None => response.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"nodes":[{"id":"A","type":"Person","properties":{}}],"relationships":[{"sourceId":"A","targetId":"B","type":"KNOWS","properties":{}}]}"#;

    #[test]
    fn parses_plain_json() {
        let fragment = parse_model_response(SAMPLE).unwrap();
        assert_eq!(fragment.nodes.len(), 1);
        assert_eq!(fragment.relationships[0].rel_type, "KNOWS");
    }

    #[test]
    fn strips_markdown_fences() {
        let fenced = format!("```json\n{SAMPLE}\n```");
        let fragment = parse_model_response(&fenced).unwrap();
        assert_eq!(fragment.nodes.len(), 1);

        let bare_fence = format!("```\n{SAMPLE}\n```");
        assert!(parse_model_response(&bare_fence).is_ok());
    }

    #[test]
    fn malformed_json_is_extraction_failure() {
        match parse_model_response("the text mentions Berlin and Germany") {
            Err(PipelineError::ExtractionFailed(_)) => {}
            other => panic!("expected ExtractionFailed, got {other:?}"),
        }
    }
}
