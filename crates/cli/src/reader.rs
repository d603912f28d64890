use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Collect the documents to process: a single `.txt`/`.md` file, or every
/// such file directly under a directory. Extraction from PDFs and other
/// formats happens upstream; this tool consumes plain text.
pub async fn collect_documents(input: &Path) -> Result<Vec<(PathBuf, String)>> {
    if input.is_file() {
        let content = read_text_file(input).await?;
        return Ok(vec![(input.to_path_buf(), content)]);
    }

    let mut documents = Vec::new();
    let mut entries = fs::read_dir(input)
        .await
        .with_context(|| format!("reading directory {}", input.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && is_text_document(&path) {
            let content = read_text_file(&path).await?;
            documents.push((path, content));
        }
    }

    documents.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(documents)
}

fn is_text_document(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("txt") | Some("md")
    )
}

async fn read_text_file(path: &Path) -> Result<String> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("txt") | Some("md") => fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display())),
        other => anyhow::bail!("unsupported file format: {:?}", other.unwrap_or("")),
    }
}
