use crate::{FragmentCache, hash_key};
use async_trait::async_trait;
use fragment::{GraphFragment, PipelineError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Durable cache: one JSON file per key under a cache directory, named by the
/// key's digest so arbitrary keys (paths, URLs) stay filesystem-safe.
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", hash_key(key)))
    }
}

#[async_trait]
impl FragmentCache for JsonFileCache {
    async fn get(&self, key: &str) -> Result<Option<GraphFragment>> {
        let path = self.entry_path(key);

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PipelineError::CacheUnavailable(format!(
                    "reading {}: {e}",
                    path.display()
                )));
            }
        };

        match serde_json::from_str(&raw) {
            Ok(fragment) => {
                debug!(key, path = %path.display(), "cache hit");
                Ok(Some(fragment))
            }
            Err(e) => Err(PipelineError::MalformedCacheEntry {
                key: key.to_string(),
                detail: e.to_string(),
            }),
        }
    }

    async fn put(&self, key: &str, fragment: &GraphFragment) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PipelineError::CacheUnavailable(format!("creating cache dir: {e}")))?;

        let json = serde_json::to_string(fragment)?;
        let path = self.entry_path(key);

        // Write-then-rename so a crash mid-write never leaves a truncated entry.
        let tmp = path.with_extension("json.tmp");
        write_atomic(&tmp, &path, &json)
            .await
            .map_err(|e| PipelineError::CacheUnavailable(format!("writing {}: {e}", path.display())))?;

        debug!(key, path = %path.display(), "fragment cached");
        Ok(())
    }
}

async fn write_atomic(tmp: &Path, path: &Path, contents: &str) -> std::io::Result<()> {
    fs::write(tmp, contents).await?;
    if let Err(e) = fs::rename(tmp, path).await {
        if let Err(cleanup) = fs::remove_file(tmp).await {
            warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp cache file");
        }
        return Err(e);
    }
    Ok(())
}
