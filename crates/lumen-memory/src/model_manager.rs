// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-run download of the sentence embedding model.
//!
//! The INT8-quantized all-MiniLM-L6-v2 model and its tokenizer are fetched
//! from HuggingFace into `{model_dir}/all-MiniLM-L6-v2/` once and reused on
//! every later start.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::OnceCell;
use tracing::info;

use lumen_core::LumenError;

const MODEL_NAME: &str = "all-MiniLM-L6-v2";

const MODEL_URL: &str =
    "https://huggingface.co/onnx-community/all-MiniLM-L6-v2-ONNX/resolve/main/onnx/model_quantized.onnx";
const TOKENIZER_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json";

/// Resolves, and downloads when missing, the embedding model files.
pub struct ModelManager {
    model_dir: PathBuf,
    ready: OnceCell<PathBuf>,
}

impl ModelManager {
    /// `model_dir` is the parent under which the model directory is created.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            ready: OnceCell::new(),
        }
    }

    /// Directory holding `model.onnx` and `tokenizer.json`.
    pub fn model_dir(&self) -> PathBuf {
        self.model_dir.join(MODEL_NAME)
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir().join("model.onnx")
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir().join("tokenizer.json")
    }

    /// True when both files are already on disk.
    pub fn is_model_available(&self) -> bool {
        self.model_path().exists() && self.tokenizer_path().exists()
    }

    /// Returns the model path, downloading missing files first.
    ///
    /// Concurrent callers share a single download.
    pub async fn ensure_model(&self) -> Result<PathBuf, LumenError> {
        self.ready
            .get_or_try_init(|| self.fetch_missing())
            .await
            .cloned()
    }

    async fn fetch_missing(&self) -> Result<PathBuf, LumenError> {
        if self.is_model_available() {
            return Ok(self.model_path());
        }

        let dir = self.model_dir();
        info!(dir = %dir.display(), "embedding model not found, downloading");
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(LumenError::storage)?;

        for (dest, url) in [
            (self.model_path(), MODEL_URL),
            (self.tokenizer_path(), TOKENIZER_URL),
        ] {
            if dest.exists() {
                continue;
            }
            let size = download_file(url, &dest).await?;
            info!(file = %dest.display(), bytes = size, "downloaded");
        }

        Ok(self.model_path())
    }
}

/// Streams `url` into `{dest}.part` and renames it into place, so an
/// interrupted download never leaves a truncated model behind.
async fn download_file(url: &str, dest: &Path) -> Result<u64, LumenError> {
    let mut response = reqwest::get(url).await.map_err(|e| LumenError::Unreachable {
        message: format!("failed to download {url}"),
        source: Some(Box::new(e)),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LumenError::Provider {
            message: format!("download of {url} returned {status}"),
            source: None,
        });
    }

    let mut part = dest.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    match write_body(&mut response, &part).await {
        Ok(size) => {
            tokio::fs::rename(&part, dest)
                .await
                .map_err(LumenError::storage)?;
            Ok(size)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&part).await;
            Err(e)
        }
    }
}

async fn write_body(response: &mut reqwest::Response, path: &Path) -> Result<u64, LumenError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(LumenError::storage)?;
    let mut size = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(|e| LumenError::Unreachable {
        message: "model download interrupted".to_string(),
        source: Some(Box::new(e)),
    })? {
        file.write_all(&chunk).await.map_err(LumenError::storage)?;
        size += chunk.len() as u64;
    }
    file.flush().await.map_err(LumenError::storage)?;
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_model_dir() {
        let manager = ModelManager::new("/var/lib/lumen/models");
        assert_eq!(
            manager.model_path(),
            PathBuf::from("/var/lib/lumen/models/all-MiniLM-L6-v2/model.onnx")
        );
        assert_eq!(
            manager.tokenizer_path(),
            PathBuf::from("/var/lib/lumen/models/all-MiniLM-L6-v2/tokenizer.json")
        );
    }

    #[test]
    fn not_available_when_missing() {
        let manager = ModelManager::new("/nonexistent/lumen/models");
        assert!(!manager.is_model_available());
    }

    #[tokio::test]
    async fn present_files_skip_the_download() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ModelManager::new(dir.path());
        std::fs::create_dir_all(manager.model_dir()).unwrap();
        std::fs::write(manager.model_path(), b"onnx").unwrap();
        std::fs::write(manager.tokenizer_path(), b"{}").unwrap();

        assert!(manager.is_model_available());
        assert_eq!(manager.ensure_model().await.unwrap(), manager.model_path());
    }
}
