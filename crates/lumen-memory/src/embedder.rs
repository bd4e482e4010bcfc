// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ONNX sentence embedder running all-MiniLM-L6-v2 locally.
//!
//! Produces 384-dimensional sentence embeddings on CPU. A batch of texts is
//! tokenized, right-padded to the longest sequence and run through the
//! model in one session call, then each row is mean-pooled over its real
//! tokens and L2-normalized.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ndarray::Array2;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use lumen_core::types::{EmbeddingInput, EmbeddingOutput};
use lumen_core::{AdapterType, EmbeddingAdapter, HealthStatus, LumenError, PluginAdapter};

use crate::types::l2_normalize;

/// Output width of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Sequence length the model was trained on; longer inputs are cut.
const MAX_TOKENS: usize = 256;

/// Token ids, attention mask and type ids for a padded batch.
#[derive(Debug, Default, PartialEq)]
struct Batch {
    rows: usize,
    seq_len: usize,
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
}

/// Embedder backed by an ONNX Runtime session and a HuggingFace tokenizer.
pub struct OnnxEmbedder {
    /// `Session::run` needs `&mut`, so calls are serialized.
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl OnnxEmbedder {
    /// Loads `model.onnx` from `model_path` and `tokenizer.json` from the
    /// same directory.
    pub fn new(model_path: &Path) -> Result<Self, LumenError> {
        let model_dir = model_path
            .parent()
            .ok_or_else(|| LumenError::Config(format!("invalid model path: {}", model_path.display())))?;

        let tokenizer_path = model_dir.join("tokenizer.json");
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            LumenError::Internal(format!(
                "failed to load tokenizer from {}: {e}",
                tokenizer_path.display()
            ))
        })?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..TruncationParams::default()
            }))
            .map_err(|e| LumenError::Internal(format!("failed to set tokenizer truncation: {e}")))?;

        let session = Session::builder()
            .map_err(|e| LumenError::Internal(format!("failed to create onnx session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| LumenError::Internal(format!("failed to set optimization level: {e}")))?
            .with_intra_threads(1)
            .map_err(|e| LumenError::Internal(format!("failed to set thread count: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| {
                LumenError::Internal(format!(
                    "failed to load ONNX model from {}: {e}",
                    model_path.display()
                ))
            })?;

        debug!(path = %model_path.display(), "onnx embedder loaded");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Embeds a batch of texts, one normalized vector per text.
    pub fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LumenError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut encoded = Vec::with_capacity(texts.len());
        for text in texts {
            let encoding = self
                .tokenizer
                .encode(text.as_str(), true)
                .map_err(|e| LumenError::Internal(format!("tokenization failed: {e}")))?;
            encoded.push((
                encoding.get_ids().to_vec(),
                encoding.get_attention_mask().to_vec(),
                encoding.get_type_ids().to_vec(),
            ));
        }
        let batch = pad_batch(&encoded);

        let shape = (batch.rows, batch.seq_len);
        let input_ids = to_array(shape, batch.input_ids.clone())?;
        let attention_mask = to_array(shape, batch.attention_mask.clone())?;
        let token_type_ids = to_array(shape, batch.token_type_ids.clone())?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| LumenError::Internal(format!("onnx session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => TensorRef::from_array_view(&input_ids).map_err(onnx_error)?,
                "attention_mask" => TensorRef::from_array_view(&attention_mask).map_err(onnx_error)?,
                "token_type_ids" => TensorRef::from_array_view(&token_type_ids).map_err(onnx_error)?
            ])
            .map_err(onnx_error)?;

        // last_hidden_state: [rows, seq_len, hidden]
        let (out_shape, data) = outputs[0].try_extract_tensor::<f32>().map_err(onnx_error)?;
        let hidden = out_shape[out_shape.len() - 1] as usize;

        Ok((0..batch.rows)
            .map(|row| {
                let start = row * batch.seq_len;
                let mask = &batch.attention_mask[start..start + batch.seq_len];
                let tokens = &data[start * hidden..(start + batch.seq_len) * hidden];
                l2_normalize(&mean_pool(tokens, mask, hidden))
            })
            .collect())
    }
}

fn onnx_error(e: impl std::fmt::Display) -> LumenError {
    LumenError::Internal(format!("onnx inference failed: {e}"))
}

fn to_array(shape: (usize, usize), values: Vec<i64>) -> Result<Array2<i64>, LumenError> {
    Array2::from_shape_vec(shape, values)
        .map_err(|e| LumenError::Internal(format!("bad input tensor shape: {e}")))
}

/// Right-pads every encoding with zeros (and mask 0) to the longest one.
fn pad_batch(encoded: &[(Vec<u32>, Vec<u32>, Vec<u32>)]) -> Batch {
    let seq_len = encoded.iter().map(|(ids, _, _)| ids.len()).max().unwrap_or(0);
    let mut batch = Batch {
        rows: encoded.len(),
        seq_len,
        ..Batch::default()
    };
    for (ids, mask, types) in encoded {
        for (target, source) in [
            (&mut batch.input_ids, ids),
            (&mut batch.attention_mask, mask),
            (&mut batch.token_type_ids, types),
        ] {
            target.extend(source.iter().map(|&v| i64::from(v)));
            target.extend(std::iter::repeat_n(0, seq_len - source.len()));
        }
    }
    batch
}

/// Averages the token vectors whose mask is set.
fn mean_pool(tokens: &[f32], mask: &[i64], hidden: usize) -> Vec<f32> {
    let mut sum = vec![0.0_f32; hidden];
    let mut count = 0usize;
    for (token, _) in tokens.chunks(hidden).zip(mask).filter(|(_, m)| **m > 0) {
        for (acc, v) in sum.iter_mut().zip(token) {
            *acc += v;
        }
        count += 1;
    }
    if count > 0 {
        sum.iter_mut().for_each(|v| *v /= count as f32);
    }
    sum
}

#[async_trait]
impl PluginAdapter for OnnxEmbedder {
    fn name(&self) -> &str {
        "onnx-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, LumenError> {
        match self.session.lock() {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("session lock poisoned: {e}"))),
        }
    }
}

#[async_trait]
impl EmbeddingAdapter for OnnxEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, LumenError> {
        Ok(EmbeddingOutput {
            embeddings: self.embed_texts(&input.texts)?,
            dimensions: EMBEDDING_DIM,
        })
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_batch_right_pads_to_longest() {
        let batch = pad_batch(&[
            (vec![101, 7, 102], vec![1, 1, 1], vec![0, 0, 0]),
            (vec![101, 102], vec![1, 1], vec![0, 0]),
        ]);
        assert_eq!(batch.rows, 2);
        assert_eq!(batch.seq_len, 3);
        assert_eq!(batch.input_ids, vec![101, 7, 102, 101, 102, 0]);
        assert_eq!(batch.attention_mask, vec![1, 1, 1, 1, 1, 0]);
        assert_eq!(batch.token_type_ids, vec![0; 6]);
    }

    #[test]
    fn mean_pool_ignores_padding() {
        // Two real tokens and one padded token with a large value.
        let tokens = [1.0, 2.0, 3.0, 4.0, 100.0, 100.0];
        let pooled = mean_pool(&tokens, &[1, 1, 0], 2);
        assert_eq!(pooled, vec![2.0, 3.0]);
    }

    #[test]
    fn mean_pool_with_empty_mask_is_zero() {
        assert_eq!(mean_pool(&[5.0, 5.0], &[0], 2), vec![0.0, 0.0]);
    }

    #[test]
    fn missing_model_files_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = OnnxEmbedder::new(&dir.path().join("model.onnx"));
        assert!(result.is_err());
    }
}
