// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory vector store with cosine nearest-neighbour lookup.
//!
//! Records are append-only and live for the lifetime of the process. The
//! search index is rebuilt from every record on each insert, which keeps
//! lookups trivial at the cost of O(n) work per insert.

use std::cmp::Ordering;
use std::sync::Arc;

use lumen_core::types::EmbeddingInput;
use lumen_core::{EmbeddingAdapter, LumenError, ProfileMap, ProfileValue};
use tracing::debug;
use uuid::Uuid;

use crate::types::{l2_normalize, MemoryRecord};

/// Append-only store of embedded texts.
pub struct VectorMemory {
    embedder: Arc<dyn EmbeddingAdapter>,
    records: Vec<MemoryRecord>,
    /// Unit-length copies of the record embeddings, parallel to `records`.
    index: Vec<Vec<f32>>,
}

impl VectorMemory {
    pub fn new(embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        Self {
            embedder,
            records: Vec::new(),
            index: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[MemoryRecord] {
        &self.records
    }

    /// Embeds `text`, stores it with `metadata` and rebuilds the index.
    /// Returns the new record's id.
    pub async fn add(&mut self, text: &str, metadata: ProfileMap) -> Result<String, LumenError> {
        let embedding = self.embed_one(text).await?;
        let id = Uuid::new_v4().to_string();
        self.records.push(MemoryRecord {
            id: id.clone(),
            text: text.to_string(),
            metadata,
            embedding,
        });
        self.rebuild_index();
        Ok(id)
    }

    /// Like [`add`](Self::add), but first records `text` in the metadata.
    pub async fn add_memory(
        &mut self,
        text: &str,
        mut metadata: ProfileMap,
    ) -> Result<String, LumenError> {
        metadata.insert("text".to_string(), ProfileValue::from(text));
        self.add(text, metadata).await
    }

    /// Returns up to `k` records closest to `text`, nearest first.
    ///
    /// Equal distances keep insertion order. Records whose embedding length
    /// differs from the query's are skipped.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<MemoryRecord>, LumenError> {
        if self.records.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query = l2_normalize(&self.embed_one(text).await?);
        let mut scored: Vec<(usize, f32)> = self
            .index
            .iter()
            .enumerate()
            .filter(|(_, row)| row.len() == query.len())
            .map(|(i, row)| {
                let similarity: f32 = row.iter().zip(query.iter()).map(|(a, b)| a * b).sum();
                (i, 1.0 - similarity)
            })
            .collect();

        // Stable sort, so ties stay in insertion order.
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, _)| self.records[i].clone())
            .collect())
    }

    /// Like [`query`](Self::query) but returns only the texts.
    pub async fn search(&self, text: &str, k: usize) -> Result<Vec<String>, LumenError> {
        Ok(self
            .query(text, k)
            .await?
            .into_iter()
            .map(|r| r.text)
            .collect())
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, LumenError> {
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| LumenError::Internal("embedding returned no results".to_string()))
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .records
            .iter()
            .map(|r| l2_normalize(&r.embedding))
            .collect();
        debug!(records = self.index.len(), "rebuilt vector index");
    }
}
