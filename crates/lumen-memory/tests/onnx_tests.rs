// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic recall with the real all-MiniLM-L6-v2 model.
//!
//! These tests download the model on first run, so they are ignored by
//! default. Run with `cargo test -p lumen-memory -- --ignored`.

use std::sync::Arc;

use lumen_core::EmbeddingAdapter;
use lumen_memory::{EMBEDDING_DIM, ModelManager, OnnxEmbedder, VectorMemory};

async fn embedder() -> OnnxEmbedder {
    let manager = ModelManager::new(std::env::temp_dir().join("lumen-test-models"));
    let path = manager.ensure_model().await.unwrap();
    OnnxEmbedder::new(&path).unwrap()
}

#[tokio::test]
#[ignore = "downloads the embedding model"]
async fn related_meaning_outranks_unrelated_words() {
    let mut memory = VectorMemory::new(Arc::new(embedder().await));
    memory
        .add_memory("User: my taxes are due in April", Default::default())
        .await
        .unwrap();
    memory
        .add_memory("User: I adopted a puppy last week", Default::default())
        .await
        .unwrap();

    let hits = memory.search("what is my pet dog called", 2).await.unwrap();
    assert_eq!(hits[0], "User: I adopted a puppy last week");
}

#[tokio::test]
#[ignore = "downloads the embedding model"]
async fn batch_embeddings_match_single_embeddings() {
    let embedder = embedder().await;
    let texts = vec!["short".to_string(), "a somewhat longer sentence here".to_string()];

    let batch = embedder.embed_texts(&texts).unwrap();
    let single = embedder.embed_texts(&texts[..1]).unwrap();

    assert_eq!(embedder.dimensions(), EMBEDDING_DIM);
    assert_eq!(batch[0].len(), EMBEDDING_DIM);
    for (a, b) in batch[0].iter().zip(&single[0]) {
        assert!((a - b).abs() < 1e-4);
    }
}
