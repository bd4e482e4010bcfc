// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory pipeline for the Lumen assistant.
//!
//! ## Architecture
//!
//! - **FactExtractor**: pattern-based facts from the latest user utterance
//! - **BehaviorAnalyzer**: LLM-inferred mood, tone, goals and habits
//! - **Summarizer**: LLM compaction of long exchanges
//! - **OnnxEmbedder**: local all-MiniLM-L6-v2 sentence embeddings
//! - **ModelManager**: first-run download of the embedding model
//! - **HashingEmbedder**: lexical embeddings for offline use and tests
//! - **VectorMemory**: in-memory cosine nearest-neighbour store
//! - **ProfileStore**: durable JSON key/value profile
//! - **SessionLogger**: optional daily JSONL turn log
//! - **MemoryManager**: runs all of the above once per turn

pub mod behavior;
pub mod embedder;
pub mod extractor;
pub mod hashing;
pub mod manager;
pub mod model_manager;
pub mod profile;
pub mod summarizer;
pub mod turn_log;
pub mod types;
pub mod vector;

pub use behavior::BehaviorAnalyzer;
pub use embedder::{OnnxEmbedder, EMBEDDING_DIM};
pub use extractor::FactExtractor;
pub use hashing::HashingEmbedder;
pub use manager::MemoryManager;
pub use model_manager::ModelManager;
pub use profile::{ProfileStore, BEHAVIOR_KEY};
pub use summarizer::Summarizer;
pub use turn_log::SessionLogger;
pub use types::*;
pub use vector::VectorMemory;
