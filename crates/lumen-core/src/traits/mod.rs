// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Every external collaborator (language model, embedder) sits behind one
//! of these traits so the memory pipeline can be exercised with mocks.

pub mod adapter;
pub mod embedding;
pub mod model;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use model::{ChunkStream, LanguageModel};
