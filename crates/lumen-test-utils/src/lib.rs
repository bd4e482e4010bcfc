// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Lumen integration tests.
//!
//! Provides mock language models and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a running Ollama server.
//!
//! # Components
//!
//! - [`MockModel`] - Mock language model with scripted replies and failures
//! - [`FailingModel`] - Language model that fails every request
//! - [`FailingEmbedder`] - Embedder that fails after a set number of calls
//! - [`TestHarness`] - Full agent on a temp data directory

pub mod harness;
pub mod mock_embedder;
pub mod mock_model;

pub use harness::TestHarness;
pub use mock_embedder::FailingEmbedder;
pub use mock_model::{FailingModel, MockFailure, MockModel, MockReply, DEFAULT_REPLY};
