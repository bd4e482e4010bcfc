// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent orchestration for the Lumen assistant.
//!
//! [`AgentCore`] turns user input into a reply: it assembles the prompt
//! from the profile and session, calls the language model behind a
//! fallback boundary, and then feeds the exchange to the memory pipeline.

pub mod agent;
pub mod context;
pub mod reply;
pub mod session;

pub use agent::{parse_memory_search, AgentCore, MEMORY_SEARCH_PREFIX, NO_MEMORY_FOUND};
pub use context::build_prompt;
pub use reply::{complete_with_fallback, stream_with_fallback, NOT_RESPONDING, REQUEST_FAILED};
pub use session::SessionState;
