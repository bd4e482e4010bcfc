// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn orchestration: prompt, reply, session history and memory.
//!
//! A turn holds the session lock from prompt assembly until memory
//! processing finishes, so turns are handled strictly one after another
//! and memory work always follows the complete visible reply.

use std::sync::Arc;

use lumen_config::LumenConfig;
use lumen_core::{
    ChatTurn, CompletionRequest, EmbeddingAdapter, LanguageModel, ProfileMap, Role,
};
use lumen_memory::MemoryManager;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::context::build_prompt;
use crate::reply::{complete_with_fallback, stream_with_fallback};
use crate::session::SessionState;

/// Prefix (case-insensitive) that turns an input into a memory lookup.
pub const MEMORY_SEARCH_PREFIX: &str = "search memory for";

/// Reply to a memory lookup with no hits.
pub const NO_MEMORY_FOUND: &str = "No matching memory found.";

/// The assistant: a language model, a session and (optionally) memory.
pub struct AgentCore {
    model: Arc<dyn LanguageModel>,
    memory: Option<Mutex<MemoryManager>>,
    session: Mutex<SessionState>,
    name: String,
    retrieval_top_k: usize,
    session_behavior: bool,
}

impl AgentCore {
    /// Assembles an agent from parts. `memory` is `None` when the memory
    /// pipeline is disabled.
    pub fn new(
        config: &LumenConfig,
        model: Arc<dyn LanguageModel>,
        memory: Option<MemoryManager>,
    ) -> Self {
        Self {
            model,
            memory: memory.map(Mutex::new),
            session: Mutex::new(SessionState::new(config.agent.session_capacity)),
            name: config.agent.name.clone(),
            retrieval_top_k: config.memory.retrieval_top_k,
            session_behavior: config.memory.session_behavior,
        }
    }

    /// Builds the agent and, when enabled, its memory manager.
    pub async fn from_config(
        config: &LumenConfig,
        model: Arc<dyn LanguageModel>,
        embedder: Arc<dyn EmbeddingAdapter>,
    ) -> Self {
        let memory = if config.memory.enabled {
            Some(MemoryManager::new(&config.memory, model.clone(), embedder).await)
        } else {
            info!("memory pipeline disabled by configuration");
            None
        };
        Self::new(config, model, memory)
    }

    /// Produces the full reply to one user input.
    pub async fn respond(&self, input: &str) -> String {
        let input = input.trim();
        if let Some(query) = parse_memory_search(input) {
            return self.search_memory(query).await;
        }

        let mut session = self.session.lock().await;
        let request = self.build_request(&session, input).await;
        let reply = complete_with_fallback(self.model.as_ref(), request).await;
        self.finish_turn(&mut session, input, &reply, self.session_behavior)
            .await;
        reply
    }

    /// Like [`respond`](Self::respond), but hands reply chunks to `sink` as
    /// they arrive. Memory processing starts after the stream ends; the
    /// session-wide behavior refresh is skipped on this path.
    pub async fn respond_stream<F>(&self, input: &str, mut sink: F) -> String
    where
        F: FnMut(&str) + Send,
    {
        let input = input.trim();
        if let Some(query) = parse_memory_search(input) {
            let result = self.search_memory(query).await;
            sink(&result);
            return result;
        }

        let mut session = self.session.lock().await;
        let request = self.build_request(&session, input).await;
        let reply = stream_with_fallback(self.model.as_ref(), request, sink).await;
        self.finish_turn(&mut session, input, &reply, false).await;
        reply
    }

    /// Clears the conversation history. The profile is kept.
    pub async fn reset_session(&self) {
        self.session.lock().await.reset();
        debug!("session reset");
    }

    /// Turns currently held in the session, oldest first.
    pub async fn session_turns(&self) -> Vec<ChatTurn> {
        self.session.lock().await.recent()
    }

    /// A copy of the user profile; empty when memory is disabled.
    pub async fn profile(&self) -> ProfileMap {
        match &self.memory {
            Some(memory) => memory.lock().await.get_profile(),
            None => ProfileMap::new(),
        }
    }

    pub fn memory_enabled(&self) -> bool {
        self.memory.is_some()
    }

    async fn build_request(
        &self,
        session: &MutexGuard<'_, SessionState>,
        input: &str,
    ) -> CompletionRequest {
        let profile = self.profile().await;
        CompletionRequest::new(build_prompt(&self.name, &profile, &session.recent(), input))
    }

    async fn search_memory(&self, query: &str) -> String {
        let hits = match &self.memory {
            Some(memory) => {
                memory
                    .lock()
                    .await
                    .retrieve_memory(query, self.retrieval_top_k)
                    .await
            }
            None => Vec::new(),
        };
        if hits.is_empty() {
            NO_MEMORY_FOUND.to_string()
        } else {
            hits.join("\n")
        }
    }

    async fn finish_turn(
        &self,
        session: &mut SessionState,
        input: &str,
        reply: &str,
        refresh_behavior: bool,
    ) {
        session.append_message(Role::User, input);
        session.append_message(Role::Assistant, reply);

        let Some(memory) = &self.memory else {
            return;
        };
        let mut memory = memory.lock().await;
        memory.log_turn(Role::User, input).await;
        memory.log_turn(Role::Assistant, reply).await;

        let report = memory.process_turn(input, reply).await;
        debug!(
            facts = report.facts_written.len(),
            behavior = report.behavior_updated,
            indexed = report.memory_indexed,
            "memory updated"
        );

        if refresh_behavior {
            memory.refresh_behavior(&session.recent()).await;
        }
    }
}

/// Returns the query of a `search memory for ...` input.
pub fn parse_memory_search(input: &str) -> Option<&str> {
    let head = input.get(..MEMORY_SEARCH_PREFIX.len())?;
    if head.eq_ignore_ascii_case(MEMORY_SEARCH_PREFIX) {
        Some(input[MEMORY_SEARCH_PREFIX.len()..].trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_search_prefix_is_case_insensitive() {
        assert_eq!(parse_memory_search("Search Memory For my dog"), Some("my dog"));
        assert_eq!(parse_memory_search("search memory for"), Some(""));
        assert_eq!(parse_memory_search("please search memory for x"), None);
        assert_eq!(parse_memory_search("search"), None);
    }

    #[test]
    fn multibyte_input_does_not_panic() {
        assert_eq!(parse_memory_search("héllo wörld, search memory"), None);
        assert_eq!(parse_memory_search("😀😀😀😀😀"), None);
    }
}
