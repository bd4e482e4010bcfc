// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn coordination of the memory pipeline.
//!
//! After every exchange the manager extracts facts into the profile, infers
//! behavior, and indexes the exchange (summarized when long) in vector
//! memory. Each step is isolated: a failure is logged and the next step
//! still runs. Callers must not run two `process_turn` calls at once; the
//! `&mut self` receiver enforces that within one owner.

use std::sync::Arc;

use lumen_config::model::MemoryConfig;
use lumen_core::{ChatTurn, EmbeddingAdapter, LanguageModel, ProfileMap, ProfileValue, Role};
use tracing::{debug, info, warn};

use crate::behavior::BehaviorAnalyzer;
use crate::extractor::FactExtractor;
use crate::profile::{ProfileStore, BEHAVIOR_KEY};
use crate::summarizer::Summarizer;
use crate::turn_log::SessionLogger;
use crate::types::{BehaviorSnapshot, TurnReport};
use crate::vector::VectorMemory;

/// Owns the profile and vector memory and runs the turn protocol.
pub struct MemoryManager {
    profile: ProfileStore,
    vector: VectorMemory,
    extractor: FactExtractor,
    behavior: BehaviorAnalyzer,
    summarizer: Summarizer,
    turn_log: Option<SessionLogger>,
    summarize_threshold: usize,
}

impl MemoryManager {
    /// Builds a manager from configuration, loading the profile from disk.
    pub async fn new(
        config: &MemoryConfig,
        model: Arc<dyn LanguageModel>,
        embedder: Arc<dyn EmbeddingAdapter>,
    ) -> Self {
        let profile = ProfileStore::open(&config.profile_path).await;
        let turn_log = config
            .turn_log
            .then(|| SessionLogger::new(&config.log_dir));
        info!(
            profile = %profile.path().display(),
            facts = profile.len(),
            embedder = embedder.name(),
            turn_log = turn_log.is_some(),
            "memory manager ready"
        );

        Self {
            profile,
            vector: VectorMemory::new(embedder),
            extractor: FactExtractor::new(),
            behavior: BehaviorAnalyzer::new(
                model.clone(),
                config.behavior_window,
                config.behavior_temperature,
            ),
            summarizer: Summarizer::new(model),
            turn_log,
            summarize_threshold: config.summarize_threshold,
        }
    }

    /// Runs extraction, behavior inference and indexing for one exchange.
    pub async fn process_turn(&mut self, user_text: &str, assistant_text: &str) -> TurnReport {
        let mut report = TurnReport::default();

        // Facts and behavior look at the user's side only.
        let window = [ChatTurn::user(user_text)];

        for fact in self.extractor.extract(&window) {
            if self.profile.set(fact.key.clone(), fact.value).await.is_err() {
                report.persist_failed = true;
            }
            report.facts_written.push(fact.key);
        }

        if let Some(snapshot) = self.behavior.analyze(&window).await {
            let updated = self.store_behavior(snapshot, &mut report).await;
            report.behavior_updated = updated;
        }

        let snippet = format!("User: {user_text} Assistant: {assistant_text}");
        let text = if snippet.chars().count() > self.summarize_threshold {
            let summary = self.summarizer.summarize(&snippet).await;
            report.summarized = summary != snippet;
            summary
        } else {
            snippet
        };

        let mut metadata = ProfileMap::new();
        metadata.insert(
            "timestamp".to_string(),
            ProfileValue::from(chrono::Utc::now().to_rfc3339()),
        );
        match self.vector.add_memory(&text, metadata).await {
            Ok(id) => {
                debug!(id = %id, summarized = report.summarized, "indexed exchange");
                report.memory_indexed = true;
            }
            Err(e) => warn!(error = %e, "failed to index exchange in vector memory"),
        }

        debug!(?report, "turn processed");
        report
    }

    /// Re-runs behavior inference over a longer window, typically the whole
    /// session. Returns whether the stored snapshot was replaced.
    pub async fn refresh_behavior(&mut self, turns: &[ChatTurn]) -> bool {
        let Some(snapshot) = self.behavior.analyze(turns).await else {
            return false;
        };
        let mut report = TurnReport::default();
        self.store_behavior(snapshot, &mut report).await
    }

    async fn store_behavior(&mut self, snapshot: BehaviorSnapshot, report: &mut TurnReport) -> bool {
        if snapshot.is_empty() {
            debug!("behavior analysis inferred nothing, keeping previous snapshot");
            return false;
        }
        if self
            .profile
            .set(BEHAVIOR_KEY, snapshot.to_profile_value())
            .await
            .is_err()
        {
            report.persist_failed = true;
        }
        true
    }

    /// Returns a copy of the whole profile.
    pub fn get_profile(&self) -> ProfileMap {
        self.profile.get_all()
    }

    pub fn get_fact(&self, key: &str) -> Option<&ProfileValue> {
        self.profile.get(key)
    }

    /// Returns the texts of up to `k` memories nearest to `query`.
    /// Failures are logged and yield no results.
    pub async fn retrieve_memory(&self, query: &str, k: usize) -> Vec<String> {
        match self.vector.search(query, k).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "memory retrieval failed");
                Vec::new()
            }
        }
    }

    /// Appends a turn to the daily log when turn logging is enabled.
    pub async fn log_turn(&self, role: Role, text: &str) {
        let Some(logger) = &self.turn_log else {
            return;
        };
        if let Err(e) = logger.log(role, text).await {
            warn!(dir = %logger.dir().display(), error = %e, "failed to write turn log");
        }
    }

    pub fn profile(&self) -> &ProfileStore {
        &self.profile
    }

    pub fn vector(&self) -> &VectorMemory {
        &self.vector
    }
}
