// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Active-model selection from the models installed locally.

use tracing::{info, warn};

use crate::client::OllamaClient;

/// Used when nothing is configured and the server lists no models.
pub const DEFAULT_MODEL: &str = "openhermes:latest";

/// Checked in order against locally installed model names.
pub const PREFERRED_MODELS: &[&str] = &["openhermes:latest", "llama3", "mistral", "gemma"];

/// Picks the model to use.
///
/// A non-empty `configured` name always wins. Otherwise the first installed
/// model matching [`PREFERRED_MODELS`] (substring match, in preference
/// order), then the first installed model, then [`DEFAULT_MODEL`].
pub fn select_model(configured: &str, installed: &[String]) -> String {
    let configured = configured.trim();
    if !configured.is_empty() {
        return configured.to_string();
    }

    PREFERRED_MODELS
        .iter()
        .find_map(|preferred| installed.iter().find(|name| name.contains(*preferred)))
        .or_else(|| installed.first())
        .cloned()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

/// Resolves the active model, querying `/api/tags` only when nothing is configured.
///
/// A failed listing is logged and treated as "no models installed".
pub async fn resolve_model(client: &OllamaClient, configured: &str) -> String {
    if !configured.trim().is_empty() {
        return configured.trim().to_string();
    }

    let installed = match client.list_models().await {
        Ok(models) => models,
        Err(e) => {
            warn!(error = %e, "could not list local models, using default");
            Vec::new()
        }
    };
    let model = select_model(configured, &installed);
    info!(model = %model, installed = installed.len(), "selected language model");
    model
}
