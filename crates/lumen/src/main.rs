// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lumen - A local chat assistant that remembers its user.
//!
//! This is the binary entry point for the Lumen assistant.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod doctor;
mod shell;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use lumen_agent::AgentCore;
use lumen_config::LumenConfig;
use lumen_core::{EmbeddingAdapter, LumenError};
use lumen_memory::{HashingEmbedder, ModelManager, OnnxEmbedder, ProfileStore};
use lumen_ollama::{OllamaClient, OllamaEmbedder, OllamaProvider};
use tracing::{info, warn};

/// Lumen - A local chat assistant that remembers its user.
#[derive(Parser, Debug)]
#[command(name = "lumen", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat session (default).
    Shell,
    /// Print the stored user profile as JSON.
    Profile,
    /// Run diagnostic checks against the local environment.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match lumen_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            lumen_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Shell) | None => shell::run_shell(config).await,
        Some(Commands::Profile) => print_profile(&config).await,
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
    };

    if let Err(e) = result {
        eprintln!("lumen: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lumen={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the assistant: Ollama model, configured embedder and memory.
///
/// When the embedder cannot be set up the assistant still runs, without
/// the memory pipeline.
pub(crate) async fn build_agent(config: &LumenConfig) -> Result<AgentCore, LumenError> {
    let provider = OllamaProvider::new(config).await?;
    info!(model = provider.model(), "using language model");
    let model = Arc::new(provider.clone());

    if !config.memory.enabled {
        return Ok(AgentCore::new(config, model, None));
    }
    match build_embedder(config, provider.client()).await {
        Ok(embedder) => Ok(AgentCore::from_config(config, model, embedder).await),
        Err(e) => {
            warn!(error = %e, "embedder initialization failed, continuing without memory");
            Ok(AgentCore::new(config, model, None))
        }
    }
}

/// Selects the embedding backend named by `memory.embedder`.
async fn build_embedder(
    config: &LumenConfig,
    client: &OllamaClient,
) -> Result<Arc<dyn EmbeddingAdapter>, LumenError> {
    match config.memory.embedder.as_str() {
        "onnx" => {
            let manager = ModelManager::new(&config.memory.model_dir);
            info!("ensuring embedding model is available...");
            let model_path = manager.ensure_model().await?;
            let embedder = tokio::task::spawn_blocking(move || OnnxEmbedder::new(&model_path))
                .await
                .map_err(|e| LumenError::Internal(format!("embedder load task failed: {e}")))??;
            Ok(Arc::new(embedder))
        }
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            client.clone(),
            config.ollama.embedding_model.clone(),
        ))),
        "hashing" => Ok(Arc::new(HashingEmbedder::new(config.memory.embedding_dim))),
        other => Err(LumenError::Config(format!("unknown embedder: {other}"))),
    }
}

/// Runs `lumen profile`: prints the profile file as pretty JSON.
async fn print_profile(config: &LumenConfig) -> Result<(), LumenError> {
    let store = ProfileStore::open(&config.memory.profile_path).await;
    println!("{}", render_profile(&store.get_all())?);
    Ok(())
}

pub(crate) fn render_profile(profile: &lumen_core::ProfileMap) -> Result<String, LumenError> {
    serde_json::to_string_pretty(profile).map_err(|e| LumenError::Internal(e.to_string()))
}

/// Client used by diagnostics, with a short timeout.
pub(crate) fn diagnostic_client(config: &LumenConfig) -> Result<OllamaClient, LumenError> {
    OllamaClient::new(config.ollama.base_url.clone(), Duration::from_secs(5))
}
