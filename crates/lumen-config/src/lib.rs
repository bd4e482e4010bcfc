// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings for Lumen: the Ollama endpoint, the agent persona and the
//! memory pipeline.
//!
//! A [`LumenConfig`] starts from compiled defaults, is overlaid by any
//! `lumen.toml` found on [`loader::search_paths`] and finally by `LUMEN_*`
//! environment variables. The `load_and_validate*` entry points run the
//! semantic checks in [`validation`] and hand back every problem at once as
//! [`ConfigError`] diagnostics, ready for [`render_errors`].
//!
//! ```no_run
//! let config = match lumen_config::load_and_validate() {
//!     Ok(config) => config,
//!     Err(errors) => {
//!         lumen_config::render_errors(&errors);
//!         std::process::exit(2);
//!     }
//! };
//! println!("talking to {}", config.ollama.base_url);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::LumenConfig;

/// Load the layered configuration and validate it.
pub fn load_and_validate() -> Result<LumenConfig, Vec<ConfigError>> {
    checked(loader::load_config(), || {
        loader::search_paths()
            .iter()
            .filter_map(|path| read_source(path))
            .collect()
    })
}

/// Load a single config file (plus environment overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<LumenConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Parse inline TOML over the defaults and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<LumenConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Validate a loaded config, or turn the load error into diagnostics.
///
/// `sources` is only read when loading failed; its entries let unknown keys
/// point into the file that holds them.
fn checked(
    loaded: Result<LumenConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<LumenConfig, Vec<ConfigError>> {
    let config =
        loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// A config file's display path and contents, if it can be read.
fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    let shown = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    Some((shown.display().to_string(), content))
}
