//! Subcommand implementations.

/// One-shot question handler.
pub mod ask;

/// Interactive chat handler.
pub mod chat;

/// Configure command handler.
pub mod configure;

use anyhow::Result;

use crate::config::{ConfigManager, ResolveOptions, ResolvedConfig, resolve_config};

/// Merges CLI overrides with the config file.
fn load_config(options: &ResolveOptions) -> Result<ResolvedConfig> {
    let manager = ConfigManager::new()?;
    let file_config = manager.load_or_default()?;
    resolve_config(options, &file_config)
}
