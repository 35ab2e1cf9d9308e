//! Configuration file management and CLI override resolution.

mod manager;

pub use manager::{
    ConfigFile, ConfigManager, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, DocchatConfig,
    ResolveOptions, ResolvedConfig, resolve_config,
};
