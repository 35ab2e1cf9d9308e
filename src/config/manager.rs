use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::fs::atomic_write;
use crate::i18n::{BACKEND_LANGUAGE, validate_language};
use crate::paths;
use crate::session::SessionConfig;

/// Endpoint used when neither the CLI nor the config file names one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings in the `[docchat]` section of config.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocchatConfig {
    /// Base URL of the chat backend.
    pub endpoint: Option<String>,
    /// Default display language tag.
    pub language: Option<String>,
    /// Default bot (knowledge base) id.
    pub bot: Option<String>,
    /// Bound for each backend call, in seconds.
    pub timeout_secs: Option<u64>,
    /// Let the backend translate instead of the client.
    pub server_translates: Option<bool>,
    /// Show a welcome message when a chat starts.
    pub greeting: Option<bool>,
    /// Announce display language switches in the transcript.
    pub announce_language_switch: Option<bool>,
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/docchat/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub docchat: DocchatConfig,
}

/// Resolved configuration after merging CLI arguments and config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub language: String,
    pub bot: Option<String>,
    pub request_timeout: Duration,
    pub server_translates: bool,
    pub greeting: bool,
    pub announce_language_switch: bool,
}

impl ResolvedConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            display_language: self.language.clone(),
            bot_scope: self.bot.clone(),
            request_timeout: self.request_timeout,
            server_translates: self.server_translates,
            greeting: self.greeting,
            announce_language_switch: self.announce_language_switch,
        }
    }
}

/// CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub endpoint: Option<String>,
    pub language: Option<String>,
    pub bot: Option<String>,
    pub timeout_secs: Option<u64>,
    pub server_translates: bool,
}

/// Resolves configuration by merging CLI options with config file settings.
///
/// Priority: CLI option, then config file, then built-in default.
///
/// # Errors
///
/// Returns an error if the language is unsupported, the timeout is zero,
/// or the endpoint is not an http(s) URL.
pub fn resolve_config(
    options: &ResolveOptions,
    config_file: &ConfigFile,
) -> Result<ResolvedConfig> {
    let file = &config_file.docchat;

    let endpoint = options
        .endpoint
        .as_ref()
        .or(file.endpoint.as_ref())
        .cloned()
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        bail!(
            "Invalid endpoint: '{endpoint}'\n\n\
             The endpoint must start with http:// or https://"
        );
    }

    let language = options
        .language
        .as_ref()
        .or(file.language.as_ref())
        .cloned()
        .unwrap_or_else(|| BACKEND_LANGUAGE.to_string());
    validate_language(&language)?;

    let timeout_secs = options
        .timeout_secs
        .or(file.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        bail!("Invalid timeout: must be at least 1 second");
    }

    let bot = options
        .bot
        .as_ref()
        .or(file.bot.as_ref())
        .filter(|b| !b.trim().is_empty())
        .cloned();

    Ok(ResolvedConfig {
        endpoint,
        language,
        bot,
        request_timeout: Duration::from_secs(timeout_secs),
        server_translates: options.server_translates || file.server_translates.unwrap_or(false),
        greeting: file.greeting.unwrap_or(true),
        announce_language_switch: file.announce_language_switch.unwrap_or(true),
    })
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/docchat/config.toml`
    /// or `~/.config/docchat/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config_file: ConfigFile =
            toml::from_str(&contents).with_context(|| "Failed to parse config file")?;

        Ok(config_file)
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

        atomic_write(&self.config_path, &contents).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })
    }

    /// Loads the config file, treating a missing file as empty.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        if self.config_path.exists() {
            self.load()
        } else {
            Ok(ConfigFile::default())
        }
    }
}
