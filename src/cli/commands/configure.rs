//! Configure command handler for editing default settings.

use anyhow::{Result, bail};
use inquire::{Confirm, Select, Text};

use crate::config::{
    ConfigFile, ConfigManager, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, DocchatConfig,
};
use crate::i18n::SUPPORTED_LANGUAGES;
use crate::ui::{Style, handle_prompt_cancellation};

/// Runs the configure command.
///
/// With `show`, prints the current defaults; otherwise edits them interactively.
pub fn run_configure(show: bool) -> Result<()> {
    let manager = ConfigManager::new()?;
    let config = manager.load_or_default()?;

    print_current_defaults(&config);
    if show {
        println!(
            "{} {}",
            Style::label("file"),
            Style::secondary(manager.config_path().display().to_string())
        );
        return Ok(());
    }

    let Some(updated) = handle_prompt_cancellation(|| prompt_defaults(&config.docchat))? else {
        return Ok(());
    };

    manager.save(&ConfigFile { docchat: updated })?;

    println!();
    println!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(manager.config_path().display().to_string())
    );

    Ok(())
}

fn prompt_defaults(current: &DocchatConfig) -> Result<DocchatConfig> {
    let endpoint = Text::new("Backend endpoint:")
        .with_default(current.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT))
        .prompt()?;
    let endpoint = endpoint.trim().to_string();
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        bail!("Endpoint must start with http:// or https://");
    }

    let language = select_language(current.language.as_deref())?;

    let bot = Text::new("Default bot id:")
        .with_default(current.bot.as_deref().unwrap_or(""))
        .with_help_message("Leave empty to ask across all documents")
        .prompt()?;
    let bot = Some(bot.trim().to_string()).filter(|b| !b.is_empty());

    let timeout_secs = select_timeout(current.timeout_secs)?;

    let server_translates = Confirm::new("Let the backend translate?")
        .with_default(current.server_translates.unwrap_or(false))
        .with_help_message("Otherwise questions and answers are translated through /translate")
        .prompt()?;

    Ok(DocchatConfig {
        endpoint: Some(endpoint),
        language: Some(language),
        bot,
        timeout_secs: Some(timeout_secs),
        server_translates: Some(server_translates),
        greeting: current.greeting,
        announce_language_switch: current.announce_language_switch,
    })
}

fn select_language(default: Option<&str>) -> Result<String> {
    // Build options with format "code - Name"
    let options: Vec<String> = SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, name, _)| format!("{code} - {name}"))
        .collect();

    let default_index = default
        .and_then(|d| SUPPORTED_LANGUAGES.iter().position(|(code, _, _)| *code == d))
        .or_else(|| SUPPORTED_LANGUAGES.iter().position(|(code, _, _)| *code == "en"))
        .unwrap_or(0);

    let selection = Select::new("Display language:", options)
        .with_starting_cursor(default_index)
        .prompt()?;

    // Extract code from "code - Name" format
    let code = selection.split(" - ").next().unwrap_or(&selection);
    Ok(code.to_string())
}

fn select_timeout(default: Option<u64>) -> Result<u64> {
    let default = default.unwrap_or(DEFAULT_TIMEOUT_SECS).to_string();
    let value = Text::new("Request timeout (seconds):")
        .with_default(&default)
        .prompt()?;

    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => bail!("Timeout must be a whole number of seconds greater than 0"),
    }
}

fn print_current_defaults(config: &ConfigFile) {
    let not_set = || Style::secondary("(not set)");
    let current = &config.docchat;

    println!("{}", Style::header("Current defaults"));
    println!(
        "  {}  {}",
        Style::label("endpoint"),
        current.endpoint.as_deref().map_or_else(not_set, Style::value)
    );
    println!(
        "  {}  {}",
        Style::label("language"),
        current.language.as_deref().map_or_else(not_set, Style::value)
    );
    println!(
        "  {}       {}",
        Style::label("bot"),
        current.bot.as_deref().map_or_else(not_set, Style::value)
    );
    println!(
        "  {}   {}",
        Style::label("timeout"),
        current
            .timeout_secs
            .map_or_else(not_set, |s| Style::value(format!("{s}s")))
    );
    println!(
        "  {}    {}",
        Style::label("server"),
        current
            .server_translates
            .map_or_else(not_set, |b| Style::value(if b { "translates" } else { "no" }))
    );
    println!();
}
