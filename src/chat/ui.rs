//! Chat mode UI components.

use crate::config::ResolvedConfig;
use crate::i18n::language_name;
use crate::session::{AttachmentRef, Role, Source, Turn, TurnStatus};
use crate::ui::Style;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_header() {
    println!(
        "{} {} - Document chat",
        Style::header("docchat"),
        Style::version(format!("v{VERSION}"))
    );
    println!();
}

pub fn print_goodbye() {
    println!("{}", Style::success("Goodbye!"));
}

pub fn print_config(config: &ResolvedConfig, language: &str, bot: Option<&str>) {
    println!("{}", Style::header("Configuration"));
    println!(
        "  {}   {}",
        Style::label("endpoint"),
        Style::secondary(&config.endpoint)
    );
    println!(
        "  {}   {} {}",
        Style::label("language"),
        Style::value(language),
        Style::secondary(format!("({})", language_name(language)))
    );
    println!(
        "  {}        {}",
        Style::label("bot"),
        bot.map_or_else(|| Style::secondary("(all documents)"), Style::value)
    );
    println!(
        "  {}    {}",
        Style::label("timeout"),
        Style::value(format!("{}s", config.request_timeout.as_secs()))
    );
    println!(
        "  {} {}",
        Style::label("translation"),
        Style::value(if config.server_translates {
            "server"
        } else {
            "client"
        })
    );
    println!();
}

pub fn print_help() {
    println!("{}", Style::header("Available commands"));
    let rows = [
        ("/lang <code>", "Change the display language"),
        ("/bot [id]", "Ask a specific bot; no id asks all documents"),
        ("/attach <path>", "Attach a file to the next message"),
        ("/history", "Show the conversation so far"),
        ("/config", "Show current configuration"),
        ("/help", "Show this help"),
        ("/quit", "Exit chat mode"),
    ];
    for (command, description) in rows {
        println!(
            "  {:16} {}",
            Style::command(command),
            Style::secondary(description)
        );
    }
    println!();
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
    eprintln!();
}

pub fn print_attachment(attachment: &AttachmentRef) {
    println!(
        "{} {} {}",
        Style::success("+"),
        Style::value(&attachment.name),
        Style::secondary(format!(
            "({}, {})",
            format_size(attachment.byte_size),
            attachment.mime_type
        ))
    );
}

pub fn print_turn(turn: &Turn) {
    match (turn.role, turn.status) {
        (Role::User, _) => {
            println!("{} {}", Style::label("you:"), turn.text);
            for attachment in &turn.attachments {
                println!("     {}", Style::secondary(format!("📎 {}", attachment.name)));
            }
        }
        (Role::System, _) => println!("{}", Style::notice(&turn.text)),
        (Role::Bot, TurnStatus::Pending) => println!("{}", Style::secondary("…")),
        (Role::Bot, TurnStatus::Error) => println!("{}", Style::error(&turn.text)),
        (Role::Bot, TurnStatus::Delivered) => {
            println!("{} {}", Style::bot("bot:"), turn.text);
            print_sources(&turn.sources);
        }
    }
    println!();
}

pub fn print_sources(sources: &[Source]) {
    if sources.is_empty() {
        return;
    }
    println!();
    for (index, source) in sources.iter().enumerate() {
        println!("  {}", Style::source(format_source(index + 1, source)));
    }
}

fn format_source(position: usize, source: &Source) -> String {
    let pages = source
        .page_count
        .map(|n| format!(", {n} page{}", if n == 1 { "" } else { "s" }))
        .unwrap_or_default();
    format!(
        "[{position}] {} (score {:.2}{pages})",
        source.label, source.score
    )
}

fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < KB * KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{:.1} MB", bytes / KB / KB)
    }
}
