//! Interactive chat mode.
//!
//! Provides a REPL-style interface over a [`ChatSession`](crate::session::ChatSession)
//! with slash commands for language, bot and attachments.

/// Slash command parsing and autocomplete.
pub mod command;
mod repl;
mod ui;

pub use repl::Repl;
pub use ui::{print_sources, print_turn};
