use anyhow::Result;
use inquire::Text;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};
use std::path::Path;
use std::sync::Arc;

use super::command::{Input, SlashCommand, SlashCommandCompleter, parse_input};
use super::ui;
use crate::backend::Backend;
use crate::config::ResolvedConfig;
use crate::i18n::validate_language;
use crate::session::{AttachmentRef, ChatSession, Role, TurnId};
use crate::ui::{Spinner, Style};

/// An interactive chat in the terminal.
pub struct Repl {
    config: ResolvedConfig,
    session: ChatSession,
    attachments: Vec<AttachmentRef>,
    /// Transcript entries already printed.
    shown: usize,
}

impl Repl {
    pub fn new(backend: Arc<dyn Backend>, config: ResolvedConfig) -> Self {
        let session = ChatSession::new(backend, config.session_config());
        Self {
            config,
            session,
            attachments: Vec::new(),
            shown: 0,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        ui::print_header();
        self.print_new_turns();

        let prompt_style = Styled::new("❯")
            .with_fg(Color::LightBlue)
            .with_attr(Attributes::BOLD);
        let mut render_config = RenderConfig::default()
            .with_prompt_prefix(prompt_style)
            .with_answered_prompt_prefix(prompt_style);

        // Non-highlighted suggestions: gray
        render_config.option = StyleSheet::new().with_fg(Color::Grey);
        // Highlighted suggestion: purple
        render_config.selected_option = Some(StyleSheet::new().with_fg(Color::DarkMagenta));

        loop {
            let input = Text::new("")
                .with_render_config(render_config)
                .with_autocomplete(SlashCommandCompleter)
                .with_help_message("Ask about your documents, /help for commands, Ctrl+C to quit")
                .prompt();

            match input {
                Ok(line) => match parse_input(&line) {
                    // A blank line sends pending attachments on their own.
                    Input::Empty if !self.attachments.is_empty() => self.ask("").await,
                    Input::Empty => {}
                    Input::Command(cmd) => {
                        if !self.handle_command(cmd) {
                            break;
                        }
                    }
                    Input::Text(text) => self.ask(&text).await,
                },
                Err(
                    inquire::InquireError::OperationCanceled
                    | inquire::InquireError::OperationInterrupted,
                ) => {
                    println!(); // Clear line before goodbye message
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.session.dispose();
        ui::print_goodbye();
        Ok(())
    }

    async fn ask(&mut self, text: &str) {
        let attachments = std::mem::take(&mut self.attachments);
        let user = match self.session.submit(text, attachments) {
            Ok(turn) => turn,
            Err(e) => {
                ui::print_error(&e.to_string());
                return;
            }
        };
        self.wait_for(user.id).await;
    }

    async fn wait_for(&mut self, user: TurnId) {
        let spinner = Spinner::new("Thinking...");
        self.session.wait_for_reply(user).await;
        spinner.stop();
        self.print_new_turns();
    }

    /// Prints resolved turns added since the last call, except the user's own.
    fn print_new_turns(&mut self) {
        let transcript = self.session.transcript();
        for turn in transcript.iter().skip(self.shown) {
            if turn.is_pending() {
                break;
            }
            if turn.role != Role::User {
                ui::print_turn(turn);
            }
            self.shown += 1;
        }
    }

    fn handle_command(&mut self, cmd: SlashCommand) -> bool {
        match cmd {
            SlashCommand::Attach(path) => self.attach(path.as_deref()),
            SlashCommand::Bot(bot) => self.set_bot(bot),
            SlashCommand::Config => {
                ui::print_config(
                    &self.config,
                    &self.session.display_language(),
                    self.session.bot_scope().as_deref(),
                );
            }
            SlashCommand::Help => ui::print_help(),
            SlashCommand::History => {
                for turn in self.session.transcript() {
                    ui::print_turn(&turn);
                }
            }
            SlashCommand::Lang(lang) => self.set_language(lang.as_deref()),
            SlashCommand::Quit => return false,
            SlashCommand::Unknown(cmd) => {
                ui::print_error(&format!("Unknown command: /{cmd}"));
            }
        }
        true
    }

    fn set_language(&mut self, value: Option<&str>) {
        let Some(lang) = value else {
            ui::print_error("Usage: /lang <code>  (see 'docchat languages')");
            return;
        };
        if let Err(e) = validate_language(lang) {
            ui::print_error(&e.to_string());
            return;
        }

        self.session.set_display_language(lang);
        println!(
            "{} Display language set to {}\n",
            Style::success("✓"),
            Style::value(lang)
        );
        self.print_new_turns();
    }

    fn set_bot(&self, bot: Option<String>) {
        let label = bot.clone();
        match self.session.set_bot_scope(bot) {
            Ok(()) => match label {
                Some(id) => println!("{} Asking bot {}\n", Style::success("✓"), Style::value(id)),
                None => println!("{} Asking all documents\n", Style::success("✓")),
            },
            Err(e) => ui::print_error(&e.to_string()),
        }
    }

    fn attach(&mut self, path: Option<&str>) {
        let Some(path) = path else {
            ui::print_error("Usage: /attach <path>");
            return;
        };
        match AttachmentRef::from_path(Path::new(path)) {
            Ok(attachment) => {
                ui::print_attachment(&attachment);
                self.attachments.push(attachment);
            }
            Err(e) => ui::print_error(&format!("Cannot attach {path}: {e}")),
        }
    }
}
