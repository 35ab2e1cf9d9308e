use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use super::load_config;
use crate::backend::HttpBackend;
use crate::chat::print_sources;
use crate::cli::SessionArgs;
use crate::input::read_question;
use crate::session::{AttachmentRef, ChatSession, TurnStatus};
use crate::ui::{Spinner, Style};

pub struct AskOptions {
    pub question: Option<String>,
    pub attachments: Vec<PathBuf>,
    pub session: SessionArgs,
}

/// Asks one question and prints the answer to stdout.
///
/// Returns the process exit code: success, or `UNAVAILABLE` when the
/// backend could not answer.
pub async fn run_ask(options: AskOptions) -> Result<i32> {
    let attachments = options
        .attachments
        .iter()
        .map(|path| {
            AttachmentRef::from_path(path)
                .with_context(|| format!("Cannot attach {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let question = read_question(options.question, !attachments.is_empty())?;

    let config = load_config(&(&options.session).into())?;
    let mut session_config = config.session_config();
    session_config.greeting = false;
    session_config.announce_language_switch = false;

    let backend = Arc::new(HttpBackend::new(config.endpoint.clone()));
    let session = ChatSession::new(backend, session_config);

    let user = session.submit(&question, attachments)?;

    let spinner = Spinner::new("Thinking...");
    let reply = session.wait_for_reply(user.id).await;
    spinner.stop();

    let Some(reply) = reply else {
        anyhow::bail!("Session closed before the answer arrived");
    };

    if reply.status == TurnStatus::Error {
        eprintln!("{} {}", Style::error("Error:"), reply.text);
        return Ok(exitcode::UNAVAILABLE);
    }

    println!("{}", reply.text);
    print_sources(&reply.sources);
    Ok(exitcode::OK)
}
