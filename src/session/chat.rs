use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use super::pipeline::{Dispatcher, Job, Outcome};
use super::turn::{AttachmentRef, Role, Turn, TurnId, TurnStatus};
use crate::backend::Backend;
use crate::error::SessionError;
use crate::i18n::{self, Phrase};

/// Default bound for every backend call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a chat session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Language tag the user reads and writes in.
    pub display_language: String,
    /// Knowledge base answering the questions, if any.
    pub bot_scope: Option<String>,
    /// Bound for each translate and chat call.
    pub request_timeout: Duration,
    /// The backend translates on its own, driven by the `language` field.
    pub server_translates: bool,
    /// Open the transcript with a welcome notice.
    pub greeting: bool,
    /// Add a notice when the display language changes.
    pub announce_language_switch: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            display_language: i18n::BACKEND_LANGUAGE.to_string(),
            bot_scope: None,
            request_timeout: DEFAULT_TIMEOUT,
            server_translates: false,
            greeting: false,
            announce_language_switch: false,
        }
    }
}

#[derive(Debug)]
pub(crate) struct State {
    transcript: Vec<Turn>,
    next_id: u64,
    display_language: String,
    bot_scope: Option<String>,
    /// Reply turns still waiting on the backend, oldest first.
    outstanding: VecDeque<TurnId>,
    alive: bool,
}

impl State {
    fn next_id(&mut self) -> TurnId {
        self.next_id += 1;
        TurnId::new(self.next_id)
    }

    fn push_system(&mut self, text: String) {
        let id = self.next_id();
        self.transcript.push(Turn::system(id, text));
    }

    fn turn_mut(&mut self, id: TurnId) -> Option<&mut Turn> {
        let index = self.transcript.binary_search_by_key(&id, |t| t.id).ok()?;
        self.transcript.get_mut(index)
    }

    /// The placeholder reply sits right after its user turn. Other roles have none.
    fn reply_to(&self, user: TurnId) -> Option<&Turn> {
        let index = self.transcript.binary_search_by_key(&user, |t| t.id).ok()?;
        if self.transcript[index].role != Role::User {
            return None;
        }
        self.transcript.get(index + 1)
    }
}

/// State shared between a session handle and its dispatcher task.
#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<State>,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    pub fn is_alive(&self) -> bool {
        self.lock().alive
    }

    /// Settles a pending reply. A no-op once the session is closed.
    pub fn resolve(&self, reply_id: TurnId, outcome: Outcome) {
        {
            let mut state = self.lock();
            if !state.alive {
                debug!(reply = %reply_id, "discarding reply for closed session");
                return;
            }
            state.outstanding.retain(|id| *id != reply_id);

            let Some(turn) = state.turn_mut(reply_id) else {
                return;
            };
            if !turn.is_pending() {
                return;
            }
            match outcome {
                Outcome::Delivered {
                    text,
                    raw_text,
                    sources,
                } => {
                    turn.text = text;
                    turn.raw_text = raw_text;
                    turn.sources = sources;
                    turn.status = TurnStatus::Delivered;
                }
                Outcome::Failed { text } => {
                    turn.raw_text.clone_from(&text);
                    turn.text = text;
                    turn.status = TurnStatus::Error;
                }
            }
        }
        self.bump();
    }
}

/// A conversation with the document chat backend.
///
/// Every submission appends the user's turn plus a pending reply turn right
/// after it. Requests then go out one at a time in submission order, and each
/// reply resolves in place. The transcript only ever grows.
///
/// Must be created inside a tokio runtime.
pub struct ChatSession {
    shared: Arc<Shared>,
    queue: mpsc::UnboundedSender<Job>,
    announce_language_switch: bool,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn Backend>, config: SessionConfig) -> Self {
        let mut state = State {
            transcript: Vec::new(),
            next_id: 0,
            display_language: config.display_language.clone(),
            bot_scope: config.bot_scope.clone(),
            outstanding: VecDeque::new(),
            alive: true,
        };
        if config.greeting {
            state.push_system(i18n::phrase(&config.display_language, Phrase::Welcome).to_string());
        }

        let (revision, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            revision,
        });

        let (queue, rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher {
            shared: Arc::clone(&shared),
            backend,
            timeout: config.request_timeout,
            server_translates: config.server_translates,
        };
        tokio::spawn(dispatcher.run(rx));

        Self {
            shared,
            queue,
            announce_language_switch: config.announce_language_switch,
        }
    }

    /// Sends a message and returns the user's turn without waiting for the reply.
    ///
    /// # Errors
    ///
    /// [`SessionError::Validation`] if `text` is blank and there are no
    /// attachments, [`SessionError::Disposed`] after [`dispose`](Self::dispose).
    pub fn submit(
        &self,
        text: &str,
        attachments: Vec<AttachmentRef>,
    ) -> Result<Turn, SessionError> {
        let text = text.trim();
        if text.is_empty() && attachments.is_empty() {
            return Err(SessionError::Validation);
        }

        let (query, translatable) = if text.is_empty() {
            let names: Vec<&str> = attachments.iter().map(|a| a.name.as_str()).collect();
            (names.join(", "), false)
        } else {
            (text.to_string(), true)
        };

        let (user, job) = {
            let mut state = self.shared.lock();
            if !state.alive {
                return Err(SessionError::Disposed);
            }

            let user_id = state.next_id();
            let reply_id = state.next_id();
            let user = Turn::user(user_id, text.to_string(), attachments);
            state.transcript.push(user.clone());
            state.transcript.push(Turn::pending_reply(reply_id));
            state.outstanding.push_back(reply_id);

            let job = Job {
                reply_id,
                query,
                translatable,
                language: state.display_language.clone(),
                bot_scope: state.bot_scope.clone(),
            };
            (user, job)
        };

        debug!(user = %user.id, reply = %job.reply_id, "queued message");
        let reply_id = job.reply_id;
        let language = job.language.clone();
        if self.queue.send(job).is_err() {
            // Dispatcher is gone (runtime shut down); fail the reply instead of leaving it pending.
            self.shared.resolve(
                reply_id,
                Outcome::Failed {
                    text: i18n::phrase(&language, Phrase::GenericError).to_string(),
                },
            );
        }
        self.shared.bump();
        Ok(user)
    }

    /// Changes the language used for future messages. Existing turns are left as they are.
    pub fn set_display_language(&self, lang: &str) {
        {
            let mut state = self.shared.lock();
            if state.display_language == lang {
                return;
            }
            state.display_language = lang.to_string();
            if self.announce_language_switch && state.alive && !i18n::is_backend_language(lang) {
                state.push_system(i18n::language_switched(lang));
            }
        }
        info!(language = lang, "display language changed");
        self.shared.bump();
    }

    /// Selects the bot that answers future messages.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidState`] while any request is outstanding.
    pub fn set_bot_scope(&self, bot: Option<String>) -> Result<(), SessionError> {
        let mut state = self.shared.lock();
        if let Some(&pending) = state.outstanding.front() {
            return Err(SessionError::InvalidState { pending });
        }
        info!(bot = ?bot, "bot scope changed");
        state.bot_scope = bot;
        Ok(())
    }

    /// Snapshot of the transcript.
    pub fn transcript(&self) -> Vec<Turn> {
        self.shared.lock().transcript.clone()
    }

    pub fn turn(&self, id: TurnId) -> Option<Turn> {
        let state = self.shared.lock();
        let index = state.transcript.binary_search_by_key(&id, |t| t.id).ok()?;
        state.transcript.get(index).cloned()
    }

    /// The reply turn created for the given user turn.
    pub fn reply_to(&self, user: TurnId) -> Option<Turn> {
        self.shared.lock().reply_to(user).cloned()
    }

    pub fn display_language(&self) -> String {
        self.shared.lock().display_language.clone()
    }

    pub fn bot_scope(&self) -> Option<String> {
        self.shared.lock().bot_scope.clone()
    }

    /// Id of the oldest reply still waiting on the backend.
    pub fn pending_request_id(&self) -> Option<TurnId> {
        self.shared.lock().outstanding.front().copied()
    }

    pub fn is_busy(&self) -> bool {
        !self.shared.lock().outstanding.is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        !self.shared.is_alive()
    }

    /// Watches the transcript; the value changes whenever a turn is added or resolved.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Waits until no request is outstanding (or the session is closed).
    pub async fn settled(&self) {
        let mut changes = self.subscribe();
        loop {
            {
                let state = self.shared.lock();
                if !state.alive || state.outstanding.is_empty() {
                    return;
                }
            }
            if changes.changed().await.is_err() {
                return;
            }
        }
    }

    /// Waits for the reply to `user` to resolve and returns it.
    ///
    /// Returns `None` if there is no such reply or the session closed first.
    pub async fn wait_for_reply(&self, user: TurnId) -> Option<Turn> {
        let mut changes = self.subscribe();
        loop {
            {
                let state = self.shared.lock();
                let reply = state.reply_to(user)?;
                if reply.status.is_resolved() {
                    return Some(reply.clone());
                }
                if !state.alive {
                    return None;
                }
            }
            if changes.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Closes the session. Replies that arrive later are discarded.
    pub fn dispose(&self) {
        {
            let mut state = self.shared.lock();
            if !state.alive {
                return;
            }
            state.alive = false;
        }
        debug!("chat session closed");
        self.shared.bump();
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.dispose();
    }
}
