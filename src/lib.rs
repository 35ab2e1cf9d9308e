//! # docchat - Multilingual document chat client
//!
//! `docchat` talks to a document question-answering backend (`POST /chat`)
//! and lets people ask in their own language: questions are translated to
//! English and answers back through the backend's `POST /translate`, or the
//! backend does it itself when configured to.
//!
//! The heart of the crate is [`session::ChatSession`], which keeps the
//! transcript, shows the user's message immediately, sends requests one at a
//! time and resolves each reply in submission order.
//!
//! ## Quick Start
//!
//! ```bash
//! # Interactive chat in Spanish against the HR handbook bot
//! docchat --lang es --bot hr-handbook
//!
//! # One question, answer on stdout
//! docchat ask "What is the refund policy?"
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/docchat/config.toml`:
//!
//! ```toml
//! [docchat]
//! endpoint = "http://localhost:5000"
//! language = "es"
//! bot = "hr-handbook"
//! timeout_secs = 30
//! server_translates = false
//! ```

/// Chat and translation backend over HTTP.
pub mod backend;

/// Interactive chat mode.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management.
pub mod config;

/// Error types.
pub mod error;

/// File system utilities.
pub mod fs;

/// Display languages and built-in phrases.
pub mod i18n;

/// Question input for one-shot mode.
pub mod input;

/// Tracing subscriber setup.
pub mod logging;

/// XDG-style path utilities for configuration.
pub mod paths;

/// Chat sessions and transcripts.
pub mod session;

/// Terminal UI components (spinner, colors).
pub mod ui;
