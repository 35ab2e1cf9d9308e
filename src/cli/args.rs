use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ResolveOptions;

#[derive(Parser, Debug)]
#[command(name = "docchat")]
#[command(about = "Chat with your documents in any language")]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Log pipeline steps to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Overrides for the config file, shared by `chat` and `ask`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Display language code (e.g., en, es, ja, zh-Hans)
    #[arg(short = 'l', long = "lang")]
    pub lang: Option<String>,

    /// Bot (knowledge base) that answers
    #[arg(short = 'b', long)]
    pub bot: Option<String>,

    /// Backend base URL
    #[arg(short = 'e', long)]
    pub endpoint: Option<String>,

    /// Seconds to wait for each backend call
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Let the backend translate instead of the client
    #[arg(long)]
    pub server_translates: bool,
}

impl From<&SessionArgs> for ResolveOptions {
    fn from(args: &SessionArgs) -> Self {
        Self {
            endpoint: args.endpoint.clone(),
            language: args.lang.clone(),
            bot: args.bot.clone(),
            timeout_secs: args.timeout,
            server_translates: args.server_translates,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive chat (default)
    Chat {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Ask a single question and print the answer
    Ask {
        /// The question (read from stdin if not provided)
        question: Option<String>,

        /// File to attach (repeatable)
        #[arg(short = 'a', long = "attach", value_name = "FILE")]
        attach: Vec<PathBuf>,

        #[command(flatten)]
        session: SessionArgs,
    },
    /// List supported display languages
    Languages,
    /// Edit default settings
    Configure {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
