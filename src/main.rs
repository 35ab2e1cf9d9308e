use anyhow::Result;
use clap::Parser;

use docchat::cli::commands::{ask, chat, configure};
use docchat::cli::{Args, Command};
use docchat::i18n::print_languages;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    docchat::logging::init(args.verbose);

    match args.command {
        Some(Command::Languages) => {
            print_languages();
        }
        Some(Command::Configure { show }) => {
            configure::run_configure(show)?;
        }
        Some(Command::Chat { session }) => {
            chat::run_chat(&session).await?;
        }
        Some(Command::Ask {
            question,
            attach,
            session,
        }) => {
            let options = ask::AskOptions {
                question,
                attachments: attach,
                session,
            };
            let code = ask::run_ask(options).await?;
            if code != exitcode::OK {
                std::process::exit(code);
            }
        }
        None => {
            chat::run_chat(&args.session).await?;
        }
    }

    Ok(())
}
