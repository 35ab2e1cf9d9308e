use anyhow::Result;
use std::sync::Arc;

use super::load_config;
use crate::backend::HttpBackend;
use crate::chat::Repl;
use crate::cli::SessionArgs;

pub async fn run_chat(args: &SessionArgs) -> Result<()> {
    let config = load_config(&args.into())?;
    let backend = Arc::new(HttpBackend::new(config.endpoint.clone()));
    let mut repl = Repl::new(backend, config);
    repl.run().await
}
