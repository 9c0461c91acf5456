use anyhow::Result;
use clap::Parser;

use ollama_kernel::app::run_repl_mode;
use ollama_kernel::{Cli, Session};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut session = Session::new(cli.config_source(), cli.overrides());

    run_repl_mode(&mut session).await
}
