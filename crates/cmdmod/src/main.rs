use anyhow::Result;
use clap::Parser;
use cmdmod::cli::{init_tracing, run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;
    run(cli).await
}
