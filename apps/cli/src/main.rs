mod config;
mod main_lib;

use clap::Parser;
use config::Config;
use main_lib::{init_tracing, run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    if let Err(e) = run(cli, &config).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}
