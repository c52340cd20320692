use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use topicmap_rs::cli;
use topicmap_rs::launch;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let args = cli::Args::parse();
    let config = args.to_config()?;

    let level = if config.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("topicmap_rs={}", level).parse()?),
        )
        .init();

    launch(&config, &args.to_request(), &args.to_options()).await?;
    Ok(())
}
