use anyhow::{Context, Result};
use bench_core::ConnectionParameters;
use clap::Parser;
use interface_cli::{run_with_mysql, tracing_setup, Cli};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&cli.log_level);

    let params = ConnectionParameters::load(&cli.config, &cli.section)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    info!(config = %cli.config.display(), section = %cli.section, "Loaded connection parameters");

    let report = run_with_mysql(cli.mode(), &params, cli.max_size(), &cli.workload()).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary());
    }

    Ok(())
}
