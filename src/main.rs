// Vault exporter CLI: load platform export records, convert them into the
// target dialect, and write the resulting vault to disk.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use wikivault::{ExportConfig, document, export};

/// Convert hosted-wiki exports into a portable markdown vault.
#[derive(Debug, Parser)]
#[command(name = "wikivault", version, about)]
struct Cli {
    /// Directory holding exported document records (*.json)
    input: PathBuf,

    /// Vault output directory
    #[arg(short, long, default_value = "vault")]
    output: PathBuf,

    /// Source platform host, e.g. wiki.example.com
    #[arg(long)]
    host: String,

    /// User agent for redirect lookups and asset downloads
    #[arg(long)]
    user_agent: Option<String>,

    /// Maximum documents converted concurrently
    #[arg(long, default_value_t = 8)]
    concurrency: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut builder = ExportConfig::builder()
        .output_dir(cli.output.clone())
        .host(cli.host.clone())
        .max_concurrent_docs(cli.concurrency);
    if let Some(user_agent) = cli.user_agent {
        builder = builder.user_agent(user_agent);
    }
    let config = builder.build()?;

    let records = document::load_records(&cli.input)
        .await
        .with_context(|| format!("failed to load records from {}", cli.input.display()))?;
    if records.is_empty() {
        println!("no records found in {}", cli.input.display());
        return Ok(());
    }

    let report = export::export_all(config, records).await?;

    println!(
        "converted {} document(s), {} failed",
        report.converted,
        report.failed.len()
    );
    for (key, error) in &report.failed {
        eprintln!("  {key}: {error}");
    }

    Ok(())
}
