use anyhow::Result;
use aton::{config::Cli, pipeline, Config, OutputFormat};
use clap::Parser;
use std::process::exit;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) resolve config ───────────────────────────────────────────
    let cli = Cli::parse();
    let config = match Config::resolve(cli, None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            exit(2);
        }
    };

    // ─── 2) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!(?config, "startup");

    // ─── 3) normalize + analyze ──────────────────────────────────────
    let report = pipeline::run(&config)?;

    // ─── 4) print ────────────────────────────────────────────────────
    match config.output {
        OutputFormat::Text => print!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    info!("all done");
    Ok(())
}
