//! # Saorsa Stage CLI
//!
//! Replays a navigation script against a deck and prints the report.

use anyhow::Context;
use clap::Parser;
use stage_cli::{parse_script, run, CliArgs, Deck, OutputFormat, RunConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing on stderr so the report owns stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stage_core=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Use JSON format in production (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    tracing::debug!("Loading deck {}", args.deck.display());

    let deck = Deck::load(&args.deck)?;
    let commands = parse_script(&args.script).context("Invalid script")?;
    let report = run(&deck, &RunConfig::from(&args), &commands)?;

    match args.format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        ),
    }

    tracing::info!("Replayed {} commands", commands.len());
    Ok(())
}
