//! # Mystic Ink
//!
//! Command-line entry point.

use clap::Parser;
use ink_cli::{CliArgs, Command, HistoryCommand};
use ink_core::HistoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,ink_cli=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ink_cli=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = args.oracle_config();
    tracing::debug!("Oracle config: {:?}", config);

    match &args.command {
        Command::Render(render) => {
            ink_cli::render(render)?;
        }
        Command::Read(read) => {
            let store = HistoryStore::with_data_dir(&args.data_dir)?;
            let entry = ink_cli::read(read, &config, &store).await?;
            tracing::info!("Reading saved as {}", entry.id);
        }
        Command::Daily => {
            let store = HistoryStore::with_data_dir(&args.data_dir)?;
            let daily = ink_cli::daily(&config, &store, ink_cli::today()).await?;
            let orientation = if daily.card.is_reversed {
                " (reversed)"
            } else {
                ""
            };
            println!("{}{}\n\n{}", daily.card.name, orientation, daily.message);
            if let Some(meaning) = daily.date_meaning {
                println!("\n{meaning}");
            }
        }
        Command::History { action } => {
            let store = HistoryStore::with_data_dir(&args.data_dir)?;
            let action = action.clone().unwrap_or(HistoryCommand::List);
            ink_cli::history(&action, &config, &store).await?;
        }
    }

    Ok(())
}
