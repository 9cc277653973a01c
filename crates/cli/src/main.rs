use anyhow::Context;
use clap::{Parser, Subcommand};
use staybook_kernel::settings::Settings;

/// Staybook command-line entrypoint
#[derive(Debug, Parser)]
#[command(name = "staybook-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API until interrupted
    Serve,
    /// Print a client's enriched bookings as JSON
    Bookings {
        /// Client whose bookings are listed
        #[arg(long)]
        client_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load Staybook settings")?;
    staybook_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve => staybook_app::serve(&settings).await,
        Command::Bookings { client_id } => print_bookings(&settings, &client_id).await,
    }
}

async fn print_bookings(settings: &Settings, client_id: &str) -> anyhow::Result<()> {
    let store = staybook_app::connect_store(settings)?;
    let service = staybook_app::BookingService::new(store);

    let data = service
        .enrich_bookings(client_id)
        .await
        .with_context(|| format!("failed to list bookings for client '{client_id}'"))?;

    tracing::debug!(client_id, bookings = data.len(), "bookings listed");

    let output = serde_json::json!({ "data": data });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
