use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use concierge_agents::{FlightAgent, HotelAgent, TripSupervisor};
use concierge_core::ServerConfig;
use concierge_http::{start_server, RegisteredAgent, RemoteEndpoint};

#[derive(Parser)]
#[command(name = "concierge", version)]
#[command(about = "Travel booking agents behind a remote-agent endpoint")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Listening port, overrides CONCIERGE_PORT / PORT
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Err(e) = serve(port).await {
                error!("Error during startup: {:#}", e);
                return Err(e);
            }
        }
    }
    Ok(())
}

async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = port {
        config = config.with_port(port);
    }

    // The registry is built once and read for the process lifetime
    let endpoint = RemoteEndpoint::new(vec![
        RegisteredAgent::from_graph(Arc::new(TripSupervisor::new())),
        RegisteredAgent::from_graph(Arc::new(HotelAgent::new())),
        RegisteredAgent::from_graph(Arc::new(FlightAgent::new())),
    ])?;

    start_server(config, endpoint)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
