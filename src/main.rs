use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use user_directory::app_system::{setup_tracing, DirectorySystem};
use user_directory::config::Config;
use user_directory::http;

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = Config::parse();

    // Setup tracing once for the entire application
    setup_tracing(&config.log_level);

    info!("Starting user directory");

    let system = DirectorySystem::new(config.channel_capacity.get());

    let listener = match TcpListener::bind(config.socket_addr()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.socket_addr(), error = %e, "Failed to bind");
            system.shutdown().await?;
            return Err(e.to_string());
        }
    };

    let served = http::serve(listener, system.user_client.clone(), shutdown_signal()).await;
    if let Err(e) = &served {
        error!(error = %e, "HTTP server failed");
    }

    // The server's client clones are gone now, so the actor can drain.
    system.shutdown().await?;

    info!("User directory stopped");
    served.map_err(|e| e.to_string())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
