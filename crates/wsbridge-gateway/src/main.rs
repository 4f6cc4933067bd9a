//! Gateway server entry point
//!
//! Run with:
//! ```bash
//! GATEWAY_PORT=9001 cargo run -p wsbridge-gateway
//! ```
//!
//! Configuration is loaded from environment variables. The main task is the
//! application's consumer: it polls the bridge on a fixed interval and runs
//! every listener there.

use tokio::sync::oneshot;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};
use wsbridge_common::{try_init_tracing_with_config, AppConfig, AppError};
use wsbridge_core::EventBridge;
use wsbridge_gateway::listeners::{EchoListener, LoggingListener};
use wsbridge_gateway::GatewayServer;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing
    if let Err(e) = try_init_tracing_with_config(config.tracing_config()) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    // Run the gateway
    if let Err(e) = run(config).await {
        error!(error = %e, "Gateway failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        app = %config.app.name,
        env = ?config.app.env,
        port = config.gateway.port,
        poll_interval_ms = config.bridge.poll_interval_ms,
        "Configuration loaded"
    );

    // Create the bridge and its listeners
    let bridge = EventBridge::new_shared();
    bridge.subscribe(LoggingListener);
    bridge.subscribe(EchoListener);

    // Bind and spawn the transport
    let server = GatewayServer::bind(config.clone(), bridge.clone()).await?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server_task = tokio::spawn(server.run(async move {
        let _ = shutdown_rx.await;
    }));

    // Consumer loop
    let mut ticker = interval(config.bridge.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Listener faults are logged by the registry
                bridge.poll_and_dispatch();
            }
            _ = &mut ctrl_c => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    // Stop the transport, then deliver what it reported while stopping
    let _ = shutdown_tx.send(());
    // A panicked or cancelled server task is not a transport failure
    let served = server_task.await.map_err(AppError::internal)?;
    bridge.poll_and_dispatch();

    let stats = bridge.stats();
    info!(
        events = stats.events_received,
        dispatched = stats.events_dispatched,
        listener_faults = stats.listener_faults,
        "Gateway shut down"
    );

    served?;
    Ok(())
}
