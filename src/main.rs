use chitty_chat::bind_listener;
use chitty_chat::ChatConfig;
use chitty_chat::observability::init_observability;
use chitty_chat::observability::LogMode;
use chitty_chat::start_metrics_server;
use chitty_chat::NodeBuilder;
use chitty_chat::Result;
use chitty_chat::SystemError;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::watch;
use tracing::error;
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    // Initializing Shutdown Signal
    let (graceful_tx, graceful_rx) = watch::channel(());

    let settings = ChatConfig::new()?.validate()?;

    // Each run starts a fresh log
    let _guard = init_observability(&settings.server.log_path(), LogMode::Reset)?;

    let listen_address = settings.server.listen_address;
    let listener = match bind_listener(listen_address).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Server: failed to listen on {}: {}", listen_address, e);
            return Err(e);
        }
    };
    println!("Server: listening on {}", listen_address);

    let node = NodeBuilder::init(settings.clone(), graceful_rx.clone()).build();

    if settings.monitoring.prometheus_enabled {
        tokio::spawn(start_metrics_server(
            settings.monitoring.prometheus_port,
            graceful_rx.clone(),
        ));
    }

    info!("Application started. Waiting for CTRL+C signal...");
    tokio::spawn(async {
        if let Err(e) = graceful_shutdown(graceful_tx).await {
            error!("Failed to shutdown: {:?}", e);
        }
    });

    if let Err(e) = node.serve(listener).await {
        error!("chat server stops: {:?}", e);
        return Err(e);
    }

    println!("Exiting program.");
    Ok(())
}

async fn graceful_shutdown(graceful_tx: watch::Sender<()>) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    graceful_tx.send(()).map_err(|e| {
        error!("Failed to send shutdown signal: {}", e);
        SystemError::SignalSendFailed(format!("Failed to send shutdown signal: {}", e))
    })?;

    info!("Shutdown completed");
    Ok(())
}
