use tmc_system::{System, SystemConfig};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let system = System::new(SystemConfig::default()).await;
    info!("tmc core constructed, running until interrupted");

    let monitor = system.health_monitor.clone();
    let monitor_token = CancellationToken::new();
    let monitor_handle = {
        let monitor_token = monitor_token.clone();
        tokio::spawn(async move {
            monitor.run(monitor_token).await;
        })
    };

    #[cfg(unix)]
    {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("received ctrl-c");
            }
            _ = async {
                if let Ok(mut sigterm) = signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    sigterm.recv().await;
                    info!("received sigterm");
                }
            } => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
        info!("received ctrl-c");
    }

    monitor_token.cancel();
    let _ = monitor_handle.await;
    info!("shutdown complete");
}
