use replset_mock::HarnessConfig;
use replset_mock::Result;
use replset_mock::TopologyFixture;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let config = HarnessConfig::new()?.validate()?;

    // Initializing Logs
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let set_name = config.topology.set_name.clone();
    let specs = config.topology.node_specs()?;
    let mut fixture = TopologyFixture::builder(set_name)
        .nodes(specs)
        .config(config)
        .build()?;

    // Write-concern commands on the primary get their canned replies
    fixture.primary().dispatcher().on_write_concern_commands();

    fixture.start_all().await?;
    info!(
        uri = %fixture.replica_set_uri("test"),
        "Replica set started. Waiting for CTRL+C signal..."
    );

    let signalled = graceful_shutdown().await;

    fixture.stop_all().await;
    info!("Shutdown completed");
    signalled
}

async fn graceful_shutdown() -> Result<()> {
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
    Ok(())
}
