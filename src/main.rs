use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use filegate::application::ports::MetricsCollector;
use filegate::application::services::{ScanScheduler, UploadService};
use filegate::infrastructure::metrics::TracingMetricsCollector;
use filegate::infrastructure::observability::{TracingConfig, init_tracing};
use filegate::infrastructure::persistence::JobRepositoryFactory;
use filegate::infrastructure::scanning::ScanCheckerFactory;
use filegate::infrastructure::storage::BlobStoreFactory;
use filegate::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(
        &TracingConfig::from_settings(environment, &settings.logging),
        settings.server.port,
    );

    let job_repository = JobRepositoryFactory::create(&settings.database)
        .await
        .context("Failed to initialize job repository")?;
    let blob_store =
        BlobStoreFactory::create(&settings.storage).context("Failed to initialize blob store")?;
    let scan_checker = ScanCheckerFactory::create(&settings.scanner)
        .context("Failed to initialize scan checker")?;
    let metrics: Arc<dyn MetricsCollector> = Arc::new(TracingMetricsCollector::new());

    let upload_service = Arc::new(UploadService::new(
        Arc::clone(&job_repository),
        Arc::clone(&blob_store),
        Arc::clone(&metrics),
    ));

    let scheduler = ScanScheduler::new(
        Arc::clone(&job_repository),
        Arc::clone(&blob_store),
        scan_checker,
        Arc::clone(&metrics),
        settings.scheduler.to_scheduler_config(),
    );

    let scheduler_status = scheduler.status();
    let shutdown = CancellationToken::new();
    let scheduler_handle = tokio::spawn(scheduler.start(shutdown.clone()));

    let state = AppState {
        upload_service,
        scheduler_status,
        max_upload_bytes: settings.server.max_upload_bytes,
    };
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    let server_shutdown = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = server_shutdown.cancelled() => {}
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    shutdown.cancel();
    scheduler_handle
        .await
        .context("Scan scheduler task failed")?;

    tracing::info!("Shutdown complete");
    Ok(())
}
