use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use text_task_service::api::router::build_router;
use text_task_service::config::Config;
use text_task_service::executor::executor::TaskExecutor;
use text_task_service::executor::queue::MemoryQueue;
use text_task_service::executor::service::TaskService;
use text_task_service::storage::memory::MemoryResultStore;
use text_task_service::storage::result_store::ResultStore;
use text_task_service::text::TextProcessor;
use text_task_service::text::client::{HttpTextService, TextService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_level)?)
        .init();

    tracing::info!("Starting text task service on {}", config.bind);
    tracing::info!("Text service: {}", config.text_service_url);

    // 1. Broker and result backend:
    let queue = Arc::new(MemoryQueue::new(
        config.queue_capacity,
        config.enqueue_timeout(),
    ));
    let store = Arc::new(MemoryResultStore::new());

    // 2. External text service:
    let text_service: Arc<dyn TextService> = Arc::new(HttpTextService::new(
        &config.text_service_url,
        config.text_service_timeout(),
        config.text_service_retries,
    )?);

    // 3. Worker pool:
    let executor = TaskExecutor::new(
        queue.clone(),
        store.clone(),
        text_service.clone(),
        config.executor_config(),
    );
    let workers = executor.start().await;

    // 4. Stats reporter:
    if config.stats_interval_secs > 0 {
        let stats_store = store.clone();
        let stats_queue = queue.clone();
        let period = Duration::from_secs(config.stats_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);

            loop {
                interval.tick().await;
                match stats_store.counts().await {
                    Ok(counts) => tracing::info!(
                        "Task stats: {} total, {} pending, {} processing, {} completed, {} failed, {} queued, {} in flight",
                        counts.total(),
                        counts.pending,
                        counts.processing,
                        counts.success,
                        counts.failed,
                        stats_queue.queued_count(),
                        stats_queue.in_flight_count()
                    ),
                    Err(e) => tracing::warn!("Failed to collect task stats: {}", e),
                }
            }
        });
    }

    // 5. HTTP Router:
    let service = TaskService::new(queue.clone(), store.clone());
    let processor = TextProcessor::new(text_service, config.task_timeout());
    let app = build_router(service, processor);

    // 6. Start HTTP server:
    tracing::info!("HTTP server listening on {}", config.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    queue.close();
    for worker in workers {
        worker.abort();
    }
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
