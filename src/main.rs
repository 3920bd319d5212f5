use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use table_webhook::core::ItemStore;
use table_webhook::utils::{logger, validation::Validate};
use table_webhook::{
    build_router, AppState, DynamoStore, MemoryStore, ServerConfig, StorageBackend,
};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    // 初始化日誌
    logger::init_server_logger(config.verbose, config.log_json);

    tracing::info!("Starting table-webhook");
    if config.verbose {
        tracing::debug!("Server config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!(kind = e.kind(), "❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    // 創建存儲客戶端 (整個進程共用一個)
    let store: Arc<dyn ItemStore> = match config.backend {
        StorageBackend::Dynamo => Arc::new(DynamoStore::from_config(&config).await),
        StorageBackend::Memory => {
            tracing::warn!(
                tables = config.tables.len(),
                "Using in-memory storage; data is lost on exit"
            );
            Arc::new(MemoryStore::from_definitions(config.tables.clone()))
        }
    };

    let state = Arc::new(AppState::new(store));
    let app = build_router(state);

    let addr: SocketAddr = config.listen_address().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server is running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
