use anyhow::Result;
use channel_core::{config, registry::ChannelRegistry, web_server};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 初始化日志（这是入口点的职责）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    // 2. 运行服务
    if let Err(e) = run().await {
        // 3. 处理顶层错误
        tracing::error!("❌ Channel registry failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run() -> Result<()> {
    let app_config = config::app_config()?;
    tracing::info!(
        bind_addr = %app_config.server.bind_addr,
        history_limit = app_config.registry.history_limit,
        "🚀 Starting channel registry"
    );

    let registry = Arc::new(ChannelRegistry::new(app_config.registry.history_limit));
    web_server::run_server(&app_config.server, registry).await?;

    tracing::info!("🛑 Shutting down.");
    Ok(())
}
