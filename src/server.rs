use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_report::http::{router, AppState};
use catalog_report::{JsonDirStore, ServiceConfig, SystemClock};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::var("CATALOG_CONFIG") {
        Ok(path) => ServiceConfig::load_from_file(&path)?,
        Err(_) => ServiceConfig::from_env(),
    };

    let state = AppState {
        store: Arc::new(JsonDirStore::new(&config.data_dir)),
        assets_dir: Some(config.assets_dir.clone()),
        clock: Arc::new(SystemClock),
    };
    let app = router(state);

    let addr = config.bind_addr();
    info!("catalog service starting on http://{}", addr);
    info!("data: {}, assets: {}", config.data_dir.display(), config.assets_dir.display());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("ready");

    axum::serve(listener, app).await?;
    Ok(())
}
