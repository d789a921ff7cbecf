mod config;
mod domain;
mod inbound;
mod outbound;

use std::sync::Arc;

use anyhow::Context;
use atlas_core::{Basemap, CityStore, DrawConfig, MapRenderer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let store = CityStore::new(&config.database_path);
    store
        .initialize()
        .with_context(|| format!("failed to prepare {}", config.database_path.display()))?;

    let mut basemap = Basemap::load(&config.basemap_dir);
    if let Some(relief) = &config.relief_image {
        basemap = basemap.with_relief(relief);
    }

    let draw_config = DrawConfig::new(config.map_width, config.map_height)?;
    let renderer = MapRenderer::new(store.clone(), Arc::new(basemap), draw_config);

    let repository = outbound::repositories::SqliteRepository::new(store);
    let painter = outbound::painters::RendererPainter::new(renderer, std::env::temp_dir());
    let metrics = outbound::metrics::TracingMetrics;
    let atlas_service = domain::service::Service::new(repository, painter, metrics);

    let server_config = inbound::HttpServerConfig {
        port: &config.server_port,
    };
    let http_server = inbound::HttpServer::new(atlas_service, server_config).await?;

    http_server.run().await
}
