/*!
   Module `inbound` exposes the atlas domain over HTTP. A chat transport posts each incoming
   message to `/commands` and forwards the reply it gets back.
*/

mod api;
mod handlers;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::domain::ports::AtlasService;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
}

/// The application state available to all request handlers.
#[derive(Debug, Clone)]
pub(crate) struct AppState<AS: AtlasService> {
    atlas_service: Arc<AS>,
}

/// The application's HTTP server. The underlying HTTP package is opaque to module consumers.
pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new<AS: AtlasService>(
        atlas_service: AS,
        config: HttpServerConfig<'_>,
    ) -> anyhow::Result<Self> {
        let trace_layer = TraceLayer::new_for_http().make_span_with(
            |request: &axum::extract::Request| {
                let uri = request.uri().to_string();
                tracing::info_span!("http_request", method = ?request.method(), uri)
            },
        );

        let state = AppState {
            atlas_service: Arc::new(atlas_service),
        };

        let router = Router::new()
            .route("/health", get(handlers::health_handler))
            .route("/commands", post(handlers::command_handler::<AS>))
            .layer(trace_layer)
            .with_state(state);

        let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("failed to listen on {}", config.port))?;

        Ok(Self { router, listener })
    }

    /// Runs the HTTP server.
    pub async fn run(self) -> anyhow::Result<()> {
        info!("listening on {}", self.listener.local_addr()?);

        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;

        Ok(())
    }
}
