//! API server initialization

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::middleware;
use super::routes::{health, query};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Build the application router
    pub fn router(app: &CoreApp) -> Router {
        let query_routes = query::routes(app.search.clone(), app.config.query.max_columns);

        Router::new()
            .route("/api/v1/health", get(health::health))
            .nest("/api/v1/query", query_routes)
            .fallback(middleware::handle_404)
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
    }

    /// Serve until the shutdown signal fires
    pub async fn start(self) -> Result<()> {
        let Self { app } = self;

        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(
            host.parse::<IpAddr>()
                .with_context(|| format!("Invalid server host: {}", host))?,
            port,
        );

        let router = Self::router(&app);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!(%addr, "Server listening");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(())
    }
}
