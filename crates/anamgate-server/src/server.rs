use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use url::Url;

use anamgate_upstream::{HttpPortal, PortalConnector};

use crate::{config::AppConfig, handlers, middleware as app_middleware, state::AppState};

pub struct AnamgateServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(cfg: &AppConfig, portal: Arc<dyn PortalConnector>) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    let state = AppState::new(cfg.clone(), portal);

    let api = Router::new()
        .route("/auth/login", post(handlers::login))
        .route("/user/info", get(handlers::user_info))
        .route("/reservations", post(handlers::reservations))
        .route("/lab-tests", post(handlers::lab_tests))
        .route("/medications", post(handlers::medications))
        .route("/outpatient-history", post(handlers::outpatient_history))
        .route(
            "/hospitalization-history",
            post(handlers::hospitalization_history),
        )
        .route("/payments", post(handlers::payments))
        .route("/payments/detail", post(handlers::payment_detail));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        // Middleware stack (order: request id -> cors -> trace -> body limit)
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub struct ServerBuilder {
    config: AppConfig,
    portal: Option<Arc<dyn PortalConnector>>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            portal: None,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    /// Overrides the portal connector (tests inject doubles here).
    pub fn with_portal(mut self, portal: Arc<dyn PortalConnector>) -> Self {
        self.portal = Some(portal);
        self
    }

    pub fn build(self) -> anyhow::Result<AnamgateServer> {
        let portal = match self.portal {
            Some(portal) => portal,
            None => {
                let base = Url::parse(&self.config.upstream.base_url)
                    .context("upstream.base_url is not a valid URL")?;
                Arc::new(HttpPortal::new(
                    base,
                    Duration::from_millis(self.config.upstream.connect_timeout_ms),
                    Duration::from_millis(self.config.upstream.request_timeout_ms),
                )) as Arc<dyn PortalConnector>
            }
        };

        Ok(AnamgateServer {
            addr: self.config.addr(),
            app: build_app(&self.config, portal),
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnamgateServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
