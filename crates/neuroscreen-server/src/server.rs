use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use neuroscreen_analysis::VoiceClassifier;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::AppConfig, gemini::GeminiClient, handlers, middleware as app_middleware, routes,
};

/// Shared per-request state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// None when the model artifact failed to load; the audio route then
    /// reports unavailable instead of the whole server refusing to start.
    pub classifier: Option<Arc<VoiceClassifier>>,
    pub gemini: Arc<GeminiClient>,
}

pub struct NeuroscreenServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(cfg: &AppConfig) -> Router {
    let body_limit = cfg.server.body_limit_bytes;

    let classifier = match VoiceClassifier::load(Path::new(&cfg.model.path)) {
        Ok(c) => Some(Arc::new(c)),
        Err(e) => {
            tracing::warn!(
                path = %cfg.model.path,
                error = %e,
                "starting without classifier; /predict-audio will report unavailable"
            );
            None
        }
    };

    let state = AppState {
        config: Arc::new(cfg.clone()),
        classifier,
        gemini: Arc::new(GeminiClient::new(&cfg.gemini)),
    };

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        // Prediction endpoints
        .route("/predict-audio", post(routes::audio::predict_audio))
        .route("/predict-video", post(routes::video::predict_video))
        .route("/models", get(routes::models::available_models))
        .with_state(state)
        // Middleware stack (order: request id -> cors -> trace -> body limit)
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %method,
                        http.target = %uri,
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
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> NeuroscreenServer {
        let app = build_app(&self.config);

        NeuroscreenServer {
            addr: self.addr,
            app,
        }
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NeuroscreenServer {
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
