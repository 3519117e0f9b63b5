use crate::error::{Result, WebError};
use crate::middleware::{api_version, cors_layer, options_no_content, security_headers};
use crate::routes::{health_routes, record_routes};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use crate_data_config::ServerConfig;
use crate_data_core::{DialectKind, RecordService};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Record services keyed by the dialect segment they are mounted under
#[derive(Clone, Default)]
pub struct Backends {
    services: Vec<(DialectKind, Arc<RecordService>)>,
}

impl Backends {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: DialectKind, service: Arc<RecordService>) -> Self {
        self.services.retain(|(existing, _)| *existing != kind);
        self.services.push((kind, service));
        self
    }

    pub fn kinds(&self) -> impl Iterator<Item = DialectKind> + '_ {
        self.services.iter().map(|(kind, _)| *kind)
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Routes under `{api_prefix}/{dialect}` plus `/health`, with the shared header stack
pub fn build_router(config: &ServerConfig, backends: &Backends) -> Result<Router> {
    let version = HeaderValue::from_str(&config.api_version)
        .map_err(|e| WebError::Config(format!("api_version: {e}")))?;
    let prefix = config.api_prefix.trim_end_matches('/');

    let mut app = Router::new();
    for (kind, service) in &backends.services {
        let mount = format!("{prefix}/{kind}");
        info!(%mount, "Mounting record routes");
        app = app.nest(&mount, record_routes().with_state(service.clone()));
    }

    Ok(app
        .merge(health_routes())
        .layer(DefaultBodyLimit::max(config.max_request_bytes()))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(security_headers))
        .layer(from_fn_with_state(version, api_version))
        .layer(cors_layer())
        .layer(from_fn(options_no_content)))
}

pub async fn start_server(config: &ServerConfig, backends: &Backends) -> Result<()> {
    if backends.is_empty() {
        return Err(WebError::Config("no backend to serve".to_string()));
    }
    let app = build_router(config, backends)?;

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
