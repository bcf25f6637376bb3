//! Simple Submit Rules API: read and write a project's submit rules
//!
//! - `GET  /projects/{project}/<plugin>`: current configuration
//! - `PUT  /projects/{project}/<plugin>`: apply a partial configuration
//! - `GET  /health`, `GET /metrics`
//!
//! The caller is identified by the `X-User` header.
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod telemetry;

use std::sync::Arc;

use axum::{routing::get, Router};
use simple_submit_core::{
    InMemoryProjectStore, PermissionBackend, PluginContext, ProjectStore,
};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::metrics::Metrics;

/// Shared state of the handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProjectStore>,
    pub permissions: Arc<dyn PermissionBackend>,
    pub plugin: PluginContext,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        permissions: Arc<dyn PermissionBackend>,
        plugin: PluginContext,
    ) -> Result<Self, ServerError> {
        Ok(Self {
            store,
            permissions,
            plugin,
            metrics: Arc::new(Metrics::new()?),
        })
    }

    /// In-memory store and grants seeded from `config`
    pub fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        let store = InMemoryProjectStore::with_projects(config.projects.clone())
            .map_err(|e| ServerError::Config(e.to_string()))?;
        Self::new(
            Arc::new(store),
            Arc::new(config.grants.clone()),
            config.plugin_context(),
        )
    }

    /// Plugin name and host settings for one request
    pub fn plugin_context(&self) -> PluginContext {
        self.plugin.clone()
    }
}

pub fn create_app(state: AppState) -> Router {
    let config_route = format!("/projects/{{project}}/{}", state.plugin.plugin_name);
    Router::new()
        .route(
            &config_route,
            get(handlers::get_config).put(handlers::put_config),
        )
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let app = create_app(AppState::from_config(&config)?);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;

    tracing::info!(
        plugin = %config.plugin_name,
        projects = config.projects.len(),
        "Simple submit rules API listening on {}",
        config.listen_addr
    );
    axum::serve(listener, app).await?;
    Ok(())
}
