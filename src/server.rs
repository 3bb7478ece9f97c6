//! HTTP surface: todo CRUD plus the restaurant table, one router.

use std::future::Future;

use anyhow::Context;
use axum::extract::FromRef;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::places::{self, RestaurantStore};
use crate::todo::{self, TodoStore};

#[derive(Debug, Clone, Default, FromRef)]
pub struct AppState {
    pub todos: TodoStore,
    pub restaurants: RestaurantStore,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(todo::routes::router())
        .merge(places::routes::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut c = Self::default();
        if let Ok(v) = std::env::var("ARB_LAB_HOST") { c.host = v; }
        if let Ok(v) = std::env::var("ARB_LAB_PORT") { if let Ok(p) = v.parse() { c.port = p; } }
        c
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub async fn serve(cfg: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!("🌐 Listening on http://{}", addr);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(wait_for_shutdown(tokio::signal::ctrl_c()))
        .await
        .context("http server")?;
    Ok(())
}

/// Resolves once `signal` fires. A signal that cannot be installed never resolves.
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("🛑 Ctrl+C received, shutting down"),
        Err(e) => {
            warn!("⚠️ Ctrl+C handler unavailable, graceful shutdown disabled: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
