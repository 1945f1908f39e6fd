use std::{path::PathBuf, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use server_api::ApiContext;
use shared::error::ApiException;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;
mod web;

use app_state::{spawn_session_sweeper, AppState};
use config::load_settings;

const MAX_BODY_BYTES: usize = 4 * 1024;

/// Serves the colour grid picker.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Port to listen on, replacing the port of the configured bind address.
    port: Option<u16>,
    /// Address to listen on, e.g. 0.0.0.0:5000.
    #[arg(long)]
    bind: Option<String>,
    /// Settings file; missing files are ignored.
    #[arg(long, default_value = "picker.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config)?;
    settings.apply_overrides(cli.bind, cli.port)?;

    let api = ApiContext::in_memory(settings.grid).map_err(ApiException::from)?;
    let _sweeper = spawn_session_sweeper(
        Arc::clone(&api.store),
        settings.session_ttl(),
        settings.sweep_interval(),
    );
    let app = build_router(Arc::new(AppState { api }));

    let addr = settings.bind_addr()?;
    info!(%addr, levels = ?settings.grid.levels, "picker listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(web::index))
        .route("/pick/:round/:hex", get(web::pick))
        .route("/reverse", get(web::reverse))
        .route("/healthz", get(web::healthz))
        .route("/api/sessions", post(api::create_session))
        .route(
            "/api/sessions/:session_id",
            get(api::show_session).delete(api::delete_session),
        )
        .route("/api/sessions/:session_id/select", post(api::select))
        .route(
            "/api/sessions/:session_id/background",
            post(api::toggle_background),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
