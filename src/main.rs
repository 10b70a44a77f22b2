use anyhow::{Context, Result};
use axum::{extract::FromRef, Router};
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Settings;
use crate::schema::AttributeSchema;

// Declare modules
mod auth;
mod catalog;
mod config;
mod error;
mod filters;
mod models;
mod normalize;
mod routes;
mod schema;
mod scoring;
mod search;
mod suggester;
mod vehicles;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub http_client: Arc<Client>,
    // The filter universe, built once; handlers only ever read it.
    pub schema: Arc<AttributeSchema>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mercado_pecas=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Initializing mercado_pecas server...");

    let settings = match Settings::new() {
        Ok(s) => {
            tracing::info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };
    let shared_settings = Arc::new(settings);

    let http_client = Arc::new(
        Client::builder()
            .user_agent(concat!("mercado_pecas/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build shared reqwest client")?,
    );

    let app_state = AppState {
        settings: shared_settings.clone(),
        http_client,
        schema: Arc::new(AttributeSchema::builtin()),
    };

    let router: Router = routes::create_router(app_state.clone());
    let app = router
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = app_state
        .settings
        .server_address
        .parse()
        .with_context(|| {
            format!(
                "Invalid server address format in configuration ('{}')",
                shared_settings.server_address
            )
        })?;

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => {
            tracing::info!("Server listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
