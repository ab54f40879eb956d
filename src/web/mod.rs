//! HTTP surface: render endpoints, panel records and stored images.

use std::num::NonZeroU16;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use sea_orm::DatabaseConnection;
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::bubbles::LayoutOptions;
use crate::bubbles::text::Typeface;
use crate::constants::{IMAGE_ROUTE, MAX_UPLOAD_BYTES};
use crate::error::ComicError;
use crate::fetch::ImageFetcher;
use crate::storage::PanelStorage;

mod panels;
mod prelude;

use panels::{
    add_text_handler, batch_handler, create_panel_handler, get_panel_handler,
    healthcheck_handler, list_panels_handler, render_upload_handler,
};

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    typeface: Arc<dyn Typeface>,
    fetcher: ImageFetcher,
    storage: PanelStorage,
    options: LayoutOptions,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("storage", &self.storage)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Bundles the connection, typeface and storage the handlers need.
    pub fn new(
        db: DatabaseConnection,
        typeface: Arc<dyn Typeface>,
        storage: PanelStorage,
        options: LayoutOptions,
    ) -> Result<Self, ComicError> {
        Ok(Self {
            db,
            typeface,
            fetcher: ImageFetcher::new()?,
            storage,
            options,
        })
    }
}

fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/healthcheck", get(healthcheck_handler))
        .route("/panel/add-text", post(add_text_handler))
        .route("/panel/render", post(render_upload_handler))
        .route("/panels", get(list_panels_handler).post(create_panel_handler))
        .route("/panels/batch", post(batch_handler))
        .route("/panels/{id}", get(get_panel_handler))
        .nest_service(IMAGE_ROUTE, ServeDir::new(state.storage.image_dir()))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Builds the router for `state`, ready to serve.
pub fn build_app(state: AppState) -> Router {
    create_router(&state).with_state(state)
}

/// Serves the app until ctrl-c.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    state: AppState,
) -> Result<(), anyhow::Error> {
    state.storage.ensure_dir().await?;
    let app = build_app(state);

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
