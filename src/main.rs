use std::sync::Arc;

use clap::Parser;
use comic_panels::bubbles::LayoutOptions;
use comic_panels::bubbles::text::FontdueTypeface;
use comic_panels::config::setup_logging;
use comic_panels::constants::IMAGE_DIR;
use comic_panels::db::DEFAULT_DATABASE_PATH;
use comic_panels::storage::PanelStorage;
use comic_panels::web::AppState;
use sea_orm_migration::MigratorTrait;
use tracing::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = comic_panels::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let typeface = match FontdueTypeface::load(&cli.font, cli.bold_font.as_deref()) {
        Ok(typeface) => typeface,
        Err(err) => {
            error!("Failed to load font: {}", err);
            return;
        }
    };

    let db_path = cli
        .database_path
        .as_deref()
        .unwrap_or(DEFAULT_DATABASE_PATH);
    let db = match comic_panels::db::connect_db(db_path).await {
        Ok(db) => db,
        Err(err) => {
            error!("Database connection error: {}", err);
            return;
        }
    };

    if let Err(err) = comic_panels::db::migrations::Migrator::up(&db, None).await {
        error!("Database migration error: {}", err);
        return;
    }

    let image_dir = cli.image_dir.clone().unwrap_or_else(|| IMAGE_DIR.clone());
    let state = match AppState::new(
        db,
        Arc::new(typeface),
        PanelStorage::new(image_dir, &cli.public_base_url),
        LayoutOptions {
            stacking: cli.stacking,
        },
    ) {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to build application state: {}", err);
            return;
        }
    };

    if let Err(err) = comic_panels::web::setup_server(&cli.listen_address, cli.port, state).await {
        error!("Application error: {}", err);
    }
}
