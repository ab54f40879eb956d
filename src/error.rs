//! Error handling

use std::fmt;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{error, info};

/// Which part of the bubble pipeline failed.
///
/// Fitting and placement cannot fail, so only the raster stages appear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStage {
    /// Path and glyph drawing
    Draw,
    /// Flattening the canvas to PNG
    Encode,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderStage::Draw => "draw",
            RenderStage::Encode => "encode",
        };
        f.write_str(name)
    }
}

/// Errors for rendering panels and serving them.
#[derive(Debug, thiserror::Error)]
pub enum ComicError {
    /// The base image bytes are not a usable image
    #[error("failed to decode base image: {0}")]
    Decode(String),
    /// The source image could not be fetched
    #[error("failed to fetch source image: {0}")]
    Fetch(String),
    /// Something inside the bubble pipeline failed
    #[error("render failed at {stage} stage{}: {message}", group_suffix(*.group))]
    Render {
        /// stage that failed
        stage: RenderStage,
        /// speaker group being processed, if any
        group: Option<usize>,
        /// underlying cause
        message: String,
    },
    /// Writing the rendered panel failed
    #[error("failed to persist rendered panel: {0}")]
    Persist(String),
    /// When you didn't do the right thing
    #[error("bad request: {0}")]
    BadRequest(String),
    /// When a requested resource is not found
    #[error("not found: {0}")]
    NotFound(String),
    /// When DB operations fail
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// When an internal server error occurs
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

fn group_suffix(group: Option<usize>) -> String {
    match group {
        Some(index) => format!(" (group {index})"),
        None => String::new(),
    }
}

impl ComicError {
    /// Shorthand for a [`ComicError::Render`] tied to a speaker group.
    pub fn render(stage: RenderStage, group: Option<usize>, message: impl Into<String>) -> Self {
        ComicError::Render {
            stage,
            group,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ComicError {
    fn from(err: std::io::Error) -> Self {
        ComicError::Persist(err.to_string())
    }
}

impl From<image::ImageError> for ComicError {
    fn from(err: image::ImageError) -> Self {
        ComicError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for ComicError {
    fn from(err: reqwest::Error) -> Self {
        ComicError::Fetch(err.to_string())
    }
}

impl From<url::ParseError> for ComicError {
    fn from(err: url::ParseError) -> Self {
        ComicError::BadRequest(format!("invalid image url: {err}"))
    }
}

impl From<tokio::task::JoinError> for ComicError {
    fn from(err: tokio::task::JoinError) -> Self {
        ComicError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for ComicError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ComicError::Decode(_) | ComicError::BadRequest(_) => {
                info!("Bad request: {}", self);
                StatusCode::BAD_REQUEST
            }
            ComicError::Fetch(_) => {
                error!("{}", self);
                StatusCode::BAD_GATEWAY
            }
            ComicError::NotFound(what) => {
                info!("404 {what}");
                StatusCode::NOT_FOUND
            }
            ComicError::Render { .. }
            | ComicError::Persist(_)
            | ComicError::Database(_)
            | ComicError::InternalServerError(_) => {
                error!("{}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        // internals stay in the log, clients get the category only
        let body = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        };
        (status, body).into_response()
    }
}
