pub(crate) use crate::db::entities::panels;
pub(crate) use crate::error::ComicError;
pub(crate) use crate::web::AppState;
pub(crate) use axum::Json;
pub(crate) use axum::extract::{Path, State};
pub(crate) use axum::http::{StatusCode, header::CONTENT_TYPE};
pub(crate) use axum::response::{IntoResponse, Response};
pub(crate) use serde::{Deserialize, Serialize};
pub(crate) use tracing::{debug, info, instrument};
