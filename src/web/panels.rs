//! Panel rendering and lookup endpoints.

use std::path::PathBuf;

use axum::extract::Multipart;
use tokio::task::JoinSet;

use super::prelude::*;
use crate::bubbles;
use crate::constants::{MIN_UPLOAD_BYTES, PANELS_PER_COMIC};

/// Body of `POST /panel/add-text`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddTextRequest {
    image_url: String,
    #[serde(default)]
    text: Vec<String>,
    output_image_path: Option<String>,
}

/// One panel to render and store.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PanelRequest {
    image_url: String,
    #[serde(default)]
    text: Vec<String>,
}

/// Body of `POST /panels/batch`.
#[derive(Debug, Deserialize)]
pub(crate) struct BatchRequest {
    panels: Vec<PanelRequest>,
}

/// Reply to `POST /panels/batch`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchResponse {
    pub(crate) panel_image_urls: Vec<String>,
}

/// A recorded panel as returned by the API.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct PanelView {
    pub(crate) id: i32,
    pub(crate) image_url: String,
    pub(crate) text: Vec<String>,
    pub(crate) created_at: String,
}

impl TryFrom<panels::Model> for PanelView {
    type Error = ComicError;

    fn try_from(model: panels::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            text: model.text_lines()?,
            created_at: model.created_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            id: model.id,
            image_url: model.image_url,
        })
    }
}

fn png_response(png: Vec<u8>) -> Response {
    ([(CONTENT_TYPE, "image/png")], png).into_response()
}

/// Runs the CPU-bound render off the async workers.
async fn render_panel(
    state: &AppState,
    image: Vec<u8>,
    text: Vec<String>,
    output_path: Option<PathBuf>,
) -> Result<Vec<u8>, ComicError> {
    let typeface = state.typeface.clone();
    let options = state.options;
    tokio::task::spawn_blocking(move || {
        bubbles::render_with(
            typeface.as_ref(),
            &image,
            &text,
            output_path.as_deref(),
            options,
        )
    })
    .await?
}

async fn fetch_and_render(state: &AppState, panel: PanelRequest) -> Result<Vec<u8>, ComicError> {
    let image = state.fetcher.fetch(&panel.image_url).await?;
    render_panel(state, image, panel.text, None).await
}

async fn store_and_record(
    state: &AppState,
    png: &[u8],
    text: &[String],
) -> Result<panels::Model, ComicError> {
    let image_url = state.storage.store(png).await?;
    panels::record(&state.db, &image_url, text).await
}

/// Fetches a panel, draws the dialogue and returns the PNG.
#[instrument(skip_all, fields(image_url = %body.image_url, lines = body.text.len()))]
pub(crate) async fn add_text_handler(
    State(state): State<AppState>,
    Json(body): Json<AddTextRequest>,
) -> Result<Response, ComicError> {
    let output_path = match body.output_image_path.as_deref() {
        Some(name) => {
            let path = state.storage.resolve(name)?;
            state.storage.ensure_dir().await?;
            Some(path)
        }
        None => None,
    };
    let image = state.fetcher.fetch(&body.image_url).await?;
    let png = render_panel(&state, image, body.text, output_path).await?;
    Ok(png_response(png))
}

/// Renders dialogue onto an uploaded image.
#[instrument(skip_all)]
pub(crate) async fn render_upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ComicError> {
    let mut image_bytes: Option<Vec<u8>> = None;
    let mut text: Vec<String> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ComicError::BadRequest(err.to_string()))?
    {
        let field_name = field.name().unwrap_or_default();
        match field_name {
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ComicError::BadRequest(err.to_string()))?;
                image_bytes = Some(bytes.to_vec());
            }
            "text" => {
                let line = field
                    .text()
                    .await
                    .map_err(|err| ComicError::BadRequest(err.to_string()))?;
                text.push(line);
            }
            _ => {}
        }
    }

    let image_bytes = image_bytes
        .ok_or_else(|| ComicError::BadRequest("missing image field".to_string()))?;
    if image_bytes.len() < MIN_UPLOAD_BYTES {
        return Err(ComicError::BadRequest(format!(
            "image is {} bytes, at least {MIN_UPLOAD_BYTES} required",
            image_bytes.len()
        )));
    }
    debug!(bytes = image_bytes.len(), lines = text.len(), "rendering upload");
    let png = render_panel(&state, image_bytes, text, None).await?;
    Ok(png_response(png))
}

/// Fetches, renders, stores and records one panel.
#[instrument(skip_all, fields(image_url = %body.image_url))]
pub(crate) async fn create_panel_handler(
    State(state): State<AppState>,
    Json(body): Json<PanelRequest>,
) -> Result<(StatusCode, Json<PanelView>), ComicError> {
    let text = body.text.clone();
    let png = fetch_and_render(&state, body).await?;
    let model = store_and_record(&state, &png, &text).await?;
    info!("Recorded panel {} at {}", model.id, model.image_url);
    Ok((StatusCode::CREATED, Json(PanelView::try_from(model)?)))
}

/// Renders up to a comic's worth of panels concurrently.
///
/// Nothing is stored unless every panel renders; panels are then stored
/// and recorded in request order.
#[instrument(skip_all, fields(panels = body.panels.len()))]
pub(crate) async fn batch_handler(
    State(state): State<AppState>,
    Json(body): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ComicError> {
    if body.panels.len() > PANELS_PER_COMIC {
        return Err(ComicError::BadRequest(format!(
            "a comic has at most {PANELS_PER_COMIC} panels, got {}",
            body.panels.len()
        )));
    }

    let mut tasks = JoinSet::new();
    for (index, panel) in body.panels.iter().cloned().enumerate() {
        let state = state.clone();
        tasks.spawn(async move { (index, fetch_and_render(&state, panel).await) });
    }

    let mut rendered: Vec<Option<Vec<u8>>> = vec![None; body.panels.len()];
    let mut first_error: Option<(usize, ComicError)> = None;
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;
        match result {
            Ok(png) => {
                if let Some(slot) = rendered.get_mut(index) {
                    *slot = Some(png);
                }
            }
            Err(err) => {
                if first_error.as_ref().is_none_or(|(seen, _)| index < *seen) {
                    first_error = Some((index, err));
                }
            }
        }
    }
    if let Some((index, err)) = first_error {
        info!("Panel {index} of the batch failed: {err}");
        return Err(err);
    }

    let mut panel_image_urls = Vec::with_capacity(rendered.len());
    for (panel, png) in body.panels.iter().zip(rendered) {
        let png = png.ok_or_else(|| {
            ComicError::InternalServerError("batch render lost a panel".to_string())
        })?;
        let model = store_and_record(&state, &png, &panel.text).await?;
        panel_image_urls.push(model.image_url);
    }
    Ok(Json(BatchResponse { panel_image_urls }))
}

/// Lists every recorded panel.
pub(crate) async fn list_panels_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PanelView>>, ComicError> {
    let views = panels::list(&state.db)
        .await?
        .into_iter()
        .map(PanelView::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}

/// Returns one recorded panel.
pub(crate) async fn get_panel_handler(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PanelView>, ComicError> {
    let model = panels::find(&state.db, id)
        .await?
        .ok_or_else(|| ComicError::NotFound(format!("panel {id}")))?;
    Ok(Json(PanelView::try_from(model)?))
}

/// Liveness check.
pub(crate) async fn healthcheck_handler() -> &'static str {
    "OK"
}
