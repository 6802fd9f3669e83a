use std::sync::Arc;

use got_ocr_core::{ImageSource, OcrMode};
use rocket::{Route, State, form::Form, fs::TempFile, serde::json::Json};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::ApiError,
    generation::process_async,
    models::{OcrQuery, OcrResponse, OcrUpload, UrlListRequest},
    state::AppState,
};

#[get("/health")]
pub fn health() -> &'static str {
    "ok"
}

#[post(
    "/ocr?<query..>",
    data = "<upload>",
    format = "multipart/form-data",
    rank = 1
)]
pub async fn ocr_files(
    state: &State<AppState>,
    query: OcrQuery,
    upload: Form<OcrUpload<'_>>,
) -> Result<Json<OcrResponse>, ApiError> {
    let mut upload = upload.into_inner();
    if upload.files.is_empty() {
        return Err(ApiError::BadRequest("No files uploaded".into()));
    }

    let mut sources = Vec::with_capacity(upload.files.len());
    for file in upload.files.iter_mut() {
        let named = file
            .raw_name()
            .and_then(|name| name.as_str())
            .is_some_and(|name| !name.is_empty());
        if !named {
            return Err(ApiError::BadRequest("Empty filename".into()));
        }
        sources.push(ImageSource::Bytes(read_upload(file).await?));
    }

    dispatch(state, &query, sources).await
}

#[post("/ocr?<query..>", data = "<request>", format = "json", rank = 2)]
pub async fn ocr_urls(
    state: &State<AppState>,
    query: OcrQuery,
    request: Option<Json<UrlListRequest>>,
) -> Result<Json<OcrResponse>, ApiError> {
    let Some(request) = request else {
        return Err(ApiError::BadRequest("No valid input provided".into()));
    };
    if request.urls.is_empty() {
        return Err(ApiError::BadRequest("Empty URL list".into()));
    }

    let sources = request
        .urls
        .iter()
        .map(|location| ImageSource::from_location(location))
        .collect();
    dispatch(state, &query, sources).await
}

#[post("/ocr?<query..>", rank = 3)]
pub fn ocr_unsupported(query: OcrQuery) -> ApiError {
    let _ = query;
    ApiError::BadRequest("No valid input provided".into())
}

async fn dispatch(
    state: &State<AppState>,
    query: &OcrQuery,
    sources: Vec<ImageSource>,
) -> Result<Json<OcrResponse>, ApiError> {
    let mode = OcrMode::from_request_type(query.mode.as_deref().unwrap_or("ocr"));
    debug!(
        images = sources.len(),
        ?mode,
        save = query.save,
        "handling OCR request"
    );
    let result = process_async(Arc::clone(&state.service), sources, mode, query.save).await?;
    Ok(Json(OcrResponse { result }))
}

async fn read_upload(file: &mut TempFile<'_>) -> Result<Vec<u8>, ApiError> {
    let staging = std::env::temp_dir().join(format!("got-ocr-upload-{}", Uuid::new_v4()));
    file.persist_to(&staging)
        .await
        .map_err(|err| ApiError::Internal(format!("failed to stage upload: {err}")))?;
    let bytes = rocket::tokio::fs::read(&staging)
        .await
        .map_err(|err| ApiError::Internal(format!("failed to read upload: {err}")))?;
    let _ = rocket::tokio::fs::remove_file(&staging).await;
    Ok(bytes)
}

pub fn ocr_routes() -> Vec<Route> {
    routes![health, ocr_files, ocr_urls, ocr_unsupported]
}
