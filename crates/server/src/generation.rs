use std::sync::Arc;

use got_ocr_core::{ImageSource, OcrError, OcrMode, OcrService};
use rocket::tokio;
use tracing::info;

use crate::error::ApiError;

/// Runs the blocking pipeline on the blocking-task pool. The empty-result
/// outcome folds into a null result here so the endpoint can keep "the model
/// had nothing to say" distinct from a pipeline failure.
pub async fn process_async(
    service: Arc<OcrService>,
    sources: Vec<ImageSource>,
    mode: OcrMode,
    save: bool,
) -> Result<Option<String>, ApiError> {
    let join_result =
        tokio::task::spawn_blocking(move || service.process(&sources, mode, save)).await;

    match join_result {
        Ok(Ok(text)) => Ok(Some(text)),
        Ok(Err(OcrError::EmptyResult)) => {
            info!("generator produced no text for this batch");
            Ok(None)
        }
        Ok(Err(err)) => Err(ApiError::from(err)),
        Err(err) => Err(ApiError::Internal(format!("ocr task failed: {err}"))),
    }
}
