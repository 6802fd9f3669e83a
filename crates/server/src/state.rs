use std::sync::Arc;

use got_ocr_core::OcrService;

/// Process-wide state: the pipeline is constructed once at startup and
/// immutable thereafter.
pub struct AppState {
    pub service: Arc<OcrService>,
}

impl AppState {
    pub fn new(service: OcrService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
