use std::{fs, path::PathBuf, sync::Arc};

use tokenizers::Tokenizer;
use tracing::{debug, warn};

use crate::{
    error::OcrError,
    generation::{SharedGenerator, assemble_requests, run_batch},
    loader::{ImageSource, load_image},
    prompt::{OcrMode, build_prompt, eos_override, stop_token_ids},
    sampling::SamplingParameters,
    vision::DualPreprocessor,
};

/// End-to-end OCR orchestration: load, preprocess, prompt, assemble, run,
/// aggregate. One instance lives for the process lifetime; each call's
/// pipeline executes sequentially within that call.
pub struct OcrService {
    engine: SharedGenerator,
    tokenizer: Arc<Tokenizer>,
    preprocessor: DualPreprocessor,
    template: String,
    sampling: SamplingParameters,
    result_path: PathBuf,
}

impl OcrService {
    pub fn new(
        engine: SharedGenerator,
        tokenizer: Arc<Tokenizer>,
        preprocessor: DualPreprocessor,
        template: impl Into<String>,
        sampling: SamplingParameters,
        result_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            tokenizer,
            preprocessor,
            template: template.into(),
            sampling,
            result_path: result_path.into(),
        }
    }

    /// Runs the whole batch and returns the concatenated text, in submission
    /// order and with no per-image delimiters. Any single load failure aborts
    /// the batch before the generator is touched; an empty aggregate is the
    /// distinct `EmptyResult` outcome and skips the save.
    pub fn process(
        &self,
        sources: &[ImageSource],
        mode: OcrMode,
        save: bool,
    ) -> Result<String, OcrError> {
        let mut images = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter().enumerate() {
            let image = load_image(source).map_err(|err| OcrError::ImageLoad {
                index,
                source: Box::new(err),
            })?;
            images.push(image);
        }

        let mut pairs = Vec::with_capacity(images.len());
        for image in &images {
            pairs.push(self.preprocessor.preprocess(image)?);
        }

        let spec = build_prompt(mode, &self.template)?;
        let mut params = self.sampling.clone();
        params.stop_token_ids = stop_token_ids(&self.tokenizer, &spec)?;
        params.eos_token_id = eos_override(&self.tokenizer);

        let requests = assemble_requests(&self.tokenizer, &spec.text, pairs)?;
        let prompt_tokens = requests
            .first()
            .map(|request| request.prompt_token_ids.len())
            .unwrap_or_default();
        debug!(
            images = requests.len(),
            prompt_tokens, "dispatching OCR batch"
        );

        let outputs = {
            let guard = self
                .engine
                .lock()
                .map_err(|_| OcrError::Generation(anyhow::anyhow!("generator lock poisoned")))?;
            run_batch(&*guard, &requests, &params)?
        };

        let mut aggregated = String::new();
        for output in &outputs {
            aggregated.push_str(&output.text);
        }
        if aggregated.is_empty() {
            return Err(OcrError::EmptyResult);
        }

        if save {
            if let Err(err) = fs::write(&self.result_path, &aggregated) {
                warn!(
                    path = %self.result_path.display(),
                    error = %err,
                    "failed to persist OCR result"
                );
            }
        }

        Ok(aggregated)
    }
}
