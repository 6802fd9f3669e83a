use std::sync::{Arc, Mutex};

use anyhow::Result;
use candle_core::Tensor;
use tokenizers::Tokenizer;

use crate::{error::OcrError, sampling::SamplingParameters, vision::ImageTensorPair};

/// One generation request: the batch-shared prompt ids paired with a single
/// image's detail tensor.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt_token_ids: Vec<i64>,
    pub image_tensor: Tensor,
}

#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub text: String,
}

/// Batched text-generation capability. `generate` blocks until every output
/// is available and must resolve outputs in submission order; callers
/// concatenate positionally with no metadata to re-sort by.
pub trait BatchGenerator: Send {
    fn generate(
        &self,
        requests: &[GenerationRequest],
        params: &SamplingParameters,
    ) -> Result<Vec<GenerationOutput>>;
}

pub type SharedGenerator = Arc<Mutex<dyn BatchGenerator + Send>>;

/// Tokenises the prompt once and pairs the identical id sequence with each
/// image's detail tensor, preserving input order exactly.
pub fn assemble_requests(
    tokenizer: &Tokenizer,
    prompt_text: &str,
    pairs: Vec<ImageTensorPair>,
) -> Result<Vec<GenerationRequest>, OcrError> {
    let encoding = tokenizer
        .encode(prompt_text, false)
        .map_err(|err| OcrError::Tokenize(err.to_string()))?;
    let prompt_token_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| i64::from(id)).collect();

    Ok(pairs
        .into_iter()
        .map(|pair| GenerationRequest {
            prompt_token_ids: prompt_token_ids.clone(),
            image_tensor: pair.detail,
        })
        .collect())
}

/// Submits the whole batch as one call. Any backend failure fails the batch;
/// there is no partial success. A result count that differs from the request
/// count would break positional aggregation and is rejected outright.
pub fn run_batch(
    engine: &dyn BatchGenerator,
    requests: &[GenerationRequest],
    params: &SamplingParameters,
) -> Result<Vec<GenerationOutput>, OcrError> {
    let outputs = engine
        .generate(requests, params)
        .map_err(OcrError::Generation)?;
    if outputs.len() != requests.len() {
        return Err(OcrError::Generation(anyhow::anyhow!(
            "generator returned {} outputs for {} requests",
            outputs.len(),
            requests.len()
        )));
    }
    Ok(outputs)
}
