//! Blocking client for an external vLLM generation worker.
//!
//! The worker owns the model weights and accelerator placement; this client
//! ships the batch of token-id prompts and detail tensors over HTTP in one
//! call and relies on the worker to resolve outputs in submission order.

use std::time::Duration;

use anyhow::{Context, Result, ensure};
use base64::Engine as _;
use candle_core::Tensor;
use got_ocr_core::{BatchGenerator, GenerationOutput, GenerationRequest, SamplingParameters};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct WirePayload<'a> {
    requests: Vec<WireRequest>,
    sampling: &'a SamplingParameters,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireRequest {
    prompt_token_ids: Vec<i64>,
    image: WireTensor,
}

/// Little-endian f32 buffer, base64-encoded, alongside its CHW shape.
#[derive(Debug, Serialize, Deserialize)]
struct WireTensor {
    shape: Vec<usize>,
    data: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    outputs: Vec<WireOutput>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireOutput {
    text: String,
}

pub struct VllmWorkerClient {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl VllmWorkerClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build generation worker client")?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl BatchGenerator for VllmWorkerClient {
    fn generate(
        &self,
        requests: &[GenerationRequest],
        params: &SamplingParameters,
    ) -> Result<Vec<GenerationOutput>> {
        let wire_requests = requests
            .iter()
            .map(|request| {
                Ok(WireRequest {
                    prompt_token_ids: request.prompt_token_ids.clone(),
                    image: encode_tensor(&request.image_tensor)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let payload = WirePayload {
            requests: wire_requests,
            sampling: params,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .with_context(|| format!("generation worker request to {} failed", self.endpoint))?;
        ensure!(
            response.status().is_success(),
            "generation worker returned {}",
            response.status()
        );

        let body: WireResponse = response
            .json()
            .context("generation worker returned malformed output")?;
        ensure!(
            body.outputs.len() == requests.len(),
            "generation worker returned {} outputs for {} requests",
            body.outputs.len(),
            requests.len()
        );
        Ok(body
            .outputs
            .into_iter()
            .map(|output| GenerationOutput { text: output.text })
            .collect())
    }
}

fn encode_tensor(tensor: &Tensor) -> Result<WireTensor> {
    let values = tensor
        .flatten_all()?
        .to_vec1::<f32>()
        .context("image tensor must be f32")?;
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for value in values {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    Ok(WireTensor {
        shape: tensor.dims().to_vec(),
        data: base64::engine::general_purpose::STANDARD.encode(bytes),
    })
}
