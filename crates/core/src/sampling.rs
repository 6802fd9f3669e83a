use serde::{Deserialize, Serialize};

/// Sampling parameters shared, by value, across every request in a batch.
///
/// `stop_token_ids` is derived from the active conversation template once per
/// batch; `eos_token_id` carries the tokenizer's pad id standing in for the
/// end-of-sequence token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParameters {
    pub temperature: f64,
    pub top_p: f64,
    pub repetition_penalty: f32,
    pub max_tokens: usize,
    pub stop_token_ids: Vec<i64>,
    pub eos_token_id: Option<i64>,
}

impl Default for SamplingParameters {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.95,
            repetition_penalty: 1.25,
            max_tokens: 2048,
            stop_token_ids: Vec::new(),
            eos_token_id: None,
        }
    }
}
