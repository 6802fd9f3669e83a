use std::{
    fs,
    ops::AddAssign,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use got_ocr_core::SamplingParameters;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub inference: InferenceSettings,
    pub generator: GeneratorSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    pub template: String,
    pub context_size: u32,
    pub detail_size: u32,
    pub max_tokens: usize,
    pub temperature: f64,
    pub top_p: f64,
    pub repetition_penalty: f32,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            template: "mpt".to_string(),
            context_size: 224,
            detail_size: 1024,
            max_tokens: 2048,
            temperature: 0.0,
            top_p: 0.95,
            repetition_penalty: 1.25,
        }
    }
}

impl InferenceSettings {
    /// Batch sampling defaults; stop ids and the eos override are filled in
    /// per batch from the active template and tokenizer.
    pub fn sampling_parameters(&self) -> SamplingParameters {
        SamplingParameters {
            temperature: self.temperature,
            top_p: self.top_p,
            repetition_penalty: self.repetition_penalty,
            max_tokens: self.max_tokens,
            ..SamplingParameters::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub endpoint: String,
    pub tokenizer: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8100/generate".to_string(),
            tokenizer: PathBuf::from("tokenizer.json"),
            request_timeout_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub result_path: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            result_path: PathBuf::from("result.txt"),
        }
    }
}

impl AppConfig {
    /// Reads the configuration file, writing defaults first when it does not
    /// exist yet. Returns the resolved location alongside the configuration.
    pub fn load_or_init(override_path: Option<&Path>) -> Result<(Self, PathBuf)> {
        let path = match override_path {
            Some(path) => path.to_path_buf(),
            None => default_config_path(),
        };

        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory {}", parent.display()))?;
            }
            let cfg = AppConfig::default();
            let serialized = toml::to_string_pretty(&cfg)?;
            fs::write(&path, serialized)
                .with_context(|| format!("failed to write configuration to {}", path.display()))?;
            return Ok((cfg, path));
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("failed to parse configuration at {}", path.display()))?;
        Ok((cfg, path))
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = overrides.host.as_ref() {
            self.server.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(template) = overrides.template.as_ref() {
            self.inference.template = template.clone();
        }
        if let Some(context_size) = overrides.context_size {
            self.inference.context_size = context_size;
        }
        if let Some(detail_size) = overrides.detail_size {
            self.inference.detail_size = detail_size;
        }
        if let Some(max_tokens) = overrides.max_tokens {
            self.inference.max_tokens = max_tokens;
        }
        if let Some(temperature) = overrides.temperature {
            self.inference.temperature = temperature;
        }
        if let Some(top_p) = overrides.top_p {
            self.inference.top_p = top_p;
        }
        if let Some(repetition_penalty) = overrides.repetition_penalty {
            self.inference.repetition_penalty = repetition_penalty;
        }
        if let Some(endpoint) = overrides.endpoint.as_ref() {
            self.generator.endpoint = endpoint.clone();
        }
        if let Some(tokenizer) = overrides.tokenizer.as_ref() {
            self.generator.tokenizer = tokenizer.clone();
        }
        if let Some(timeout) = overrides.request_timeout_secs {
            self.generator.request_timeout_secs = timeout;
        }
        if let Some(result_path) = overrides.result_path.as_ref() {
            self.output.result_path = result_path.clone();
        }
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        })
        .join("got-ocr")
        .join("config.toml")
}

#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub template: Option<String>,
    pub context_size: Option<u32>,
    pub detail_size: Option<u32>,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub repetition_penalty: Option<f32>,
    pub endpoint: Option<String>,
    pub tokenizer: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub result_path: Option<PathBuf>,
}

pub trait ConfigOverride {
    fn apply(self, config: &mut AppConfig);
}

impl ConfigOverride for ConfigOverrides {
    fn apply(self, config: &mut AppConfig) {
        config.apply_overrides(&self);
    }
}

impl<'a> ConfigOverride for &'a ConfigOverrides {
    fn apply(self, config: &mut AppConfig) {
        config.apply_overrides(self);
    }
}

impl<O: ConfigOverride> AddAssign<O> for AppConfig {
    fn add_assign(&mut self, rhs: O) {
        rhs.apply(self);
    }
}
