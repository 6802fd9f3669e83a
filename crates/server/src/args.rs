use std::path::PathBuf;

use clap::Parser;
use got_ocr_config::{AppConfig, ConfigOverride, ConfigOverrides};

#[derive(Parser, Debug)]
#[command(author, version, about = "GOT-OCR API Server", long_about = None)]
pub struct Args {
    /// Optional path to a configuration file (defaults to platform config dir).
    #[arg(long, value_name = "PATH", help_heading = "Application")]
    pub config: Option<PathBuf>,

    /// Tokenizer JSON path.
    #[arg(long, value_name = "PATH", help_heading = "Application")]
    pub tokenizer: Option<PathBuf>,

    /// Generation worker endpoint.
    #[arg(long, value_name = "URL", help_heading = "Application")]
    pub endpoint: Option<String>,

    /// Worker request timeout in seconds.
    #[arg(long, help_heading = "Application")]
    pub request_timeout_secs: Option<u64>,

    /// File the save flag writes aggregated results to.
    #[arg(long, value_name = "PATH", help_heading = "Application")]
    pub result_path: Option<PathBuf>,

    /// Conversation template used to render prompts.
    #[arg(long, help_heading = "Inference")]
    pub template: Option<String>,

    /// Global-view resolution.
    #[arg(long, help_heading = "Inference")]
    pub context_size: Option<u32>,

    /// Fine-text view resolution.
    #[arg(long, help_heading = "Inference")]
    pub detail_size: Option<u32>,

    /// Max tokens budget per request.
    #[arg(long, help_heading = "Inference")]
    pub max_tokens: Option<usize>,

    /// Softmax temperature for sampling.
    #[arg(long, help_heading = "Inference")]
    pub temperature: Option<f64>,

    /// Nucleus sampling probability mass.
    #[arg(long, help_heading = "Inference")]
    pub top_p: Option<f64>,

    /// Repetition penalty (>1 discourages repeats).
    #[arg(long, help_heading = "Inference")]
    pub repetition_penalty: Option<f32>,

    /// Host/IP for Rocket to bind to.
    #[arg(long, help_heading = "Application")]
    pub host: Option<String>,

    /// TCP port for Rocket.
    #[arg(long, help_heading = "Application")]
    pub port: Option<u16>,
}

impl From<&Args> for ConfigOverrides {
    fn from(args: &Args) -> Self {
        ConfigOverrides {
            host: args.host.clone(),
            port: args.port,
            template: args.template.clone(),
            context_size: args.context_size,
            detail_size: args.detail_size,
            max_tokens: args.max_tokens,
            temperature: args.temperature,
            top_p: args.top_p,
            repetition_penalty: args.repetition_penalty,
            endpoint: args.endpoint.clone(),
            tokenizer: args.tokenizer.clone(),
            request_timeout_secs: args.request_timeout_secs,
            result_path: args.result_path.clone(),
        }
    }
}

impl ConfigOverride for &Args {
    fn apply(self, config: &mut AppConfig) {
        config.apply_overrides(&ConfigOverrides::from(self));
    }
}
