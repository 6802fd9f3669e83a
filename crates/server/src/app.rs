use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Result;
use got_ocr_config::AppConfig;
use got_ocr_core::{DualPreprocessor, OcrService, SharedGenerator};
use got_ocr_infer_vllm::VllmWorkerClient;
use rocket::{Config, data::ToByteUnit};
use tokenizers::Tokenizer;
use tracing::info;

use crate::{args::Args, routes, state::AppState};

pub async fn run(args: Args) -> Result<()> {
    let (mut config, location) = AppConfig::load_or_init(args.config.as_deref())?;
    config += &args;
    info!(
        "Using configuration {} (template `{}`)",
        location.display(),
        config.inference.template
    );

    let tokenizer = Tokenizer::from_file(&config.generator.tokenizer).map_err(|err| {
        anyhow::anyhow!(
            "failed to load tokenizer from {}: {err}",
            config.generator.tokenizer.display()
        )
    })?;

    let engine = VllmWorkerClient::new(
        config.generator.endpoint.clone(),
        Duration::from_secs(config.generator.request_timeout_secs),
    )?;
    let engine: SharedGenerator = Arc::new(Mutex::new(engine));

    let service = OcrService::new(
        engine,
        Arc::new(tokenizer),
        DualPreprocessor::new(config.inference.context_size, config.inference.detail_size),
        config.inference.template.clone(),
        config.inference.sampling_parameters(),
        config.output.result_path.clone(),
    );

    let figment = Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", config.server.host.clone()))
        .merge((
            "limits",
            rocket::data::Limits::default()
                .limit("json", 50.megabytes())
                .limit("file", 50.megabytes())
                .limit("data-form", 200.megabytes()),
        ));

    info!(
        "Server ready on {}:{} (generation worker at {})",
        config.server.host, config.server.port, config.generator.endpoint
    );

    rocket::custom(figment)
        .attach(crate::cors::Cors)
        .manage(AppState::new(service))
        .mount("/", routes::ocr_routes())
        .launch()
        .await
        .map_err(|err| anyhow::anyhow!("rocket failed: {err}"))?;

    Ok(())
}
