mod config;

pub use config::{
    AppConfig, ConfigOverride, ConfigOverrides, GeneratorSettings, InferenceSettings,
    OutputSettings, ServerSettings,
};
