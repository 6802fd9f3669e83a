pub mod conversation;
pub mod error;
pub mod generation;
pub mod loader;
pub mod pipeline;
pub mod prompt;
pub mod sampling;
pub mod vision;

pub use error::OcrError;
pub use generation::{
    BatchGenerator, GenerationOutput, GenerationRequest, SharedGenerator, assemble_requests,
    run_batch,
};
pub use loader::{ImageSource, load_image};
pub use pipeline::OcrService;
pub use prompt::{IMAGE_TOKEN_LEN, OcrMode, PromptSpec, build_prompt};
pub use sampling::SamplingParameters;
pub use vision::{DualPreprocessor, ImageTensorPair};
