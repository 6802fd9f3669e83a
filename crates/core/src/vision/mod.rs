mod preprocess;

pub use preprocess::{DEFAULT_CONTEXT_SIZE, DEFAULT_DETAIL_SIZE, DualPreprocessor, ImageTensorPair};
