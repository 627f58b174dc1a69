pub mod classify;
pub mod fetch;
pub mod image;
pub mod prompt;
pub mod orchestrator;

pub use classify::*;
pub use fetch::*;
pub use image::*;
pub use prompt::*;
pub use orchestrator::*;

use thiserror::Error;

use crate::pipeline::inference::InferenceError;

/// Why ingredient text could not be obtained. Folded into
/// `ExtractionResult::Failed` at the stage boundary.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("No ingredient text was provided")]
    EmptyInput,

    #[error("The label could not be read: {0}")]
    Unreadable(String),

    #[error("Image too large ({0} bytes); maximum is 20 MB")]
    ImageTooLarge(usize),

    #[error("Unsupported image format")]
    UnsupportedImage,

    #[error("Could not open image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Product page unavailable: {0}")]
    Fetch(#[from] FetchError),

    #[error("Reading service failed: {0}")]
    Inference(#[from] InferenceError),
}
