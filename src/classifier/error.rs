use ort::Error as OrtError;

/// Represents the different types of errors that can occur in the toxicity classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// Error occurred while loading or using the tokenizer
    #[error("Tokenizer error: {0}")]
    TokenizerError(String),
    /// Error occurred while loading or running the ONNX model
    #[error("Model error: {0}")]
    ModelError(String),
    /// Error occurred during the build phase
    #[error("Build error: {0}")]
    BuildError(String),
    /// Error occurred while running inference
    #[error("Inference error: {0}")]
    InferenceError(String),
    /// Error occurred due to invalid input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<OrtError> for ClassifierError {
    fn from(err: OrtError) -> Self {
        ClassifierError::BuildError(err.to_string())
    }
}
