use std::sync::Arc;

use log::{error, info};
use ort::session::Session;
use tokenizers::Tokenizer;

use super::classifier::Classifier;
use super::error::ClassifierError;
use super::labels::DEFAULT_THRESHOLD;
use crate::runtime::{create_session_builder, RuntimeConfig};
use crate::{BuiltinModel, ModelCharacteristics, ModelManager};

/// A builder for constructing a Classifier with a fluent interface.
#[derive(Default, Debug)]
pub struct ClassifierBuilder {
    model_path: Option<String>,
    tokenizer_path: Option<String>,
    tokenizer: Option<Tokenizer>,
    session: Option<Session>,
    model_characteristics: Option<ModelCharacteristics>,
    threshold: Option<f32>,
    runtime_config: RuntimeConfig,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    pub fn new() -> Self {
        Self {
            model_path: None,
            tokenizer_path: None,
            tokenizer: None,
            session: None,
            model_characteristics: None,
            threshold: None,
            runtime_config: RuntimeConfig::default(),
        }
    }

    /// Sets the runtime configuration for ONNX model execution
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Sets the decision threshold used to map probabilities to labels.
    ///
    /// # Errors
    /// * `ValidationError` if the threshold lies outside [0, 1]
    pub fn with_threshold(mut self, threshold: f32) -> Result<Self, ClassifierError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ClassifierError::ValidationError(format!(
                "Threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        self.threshold = Some(threshold);
        Ok(self)
    }

    /// Sets the model to use for classification using a built-in model type.
    ///
    /// Resolves the model and tokenizer from the local cache; the model
    /// must already have been downloaded via [`ModelManager`].
    ///
    /// # Errors
    /// * `BuildError` if the model paths are already set, the model is not
    ///   downloaded, or the model or tokenizer failed to load
    pub fn with_model(mut self, model: BuiltinModel) -> Result<Self, ClassifierError> {
        if self.model_path.is_some() || self.tokenizer_path.is_some() {
            return Err(ClassifierError::BuildError(
                "Model and tokenizer paths already set".to_string(),
            ));
        }

        let manager = ModelManager::new_default().map_err(|e| {
            ClassifierError::BuildError(format!("Failed to create model manager: {}", e))
        })?;

        if !manager.is_model_downloaded(model) {
            return Err(ClassifierError::BuildError(format!(
                "Model '{:?}' is not downloaded. Please download it first using ModelManager::download_model()",
                model
            )));
        }

        let model_path = manager.get_model_path(model);
        let tokenizer_path = manager.get_tokenizer_path(model);

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            error!("Failed to load tokenizer: {}", e);
            ClassifierError::BuildError(format!("Failed to load tokenizer: {}", e))
        })?;
        info!("Tokenizer loaded successfully");

        // Create session using the singleton environment
        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(&model_path)?;

        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        self.model_characteristics = Some(model.characteristics());
        self.model_path = Some(model_path.to_string_lossy().to_string());
        self.tokenizer_path = Some(tokenizer_path.to_string_lossy().to_string());
        self.tokenizer = Some(tokenizer);
        self.session = Some(session);
        Ok(self)
    }

    /// Sets a custom model and tokenizer path for the classifier.
    ///
    /// The model must expose a six-label sequence-classification head.
    /// `max_sequence_length` defaults to 512 when not provided.
    ///
    /// # Errors
    /// * `BuildError` if paths are empty or already set, if the files do
    ///   not exist, or if the model or tokenizer failed to load
    pub fn with_custom_model(
        mut self,
        model_path: &str,
        tokenizer_path: &str,
        max_sequence_length: Option<usize>,
    ) -> Result<Self, ClassifierError> {
        if model_path.is_empty() || tokenizer_path.is_empty() {
            return Err(ClassifierError::BuildError(
                "Model and tokenizer paths cannot be empty".to_string(),
            ));
        }
        if self.model_path.is_some() || self.tokenizer_path.is_some() {
            return Err(ClassifierError::BuildError(
                "Model and tokenizer paths already set".to_string(),
            ));
        }

        if !std::path::Path::new(model_path).exists() {
            return Err(ClassifierError::BuildError(format!(
                "Model file not found: {}",
                model_path
            )));
        }
        if !std::path::Path::new(tokenizer_path).exists() {
            return Err(ClassifierError::BuildError(format!(
                "Tokenizer file not found: {}",
                tokenizer_path
            )));
        }

        let tokenizer = Tokenizer::from_file(tokenizer_path).map_err(|e| {
            error!("Failed to load tokenizer: {}", e);
            ClassifierError::BuildError(format!("Failed to load tokenizer: {}", e))
        })?;
        info!("Tokenizer loaded successfully");

        // Create session using the singleton environment
        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(model_path)?;

        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        self.model_characteristics = Some(ModelCharacteristics {
            num_labels: crate::classifier::NUM_LABELS,
            max_sequence_length: max_sequence_length.unwrap_or(512),
            model_size_mb: 0, // Not critical for functionality
        });

        self.model_path = Some(model_path.to_string());
        self.tokenizer_path = Some(tokenizer_path.to_string());
        self.tokenizer = Some(tokenizer);
        self.session = Some(session);
        Ok(self)
    }

    /// Builds and returns the final Classifier instance
    ///
    /// # Errors
    /// * `BuildError` if no model and tokenizer have been set
    pub fn build(mut self) -> Result<Classifier, ClassifierError> {
        if self.model_path.is_none() || self.tokenizer_path.is_none() {
            return Err(ClassifierError::BuildError(
                "Model and tokenizer paths must be set".to_string(),
            ));
        }

        let model_characteristics = self
            .model_characteristics
            .take()
            .ok_or_else(|| ClassifierError::BuildError("Model characteristics not set".to_string()))?;

        let tokenizer = Arc::new(
            self.tokenizer
                .take()
                .ok_or_else(|| ClassifierError::BuildError("No tokenizer loaded".into()))?,
        );
        let session = Arc::new(
            self.session
                .take()
                .ok_or_else(|| ClassifierError::BuildError("No ONNX model loaded".into()))?,
        );

        Ok(Classifier {
            model_path: self.model_path.take().unwrap(),
            tokenizer_path: self.tokenizer_path.take().unwrap(),
            tokenizer,
            session,
            model_characteristics,
            threshold: self.threshold.unwrap_or(DEFAULT_THRESHOLD),
        })
    }

    /// Validates that the model has the expected input/output structure
    ///
    /// # Errors
    /// * `ModelError` if the model lacks the input_ids/attention_mask
    ///   inputs or has no output tensor
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        let inputs = &session.inputs;
        if inputs.len() < 2 {
            return Err(ClassifierError::ModelError(format!(
                "Model must have at least 2 inputs (input_ids and attention_mask), found {}",
                inputs.len()
            )));
        }

        let outputs = &session.outputs;
        if outputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 output for logits".to_string(),
            ));
        }

        Ok(())
    }
}
