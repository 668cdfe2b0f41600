use ndarray::{Array1, Array2};
use ort::session::Session;
use ort::value::Tensor;
use std::collections::HashMap;
use tokenizers::Tokenizer;

use super::error::ClassifierError;

/// Runs a sequence-classification head over tokenized text.
///
/// This trait handles the conversion of text into per-label logits:
/// 1. Tokenization of the input text (truncated at the model limit)
/// 2. Tensor assembly for the ONNX session
/// 3. Running the model and extracting the logit row
///
/// The ONNX model is expected to:
/// - Accept two inputs: input_ids and attention_mask (both shape [batch_size, sequence_length])
/// - Output logits of shape [batch_size, num_labels]
pub(crate) trait SequenceClassification {
    /// Returns the initialized tokenizer if available
    fn tokenizer(&self) -> Option<&Tokenizer>;

    /// Returns the initialized ONNX session if available
    fn session(&self) -> Option<&Session>;

    /// Returns the maximum sequence length the model can handle
    fn max_sequence_length(&self) -> Option<usize>;

    /// Converts text into token IDs suitable for model input.
    ///
    /// Input longer than `max_sequence_length` is truncated rather than
    /// rejected, matching the behavior of the upstream model pipeline.
    ///
    /// # Errors
    /// - `TokenizerError` if the tokenizer is not initialized
    /// - `TokenizerError` if the text cannot be encoded
    fn tokenize(&self, text: &str) -> Result<Vec<u32>, ClassifierError> {
        let tokenizer = self
            .tokenizer()
            .ok_or_else(|| ClassifierError::TokenizerError("Tokenizer not initialized".into()))?;
        let max_length = self
            .max_sequence_length()
            .ok_or_else(|| ClassifierError::TokenizerError("Max sequence length not set".into()))?;

        let encoding = tokenizer
            .encode(text, true)
            .map_err(|e| ClassifierError::TokenizerError(e.to_string()))?;
        let mut token_ids: Vec<u32> = encoding.get_ids().to_vec();
        token_ids.truncate(max_length);

        if token_ids.is_empty() {
            return Err(ClassifierError::TokenizerError(
                "Tokenizer produced no tokens".into(),
            ));
        }

        Ok(token_ids)
    }

    /// Runs the session over token IDs and returns the logit row.
    ///
    /// # Model Input Format
    /// - input_ids: Token IDs [batch_size=1, sequence_length]
    /// - attention_mask: 1 for real tokens, 0 for padding [batch_size=1, sequence_length]
    ///
    /// # Model Output Format
    /// - Shape: [batch_size=1, num_labels]
    ///
    /// # Errors
    /// - `ModelError` if the session is not initialized
    /// - `InferenceError` if tensor creation, model execution, or output
    ///   extraction fails
    fn logits(&self, tokens: &[u32]) -> Result<Array1<f32>, ClassifierError> {
        let session = self
            .session()
            .ok_or_else(|| ClassifierError::ModelError("Session not initialized".into()))?;

        let input_array = Array2::from_shape_vec(
            (1, tokens.len()),
            tokens.iter().map(|&x| x as i64).collect(),
        )
        .map_err(|e| ClassifierError::InferenceError(format!("Failed to create input array: {}", e)))?;
        let input_dyn = input_array.into_dyn();
        let input_ids = input_dyn.as_standard_layout();

        let mask_array = Array2::from_shape_vec(
            (1, tokens.len()),
            tokens.iter().map(|&x| if x == 0 { 0i64 } else { 1i64 }).collect(),
        )
        .map_err(|e| ClassifierError::InferenceError(format!("Failed to create mask array: {}", e)))?;
        let mask_dyn = mask_array.into_dyn();
        let attention_mask = mask_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            "input_ids",
            Tensor::from_array(&input_ids).map_err(|e| {
                ClassifierError::InferenceError(format!("Failed to create input tensor: {}", e))
            })?,
        );
        input_tensors.insert(
            "attention_mask",
            Tensor::from_array(&attention_mask).map_err(|e| {
                ClassifierError::InferenceError(format!("Failed to create mask tensor: {}", e))
            })?,
        );

        let outputs = session
            .run(input_tensors)
            .map_err(|e| ClassifierError::InferenceError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
            ClassifierError::InferenceError(format!("Failed to extract output tensor: {}", e))
        })?;

        let shape = output_tensor.shape();
        if shape.len() != 2 {
            return Err(ClassifierError::InferenceError(format!(
                "Expected logits of shape [batch, num_labels], got {:?}",
                shape
            )));
        }

        let logit_row = output_tensor.slice(ndarray::s![0, ..]);
        Ok(Array1::from_iter(logit_row.iter().cloned()))
    }

    /// Tokenizes text and returns per-label sigmoid probabilities.
    fn raw_scores(&self, text: &str) -> Result<Array1<f32>, ClassifierError> {
        let tokens = self.tokenize(text)?;
        let logits = self.logits(&tokens)?;
        Ok(logits.mapv(sigmoid))
    }
}

/// Independent per-label activation for a multi-label head; outputs need
/// not sum to 1.
pub(crate) fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
