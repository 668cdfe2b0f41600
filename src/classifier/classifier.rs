use std::sync::Arc;

use ort::session::Session;
use tokenizers::Tokenizer;

use super::encoding::SequenceClassification;
use super::error::ClassifierError;
use super::labels::{labels_over_threshold, Label, LabelScores, NUM_LABELS};
use crate::ModelCharacteristics;

/// The result of classifying one comment. Ephemeral, never persisted.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Labels whose probability cleared the threshold, in canonical order.
    pub labels: Vec<Label>,
    /// Probabilities for all six labels.
    pub scores: LabelScores,
}

/// The inference seam between the API layer and the model runtime.
///
/// Request handlers depend on this trait rather than on [`Classifier`]
/// directly, so tests can substitute a deterministic scorer.
pub trait ToxicityScorer: Send + Sync {
    /// Runs inference over `text` and returns one probability per label.
    fn score(&self, text: &str) -> Result<LabelScores, ClassifierError>;
}

/// A thread-safe toxicity classifier using an ONNX sequence-classification model.
///
/// # Thread Safety
///
/// This type is automatically `Send + Sync` because all of its fields are
/// thread-safe: `String`, `f32` and `ModelCharacteristics` are `Send + Sync`,
/// and the `Tokenizer` and `Session` are wrapped in `Arc`. The classifier is
/// built once at startup and is immutable afterwards; concurrent requests
/// share it through an `Arc`.
#[derive(Debug)]
pub struct Classifier {
    pub model_path: String,
    pub tokenizer_path: String,
    pub tokenizer: Arc<Tokenizer>,
    pub session: Arc<Session>,
    pub model_characteristics: ModelCharacteristics,
    pub threshold: f32,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl SequenceClassification for Classifier {
    fn tokenizer(&self) -> Option<&Tokenizer> {
        Some(&self.tokenizer)
    }

    fn session(&self) -> Option<&Session> {
        Some(&self.session)
    }

    fn max_sequence_length(&self) -> Option<usize> {
        Some(self.model_characteristics.max_sequence_length)
    }
}

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Classifies the input text against the fixed six-label vocabulary.
    ///
    /// Runs inference exactly once per call; identical comments are
    /// re-scored every time.
    ///
    /// # Errors
    /// - `ValidationError` if the text is empty or whitespace-only; the
    ///   model is never invoked in that case
    /// - `TokenizerError` / `InferenceError` if the runtime fails
    pub fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::ValidationError(
                "Input text cannot be empty".into(),
            ));
        }

        let scores = self.score(text)?;
        let labels = labels_over_threshold(&scores, self.threshold);
        Ok(Classification { labels, scores })
    }
}

impl ToxicityScorer for Classifier {
    fn score(&self, text: &str) -> Result<LabelScores, ClassifierError> {
        let raw = self.raw_scores(text)?;
        if raw.len() != NUM_LABELS {
            return Err(ClassifierError::InferenceError(format!(
                "Model produced {} scores, expected {}",
                raw.len(),
                NUM_LABELS
            )));
        }
        let slice = raw.as_slice().ok_or_else(|| {
            ClassifierError::InferenceError("Non-contiguous score buffer".into())
        })?;
        let mut scores = [0.0f32; NUM_LABELS];
        scores.copy_from_slice(slice);
        Ok(LabelScores::new(scores))
    }
}
