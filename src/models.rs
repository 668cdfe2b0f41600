/// Models bundled with the crate, downloadable through [`crate::ModelManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinModel {
    /// ONNX export of `unitary/toxic-bert`: a multi-label toxicity head
    /// over BERT with six sigmoid outputs in the fixed label order.
    ToxicBert,
}

/// Download metadata for a built-in model.
///
/// A digest is pinned only when the upstream repository publishes one;
/// un-pinned artifacts are accepted as downloaded and re-hashed locally
/// for logging.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: String,
    pub model_url: String,
    pub tokenizer_url: String,
    pub model_hash: Option<String>,
    pub tokenizer_hash: Option<String>,
}

/// Runtime characteristics of a model's classification head.
#[derive(Debug, Clone)]
pub struct ModelCharacteristics {
    pub num_labels: usize,
    pub max_sequence_length: usize,
    pub model_size_mb: usize,
}

impl BuiltinModel {
    pub fn get_model_info(&self) -> ModelInfo {
        match self {
            BuiltinModel::ToxicBert => ModelInfo {
                name: "toxic-bert".to_string(),
                model_url: "https://huggingface.co/Xenova/toxic-bert/resolve/main/onnx/model.onnx"
                    .to_string(),
                tokenizer_url: "https://huggingface.co/Xenova/toxic-bert/resolve/main/tokenizer.json"
                    .to_string(),
                // Upstream publishes no digest manifest for these artifacts
                model_hash: None,
                tokenizer_hash: None,
            },
        }
    }

    pub fn characteristics(&self) -> ModelCharacteristics {
        match self {
            BuiltinModel::ToxicBert => ModelCharacteristics {
                num_labels: 6,
                max_sequence_length: 512,
                model_size_mb: 418,
            },
        }
    }
}
