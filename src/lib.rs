//! A toxicity classification service library: ONNX inference over a
//! pretrained multi-label model, a thresholded label mapper, and a
//! SQLite-backed feedback store behind an axum HTTP surface.
//!
//! # Basic Usage
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use amygdala::{BuiltinModel, Classifier, ModelManager};
//!
//! let manager = ModelManager::new_default()?;
//! manager.ensure_model_downloaded(BuiltinModel::ToxicBert).await?;
//!
//! let classifier = Classifier::builder()
//!     .with_model(BuiltinModel::ToxicBert)?
//!     .build()?;
//!
//! let result = classifier.classify("This is an example toxic comment.")?;
//! for label in &result.labels {
//!     println!("{}", label);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The classifier is built once at startup, is immutable afterwards, and
//! is `Send + Sync`; request handlers share it through an `Arc` injected
//! via router state. The feedback store serializes writes internally so
//! every insert receives a unique, monotonically increasing id.

pub mod classifier;
pub mod model_manager;
pub mod models;
mod runtime;
pub mod server;
pub mod store;

pub use classifier::{
    labels_over_threshold, Classification, Classifier, ClassifierBuilder, ClassifierError, Label,
    LabelScores, ToxicityScorer, DEFAULT_THRESHOLD, NUM_LABELS,
};
pub use model_manager::{ModelError, ModelManager};
pub use models::{BuiltinModel, ModelCharacteristics, ModelInfo};
pub use runtime::{create_session_builder, RuntimeConfig};
pub use server::AppState;
pub use store::{FeedbackEntry, FeedbackStore, LabelFlags, StoreError};

pub fn init_logger() {
    env_logger::init();
}
