mod classifier;
mod encoding;
mod error;
mod labels;
pub mod builder;

pub use builder::ClassifierBuilder;
pub use classifier::{Classification, Classifier, ToxicityScorer};
pub use error::ClassifierError;
pub use labels::{labels_over_threshold, Label, LabelScores, DEFAULT_THRESHOLD, NUM_LABELS};
