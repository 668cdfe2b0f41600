use std::sync::Arc;

use crate::classifier::ToxicityScorer;
use crate::store::FeedbackStore;

/// Shared application state, injected into all route handlers via axum state.
///
/// Both the scorer and the store are constructed once at startup and
/// shared immutably; there is no module-level singleton.
#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<dyn ToxicityScorer>,
    pub store: Arc<FeedbackStore>,
    /// Decision cutoff applied to the scorer's probabilities.
    pub threshold: f32,
}
