use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::classifier::{labels_over_threshold, Label, LabelScores};

use crate::server::error::ApiError;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub labels: Vec<Label>,
    pub probabilities: LabelScores,
}

/// POST /classify: scores a comment against the six-label vocabulary.
///
/// Invokes the model exactly once per call; no caching of repeated
/// comments. An empty or whitespace-only comment is rejected before the
/// model is ever consulted.
pub async fn classify(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    if request.comment.trim().is_empty() {
        return Err(ApiError::BadRequest("comment must not be empty".to_string()));
    }

    let scores = state.scorer.score(&request.comment)?;
    let labels = labels_over_threshold(&scores, state.threshold);

    Ok(Json(ClassifyResponse {
        labels,
        probabilities: scores,
    }))
}
