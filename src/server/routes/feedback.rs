use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::classifier::Label;
use crate::store::{FeedbackEntry, LabelFlags};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Upper bound the API enforces on one page of results. The store itself
/// accepts any limit; this keeps a single request from dumping the table.
const MAX_PAGE_SIZE: u32 = 500;

const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub comment: String,
    pub expected_labels: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackAck {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackStats {
    pub total_feedback_entries: u64,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /submit-feedback: records which labels should have applied.
///
/// `expected_labels` must be drawn from the six-label vocabulary; the
/// literal `"none"` is also accepted and sets no flag, matching the wire
/// contract of the feedback clients. Anything else is rejected with the
/// offending strings named, so typos never silently produce an all-false
/// row.
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<FeedbackAck>, ApiError> {
    if request.comment.trim().is_empty() {
        return Err(ApiError::BadRequest("comment must not be empty".to_string()));
    }

    let mut labels: Vec<Label> = Vec::new();
    let mut invalid: Vec<&str> = Vec::new();
    for raw in &request.expected_labels {
        match Label::parse(raw) {
            Some(label) => labels.push(label),
            None if raw == "none" => {}
            None => invalid.push(raw.as_str()),
        }
    }
    if !invalid.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "invalid labels: {}",
            invalid.join(", ")
        )));
    }

    let flags = LabelFlags::from_labels(&labels);
    let id = state.store.insert(&request.comment, flags).await?;
    log::debug!("stored feedback entry {}", id);

    Ok(Json(FeedbackAck {
        message: "Feedback stored successfully".to_string(),
    }))
}

/// GET /feedback-stats: total number of stored feedback entries.
pub async fn feedback_stats(
    State(state): State<AppState>,
) -> Result<Json<FeedbackStats>, ApiError> {
    let total = state.store.count().await?;
    Ok(Json(FeedbackStats {
        total_feedback_entries: total,
    }))
}

/// GET /view-feedback?limit=&offset=: paginated read of feedback rows,
/// ordered by id ascending. Negative parameters are a 400; an offset past
/// the end is an empty page, not an error.
pub async fn view_feedback(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<FeedbackEntry>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE as i64);
    let offset = params.offset.unwrap_or(0);
    if limit < 0 || offset < 0 {
        return Err(ApiError::BadRequest(
            "limit and offset must be non-negative".to_string(),
        ));
    }

    let limit = (limit.min(MAX_PAGE_SIZE as i64)) as u32;
    let offset = u32::try_from(offset).unwrap_or(u32::MAX);

    let entries = state.store.list(limit, offset).await?;
    Ok(Json(entries))
}
