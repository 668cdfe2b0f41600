use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use amygdala::server::{app, AppState};
use amygdala::{
    ClassifierError, FeedbackStore, LabelFlags, LabelScores, ToxicityScorer, DEFAULT_THRESHOLD,
};

/// Deterministic scorer standing in for the model runtime.
struct FixedScorer {
    scores: [f32; 6],
    calls: AtomicUsize,
}

impl FixedScorer {
    fn new(scores: [f32; 6]) -> Self {
        Self {
            scores,
            calls: AtomicUsize::new(0),
        }
    }
}

impl ToxicityScorer for FixedScorer {
    fn score(&self, _text: &str) -> Result<LabelScores, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(LabelScores::new(self.scores))
    }
}

/// Scorer that always fails, simulating a broken inference backend.
struct FailingScorer;

impl ToxicityScorer for FailingScorer {
    fn score(&self, _text: &str) -> Result<LabelScores, ClassifierError> {
        Err(ClassifierError::InferenceError(
            "session raised during inference".to_string(),
        ))
    }
}

fn test_state(scorer: Arc<dyn ToxicityScorer>) -> AppState {
    AppState {
        scorer,
        store: Arc::new(FeedbackStore::open_in_memory().unwrap()),
        threshold: DEFAULT_THRESHOLD,
    }
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_classify_returns_thresholded_labels() {
    let scorer = Arc::new(FixedScorer::new([0.85, 0.02, 0.15, 0.01, 0.78, 0.03]));
    let state = test_state(scorer);

    let response = app(state)
        .oneshot(post_json(
            "/classify",
            json!({"comment": "This is an example toxic comment."}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["labels"], json!(["toxic", "insult"]));
    assert_eq!(body["probabilities"].as_object().unwrap().len(), 6);
    assert!((body["probabilities"]["toxic"].as_f64().unwrap() - 0.85).abs() < 1e-6);
    assert!((body["probabilities"]["identity_hate"].as_f64().unwrap() - 0.03).abs() < 1e-6);
}

#[tokio::test]
async fn test_classify_no_label_over_threshold_is_empty_list() {
    let scorer = Arc::new(FixedScorer::new([0.1, 0.0, 0.2, 0.01, 0.3, 0.05]));
    let state = test_state(scorer);

    let response = app(state)
        .oneshot(post_json("/classify", json!({"comment": "have a nice day"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["labels"], json!([]));
}

#[tokio::test]
async fn test_classify_empty_comment_never_reaches_scorer() {
    let scorer = Arc::new(FixedScorer::new([0.9; 6]));
    let state = test_state(scorer.clone());

    for comment in ["", "   ", "\n\t"] {
        let response = app(state.clone())
            .oneshot(post_json("/classify", json!({"comment": comment})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_classify_scorer_failure_is_service_unavailable() {
    let state = test_state(Arc::new(FailingScorer));

    let response = app(state)
        .oneshot(post_json("/classify", json!({"comment": "anything"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    // Internal detail is logged, not leaked
    assert!(!body["error"].as_str().unwrap().contains("session raised"));
}

#[tokio::test]
async fn test_submit_feedback_roundtrip() {
    let state = test_state(Arc::new(FixedScorer::new([0.0; 6])));

    let response = app(state.clone())
        .oneshot(post_json(
            "/submit-feedback",
            json!({"comment": "you are a fool", "expected_labels": ["toxic", "insult"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Feedback stored successfully");

    let response = app(state).oneshot(get("/view-feedback")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let entries = body_json(response).await;
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry["comment"], "you are a fool");
    assert_eq!(entry["toxic"], true);
    assert_eq!(entry["insult"], true);
    assert_eq!(entry["severe_toxic"], false);
    assert_eq!(entry["obscene"], false);
    assert_eq!(entry["threat"], false);
    assert_eq!(entry["identity_hate"], false);
    assert!(entry["id"].as_i64().unwrap() >= 1);
    assert!(entry["timestamp"].is_string());
}

#[tokio::test]
async fn test_submit_feedback_rejects_unknown_labels() {
    let state = test_state(Arc::new(FixedScorer::new([0.0; 6])));

    let response = app(state.clone())
        .oneshot(post_json(
            "/submit-feedback",
            json!({"comment": "whatever", "expected_labels": ["toxic", "spam"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("spam"));

    // Nothing was written
    let response = app(state).oneshot(get("/feedback-stats")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total_feedback_entries"], 0);
}

#[tokio::test]
async fn test_submit_feedback_accepts_none_as_no_label() {
    let state = test_state(Arc::new(FixedScorer::new([0.0; 6])));

    let response = app(state.clone())
        .oneshot(post_json(
            "/submit-feedback",
            json!({"comment": "perfectly civil", "expected_labels": ["none"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(state).oneshot(get("/view-feedback")).await.unwrap();
    let entries = body_json(response).await;
    let entry = &entries.as_array().unwrap()[0];
    for flag in ["toxic", "severe_toxic", "obscene", "threat", "insult", "identity_hate"] {
        assert_eq!(entry[flag], false);
    }
}

#[tokio::test]
async fn test_submit_feedback_empty_comment_rejected() {
    let state = test_state(Arc::new(FixedScorer::new([0.0; 6])));

    let response = app(state)
        .oneshot(post_json(
            "/submit-feedback",
            json!({"comment": "  ", "expected_labels": ["toxic"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_feedback_stats_counts_inserts() {
    let state = test_state(Arc::new(FixedScorer::new([0.0; 6])));

    for i in 0..3 {
        let response = app(state.clone())
            .oneshot(post_json(
                "/submit-feedback",
                json!({"comment": format!("comment {}", i), "expected_labels": ["threat"]}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app(state).oneshot(get("/feedback-stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_feedback_entries"], 3);
}

#[tokio::test]
async fn test_view_feedback_pagination_is_disjoint_and_ordered() {
    let state = test_state(Arc::new(FixedScorer::new([0.0; 6])));
    for i in 0..5 {
        state
            .store
            .insert(&format!("comment {}", i), LabelFlags::default())
            .await
            .unwrap();
    }

    let response = app(state.clone())
        .oneshot(get("/view-feedback?limit=2&offset=0"))
        .await
        .unwrap();
    let first = body_json(response).await;
    let response = app(state)
        .oneshot(get("/view-feedback?limit=2&offset=2"))
        .await
        .unwrap();
    let second = body_json(response).await;

    let first = first.as_array().unwrap();
    let second = second.as_array().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert_eq!(first[0]["comment"], "comment 0");
    assert_eq!(first[1]["comment"], "comment 1");
    assert_eq!(second[0]["comment"], "comment 2");
    assert_eq!(second[1]["comment"], "comment 3");
    assert!(first[1]["id"].as_i64().unwrap() < second[0]["id"].as_i64().unwrap());
}

#[tokio::test]
async fn test_view_feedback_limit_is_capped() {
    let state = test_state(Arc::new(FixedScorer::new([0.0; 6])));
    for i in 0..501 {
        state
            .store
            .insert(&format!("comment {}", i), LabelFlags::default())
            .await
            .unwrap();
    }

    let response = app(state)
        .oneshot(get("/view-feedback?limit=100000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 500);
    assert_eq!(entries[0]["comment"], "comment 0");
    assert_eq!(entries[499]["comment"], "comment 499");
}

#[tokio::test]
async fn test_view_feedback_negative_params_rejected() {
    let state = test_state(Arc::new(FixedScorer::new([0.0; 6])));

    for uri in ["/view-feedback?limit=-1", "/view-feedback?offset=-5"] {
        let response = app(state.clone()).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_view_feedback_offset_past_end_is_empty() {
    let state = test_state(Arc::new(FixedScorer::new([0.0; 6])));
    state.store.insert("only", LabelFlags::default()).await.unwrap();

    let response = app(state)
        .oneshot(get("/view-feedback?limit=10&offset=100"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_file_backed_store_via_api() {
    let dir = tempfile::tempdir().unwrap();
    let store = FeedbackStore::open(dir.path().join("feedback.db")).unwrap();
    let state = AppState {
        scorer: Arc::new(FixedScorer::new([0.0; 6])),
        store: Arc::new(store),
        threshold: DEFAULT_THRESHOLD,
    };

    let response = app(state.clone())
        .oneshot(post_json(
            "/submit-feedback",
            json!({"comment": "persisted", "expected_labels": ["obscene"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(state).oneshot(get("/view-feedback")).await.unwrap();
    let entries = body_json(response).await;
    assert_eq!(entries.as_array().unwrap()[0]["obscene"], true);
}
