use amygdala::{Classifier, ClassifierError};

#[test]
fn test_build_without_model_is_an_error() {
    let result = Classifier::builder().build();
    assert!(matches!(result, Err(ClassifierError::BuildError(_))));
}

#[test]
fn test_custom_model_paths_must_exist() {
    let result = Classifier::builder().with_custom_model(
        "/nonexistent/model.onnx",
        "/nonexistent/tokenizer.json",
        Some(512),
    );
    assert!(matches!(result, Err(ClassifierError::BuildError(_))));
}

#[test]
fn test_threshold_out_of_range_is_rejected() {
    let result = Classifier::builder().with_threshold(2.0);
    assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
}
