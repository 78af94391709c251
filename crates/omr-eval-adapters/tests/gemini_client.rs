//! Integration tests for the Gemini evaluator.
//!
//! Uses wiremock in place of the Gemini API. Covers request layout, shape
//! validation of the returned JSON, and transport failures.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use omr_eval_adapters::{GeminiConfig, GeminiEvaluator};
use omr_eval_core::{
    AnswerKey, EncodedImage, EvaluationError, Evaluator, MediaType, Validation,
};
use omr_eval_test_support::ResultBuilder;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn evaluator(server: &MockServer) -> GeminiEvaluator {
    GeminiEvaluator::new(GeminiConfig::new("test-key").with_endpoint(server.uri()))
        .expect("failed to create evaluator")
}

fn envelope(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn image() -> EncodedImage {
    EncodedImage::from_bytes(b"fake-png", MediaType::Png)
}

#[tokio::test]
async fn test_evaluate_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(&ResultBuilder::uniform(5).build_json())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = evaluator(&server)
        .evaluate(&image(), &AnswerKey::sample())
        .await
        .expect("evaluation failed");

    assert_eq!(result.total_score, 25);
    assert_eq!(result.subject_scores.as_array(), [5; 5]);
    assert_eq!(result.student_answers.len(), 100);
}

#[tokio::test]
async fn test_request_carries_image_key_and_schema() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(&ResultBuilder::uniform(1).build_json())),
        )
        .mount(&server)
        .await;

    evaluator(&server)
        .evaluate(&image(), &AnswerKey::new("1:A,2:B"))
        .await
        .expect("evaluation failed");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();

    let parts = &body["contents"][0]["parts"];
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
    assert_eq!(parts[0]["inlineData"]["data"], image().data());
    assert!(parts[1]["text"].as_str().unwrap().contains("1:A,2:B"));

    let schema = &body["generationConfig"]["responseSchema"];
    assert_eq!(schema["type"], "OBJECT");
    assert_eq!(
        schema["required"],
        json!(["subjectScores", "totalScore", "studentAnswers"])
    );
}

#[tokio::test]
async fn test_missing_total_score_is_format_error() {
    let server = MockServer::start().await;

    let text = json!({
        "subjectScores": { "subject1": 5, "subject2": 5, "subject3": 5, "subject4": 5, "subject5": 5 },
        "studentAnswers": ["A"]
    })
    .to_string();
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&text)))
        .mount(&server)
        .await;

    let err = evaluator(&server)
        .evaluate(&image(), &AnswerKey::sample())
        .await
        .unwrap_err();

    assert!(matches!(err, EvaluationError::InvalidFormat { .. }));
    assert_eq!(err.to_string(), "The AI model returned an invalid data format.");
}

#[tokio::test]
async fn test_non_json_text_is_format_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope("The sheet is too blurry.")),
        )
        .mount(&server)
        .await;

    let err = evaluator(&server)
        .evaluate(&image(), &AnswerKey::sample())
        .await
        .unwrap_err();

    assert!(matches!(err, EvaluationError::InvalidFormat { .. }));
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = evaluator(&server)
        .evaluate(&image(), &AnswerKey::sample())
        .await
        .unwrap_err();

    match err {
        EvaluationError::Transport(e) => assert!(format!("{e:#}").contains("503")),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_no_candidates_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "promptFeedback": { "blockReason": "OTHER" } })),
        )
        .mount(&server)
        .await;

    let err = evaluator(&server)
        .evaluate(&image(), &AnswerKey::sample())
        .await
        .unwrap_err();

    assert!(matches!(err, EvaluationError::Transport(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let evaluator =
        GeminiEvaluator::new(GeminiConfig::new("test-key").with_endpoint(uri)).unwrap();
    let err = evaluator
        .evaluate(&image(), &AnswerKey::sample())
        .await
        .unwrap_err();

    assert!(matches!(err, EvaluationError::Transport(_)));
}

#[tokio::test]
async fn test_strict_mode_rejects_inconsistent_total() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(&ResultBuilder::uniform(5).total(40).build_json())),
        )
        .mount(&server)
        .await;

    let strict = GeminiEvaluator::new(
        GeminiConfig::new("test-key")
            .with_endpoint(server.uri())
            .with_validation(Validation::Strict),
    )
    .unwrap();
    let err = strict
        .evaluate(&image(), &AnswerKey::sample())
        .await
        .unwrap_err();
    assert!(matches!(err, EvaluationError::Inconsistent { .. }));

    let permissive = evaluator(&server)
        .evaluate(&image(), &AnswerKey::sample())
        .await
        .unwrap();
    assert_eq!(permissive.total_score, 40);
}
