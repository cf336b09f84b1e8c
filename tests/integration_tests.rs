/// End-to-end tests against the fixture artifacts in tests/fixtures.
///
/// Run with: cargo test --test integration_tests -- --nocapture

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use dozy_predictor::{
    server::{self, AppState},
    ArtifactPaths, Artifacts, PredictionRequest, PredictionResponse, Predictor,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::{path::PathBuf, sync::Arc};
use tower::ServiceExt;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn fixture_paths() -> ArtifactPaths {
    ArtifactPaths {
        model: fixture("dozy_model.json"),
        scaler: fixture("dozy_scaler.json"),
        feature_order: fixture("feature_columns.json"),
    }
}

fn predictor() -> Predictor {
    Predictor::new(Artifacts::load(&fixture_paths()).expect("fixture artifacts should load"))
}

fn app() -> Router {
    server::router(AppState::new(predictor()))
}

fn golden() -> Value {
    let txt = std::fs::read_to_string(fixture("golden.json")).expect("golden file");
    serde_json::from_str(&txt).expect("golden json")
}

fn base_body() -> Value {
    json!({
        "start_delay_min": 10,
        "last_minute_rush": 1,
        "focus_rating": 3,
        "distractions_count": 5,
        "coffee_intake_mg": 100,
        "task_quality_score": 7,
        "stress_level": 6
    })
}

async fn post_predict(app: Router, body: String) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[test]
fn test_golden_prediction() {
    println!("\n=== Test: Golden Prediction ===");
    let golden = golden();
    let req: PredictionRequest = serde_json::from_value(golden["request"].clone()).unwrap();
    let expected: PredictionResponse = serde_json::from_value(golden["expected"].clone()).unwrap();

    let out = predictor().predict(&req).unwrap();
    println!("  got {:?}, expected {:?}", out, expected);

    assert_eq!(out.procrastination_prediction, expected.procrastination_prediction);
    assert!(
        (out.risk_score - expected.risk_score).abs() < 1e-12,
        "risk score drifted from golden value"
    );
}

#[tokio::test]
async fn test_predict_endpoint_returns_golden_pair() {
    let golden = golden();
    let (status, body) = post_predict(app(), golden["request"].to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["procrastination_prediction"],
        golden["expected"]["procrastination_prediction"]
    );
    let got = body["risk_score"].as_f64().unwrap();
    let want = golden["expected"]["risk_score"].as_f64().unwrap();
    assert!((got - want).abs() < 1e-12);
    assert_eq!(body.as_object().unwrap().len(), 2, "only the two response fields");
}

#[tokio::test]
async fn test_omitted_complexity_equals_explicit_zero() {
    let (_, omitted) = post_predict(app(), base_body().to_string()).await;

    let mut explicit = base_body();
    explicit["task_complexity_low"] = json!(0);
    explicit["task_complexity_medium"] = json!(0);
    let (_, explicit) = post_predict(app(), explicit.to_string()).await;

    assert_eq!(omitted, explicit);
}

#[tokio::test]
async fn test_complexity_flags_reach_the_model() {
    let (_, plain) = post_predict(app(), base_body().to_string()).await;

    let mut low = base_body();
    low["task_complexity_low"] = json!(1);
    let (_, low) = post_predict(app(), low.to_string()).await;

    assert_ne!(plain["risk_score"], low["risk_score"]);
}

#[tokio::test]
async fn test_missing_required_field_is_client_error() {
    let mut body = base_body();
    body.as_object_mut().unwrap().remove("stress_level");
    let (status, err) = post_predict(app(), body.to_string()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let msg = err["error"].as_str().expect("structured error body");
    assert!(msg.contains("stress_level"), "{msg}");
}

#[tokio::test]
async fn test_wrong_type_is_client_error() {
    let mut body = base_body();
    body["focus_rating"] = json!("high");
    let (status, err) = post_predict(app(), body.to_string()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(err["error"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_client_error() {
    let (status, err) = post_predict(app(), "{\"start_delay_min\": ".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].is_string());
}

#[tokio::test]
async fn test_missing_content_type_is_read_as_json() {
    let golden = golden();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .body(Body::from(golden["request"].to_string()))
        .unwrap();
    let res = app().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let out: PredictionResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        out.procrastination_prediction,
        golden["expected"]["procrastination_prediction"].as_i64().unwrap()
    );
    assert!((out.risk_score - golden["expected"]["risk_score"].as_f64().unwrap()).abs() < 1e-12);
}

#[tokio::test]
async fn test_non_json_content_type_is_rejected() {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(base_body().to_string()))
        .unwrap();
    let res = app().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_json_content_type_with_charset_is_accepted() {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Body::from(base_body().to_string()))
        .unwrap();
    let res = app().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_coerced_values_match_plain_integers() {
    let (_, plain) = post_predict(app(), base_body().to_string()).await;

    let mut coerced = base_body();
    coerced["start_delay_min"] = json!("10");
    coerced["focus_rating"] = json!(3.0);
    coerced["coffee_intake_mg"] = json!("1_00.0");
    coerced["last_minute_rush"] = json!(true);
    let (status, coerced) = post_predict(app(), coerced.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(plain, coerced);
}

#[tokio::test]
async fn test_outputs_stay_in_range_across_inputs() {
    let app = app();
    for delay in [0, 5, 30, 120, 600] {
        for stress in [0, 3, 10, 50] {
            let mut body = base_body();
            body["start_delay_min"] = json!(delay);
            body["stress_level"] = json!(stress);
            let (status, out) = post_predict(app.clone(), body.to_string()).await;
            assert_eq!(status, StatusCode::OK);
            let label = out["procrastination_prediction"].as_i64().unwrap();
            let risk = out["risk_score"].as_f64().unwrap();
            assert!(label == 0 || label == 1);
            assert!((0.0..=1.0).contains(&risk), "risk {risk} out of range");
        }
    }
}

#[tokio::test]
async fn test_concurrent_requests_agree() {
    let predictor = Arc::new(predictor());
    let req: PredictionRequest = serde_json::from_value(base_body()).unwrap();
    let first = predictor.predict(&req).unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let predictor = Arc::clone(&predictor);
            tokio::spawn(async move { predictor.predict(&req).unwrap() })
        })
        .collect();

    for out in futures::future::join_all(handles).await {
        assert_eq!(out.unwrap(), first);
    }
}

#[tokio::test]
async fn test_cors_preflight_echoes_origin_with_credentials() {
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/predict")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type,x-client")
        .body(Body::empty())
        .unwrap();
    let res = app().oneshot(req).await.unwrap();

    assert!(res.status().is_success());
    let h = res.headers();
    assert_eq!(h[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:5173");
    assert_eq!(h[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(h[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    assert_eq!(h[header::ACCESS_CONTROL_ALLOW_HEADERS], "content-type,x-client");
}

#[tokio::test]
async fn test_cors_headers_on_actual_request() {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::ORIGIN, "https://dozy.example")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(base_body().to_string()))
        .unwrap();
    let res = app().oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://dozy.example");
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}
