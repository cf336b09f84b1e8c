use crate::predictor::Predictor;
use crate::types::{PredictionRequest, PredictionResponse};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{error::Category, json};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

type ApiError = (StatusCode, Json<serde_json::Value>);

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
}

impl AppState {
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
        }
    }
}

/// Any origin, method and header, with credentials.
///
/// `*` cannot be combined with credentials, so the request's own values are
/// echoed back instead.
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .layer(cors())
        .with_state(state)
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": msg.into() })))
}

/// `application/json`, with or without parameters, or any `application/*+json`.
fn is_json(content_type: &HeaderValue) -> bool {
    let Ok(ct) = content_type.to_str() else {
        return false;
    };
    let essence = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Bodies without a content type are read as JSON too.
fn parse_request(headers: &HeaderMap, body: &[u8]) -> Result<PredictionRequest, ApiError> {
    if let Some(ct) = headers.get(header::CONTENT_TYPE) {
        if !is_json(ct) {
            return Err(api_error(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Expected request with `Content-Type: application/json`",
            ));
        }
    }
    serde_json::from_slice(body).map_err(|e| match e.classify() {
        Category::Data => api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Failed to deserialize the JSON body into the target type: {e}"),
        ),
        Category::Syntax | Category::Eof | Category::Io => api_error(
            StatusCode::BAD_REQUEST,
            format!("Failed to parse the request body as JSON: {e}"),
        ),
    })
}

async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let body = body.map_err(|rej| api_error(rej.status(), rej.body_text()))?;

    // schema errors never reach the model
    let req = parse_request(&headers, &body).map_err(|err| {
        tracing::debug!(status = %err.0, "rejected request body");
        err
    })?;

    let out = state.predictor.predict(&req).map_err(|e| {
        tracing::error!("inference failed: {e}");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(out))
}
