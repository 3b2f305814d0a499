//! HTTP surface over the translator.
//!
//! - `GET /languages-list` (alias `/api/languages`): registry dump
//! - `POST /translate` (alias `/api/translate`): `{ text, from?, to?, raw? }`
//! - `GET /health`

use crate::config::Config;
use crate::error::TranslateError;
use crate::translator::{TranslateOptions, Translator};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<Translator>,
}

#[derive(Debug, Deserialize)]
pub struct TranslateBody {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(flatten)]
    pub options: TranslateOptions,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    fn reply(status: StatusCode, error: &str, message: Option<String>) -> Response {
        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/languages-list", get(list_languages))
        .route("/api/languages", get(list_languages))
        .route("/translate", post(translate))
        .route("/api/translate", post(translate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &Config, translator: Translator) -> anyhow::Result<()> {
    let state = AppState {
        translator: Arc::new(translator),
    };
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Translator running at http://{}", listener.local_addr()?);
    info!(
        "📚 Supporting {} languages",
        Translator::languages().len() - 1
    );

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_languages() -> impl IntoResponse {
    Json(Translator::languages())
}

async fn translate(
    State(state): State<AppState>,
    body: Result<Json<TranslateBody>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Rejected translation request body: {}", rejection.body_text());
            return ErrorResponse::reply(
                rejection.status(),
                "Invalid request body",
                Some(rejection.body_text()),
            );
        }
    };

    let Some(text) = body.text.filter(|text| !text.trim().is_empty()) else {
        return ErrorResponse::reply(StatusCode::BAD_REQUEST, "Text is required", None);
    };

    match state.translator.translate(&text, body.options).await {
        Ok(result) => Json(result).into_response(),
        Err(e @ TranslateError::UnsupportedLanguage(_)) => {
            warn!("Rejected translation request: {}", e);
            ErrorResponse::reply(
                StatusCode::BAD_REQUEST,
                "Unsupported language",
                Some(e.to_string()),
            )
        }
        Err(e) if e.is_client_error() => {
            ErrorResponse::reply(StatusCode::BAD_REQUEST, "Text is required", None)
        }
        Err(e) => {
            error!("Translation error: {}", e);
            let message = match &e {
                TranslateError::AllStrategiesFailed { source, .. } => source.to_string(),
                other => other.to_string(),
            };
            ErrorResponse::reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Translation failed",
                Some(message),
            )
        }
    }
}
