//! HTTP surface.
//!
//! # Endpoints
//!
//! - `GET /health` — liveness plus the supported language keys.
//! - `GET /languages` — `{key: {name, code}}` for every registered language.
//! - `POST /translate` — one article, one `target_language`.
//! - `POST /translate/batch` — one article, a `target_languages` array; one
//!   record per language.
//! - `POST /translate/multi` — like batch, regrouped into
//!   `{title|description|content: {code: text}}`.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::error::{NewsglotError, Result};
use crate::language::LanguageListing;
use crate::translate::{ArticlePayload, Coordinator, MultiStatus, TranslationRecord};

type JsonBody = std::result::Result<Json<Value>, JsonRejection>;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Local>,
    supported_languages: Vec<String>,
}

#[derive(Serialize)]
struct LanguagesResponse<'a> {
    supported_languages: LanguageListing<'a>,
    total_count: usize,
}

#[derive(Serialize)]
struct BatchResponse {
    news_id: String,
    total_translations: usize,
    results: Vec<TranslationRecord>,
    timestamp: DateTime<Local>,
    status: &'static str,
}

/// Error envelope returned by every endpoint.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Map<String, Value>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let mut body = Map::new();
        body.insert("error".to_string(), Value::String(message.into()));
        body.insert("status".to_string(), json!("error"));
        Self { status, body }
    }

    fn internal(details: impl Into<String>) -> Self {
        let mut api_error = Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
        api_error
            .body
            .insert("details".to_string(), Value::String(details.into()));
        api_error
    }

    /// Attach the news id and timestamp, as the multi endpoint reports them.
    fn with_context(mut self, news_id: &str) -> Self {
        self.body
            .insert("news_id".to_string(), Value::String(news_id.to_string()));
        self.body
            .insert("timestamp".to_string(), json!(Local::now()));
        self
    }
}

impl From<NewsglotError> for ApiError {
    fn from(error: NewsglotError) -> Self {
        match error {
            NewsglotError::RequestMalformed(message) => Self::new(StatusCode::BAD_REQUEST, message),
            NewsglotError::UnsupportedLanguage {
                requested,
                supported,
            } => {
                let mut api_error = Self::new(
                    StatusCode::BAD_REQUEST,
                    format!("unsupported target language: {}", requested.join(", ")),
                );
                api_error
                    .body
                    .insert("supported_languages".to_string(), json!(supported));
                api_error
            }
            other => {
                error!("Request failed: {}", other);
                Self::internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(Value::Object(self.body))).into_response()
    }
}

pub fn router(coordinator: Arc<Coordinator>) -> Router {
    let state = AppState { coordinator };

    Router::new()
        .route("/health", get(health_check))
        .route("/languages", get(list_languages))
        .route("/translate", post(translate))
        .route("/translate/batch", post(translate_batch))
        .route("/translate/multi", post(translate_multi))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(coordinator: Arc<Coordinator>, host: &str, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Server running at http://{}:{}", host, port);

    axum::serve(listener, router(coordinator)).await?;
    Ok(())
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Local::now(),
        supported_languages: state.coordinator.registry().keys(),
    })
}

async fn list_languages(State(state): State<AppState>) -> Response {
    let registry = state.coordinator.registry();
    Json(LanguagesResponse {
        supported_languages: registry.listing(),
        total_count: registry.len(),
    })
    .into_response()
}

async fn translate(
    State(state): State<AppState>,
    body: JsonBody,
) -> std::result::Result<Response, ApiError> {
    let span = info_span!("translate", request_id = %Uuid::new_v4());
    async move {
        let body = body_object(body)?;
        ensure_present(&body, "target_language")?;
        let article = parse_article(&body)?;
        let language = required_text(&body, "target_language")?;

        let record = state
            .coordinator
            .translate_single(&article, &language)
            .await?;

        let status = if record.outcome.is_failed() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::OK
        };
        Ok((status, Json(record)).into_response())
    }
    .instrument(span)
    .await
}

async fn translate_batch(
    State(state): State<AppState>,
    body: JsonBody,
) -> std::result::Result<Json<BatchResponse>, ApiError> {
    let span = info_span!("translate_batch", request_id = %Uuid::new_v4());
    async move {
        let body = body_object(body)?;
        ensure_present(&body, "target_languages")?;
        let article = parse_article(&body)?;
        let languages = parse_language_list(&body)?;

        let results = state
            .coordinator
            .translate_batch(&article, &languages)
            .await?;

        Ok(Json(BatchResponse {
            news_id: article.news_id,
            total_translations: results.len(),
            results,
            timestamp: Local::now(),
            status: "success",
        }))
    }
    .instrument(span)
    .await
}

async fn translate_multi(State(state): State<AppState>, body: JsonBody) -> Response {
    let span = info_span!("translate_multi", request_id = %Uuid::new_v4());
    async move {
        let body = match body_object(body) {
            Ok(body) => body,
            Err(e) => return ApiError::from(e).with_context("").into_response(),
        };
        let news_id = lenient_news_id(&body);

        let outcome = async {
            ensure_present(&body, "target_languages")?;
            let article = parse_article(&body)?;
            let languages = parse_language_list(&body)?;
            state.coordinator.translate_multi(&article, &languages).await
        }
        .await;

        match outcome {
            Ok(result) if result.status == MultiStatus::Error => {
                warn!("No language could be translated for news {}", news_id);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "translation failed completely")
                    .with_context(&news_id)
                    .into_response()
            }
            Ok(result) => Json(result).into_response(),
            Err(e) => ApiError::from(e).with_context(&news_id).into_response(),
        }
    }
    .instrument(span)
    .await
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    };

    error!("Request handler panicked: {}", details);
    ApiError::internal(details).into_response()
}

fn body_object(body: JsonBody) -> Result<Map<String, Value>> {
    let Json(value) = body.map_err(|e| NewsglotError::RequestMalformed(e.body_text()))?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(NewsglotError::RequestMalformed(
            "request body must be a JSON object".to_string(),
        )),
    }
}

const ARTICLE_FIELDS: [&str; 4] = ["news_id", "title", "description", "content"];

/// Report the first missing field among the article fields and `language_field`.
fn ensure_present(body: &Map<String, Value>, language_field: &str) -> Result<()> {
    let missing = ARTICLE_FIELDS
        .iter()
        .copied()
        .find(|field| !body.contains_key(*field))
        .or_else(|| (!body.contains_key(language_field)).then_some(language_field));

    match missing {
        Some(field) => Err(NewsglotError::RequestMalformed(format!(
            "missing required field: {}",
            field
        ))),
        None => Ok(()),
    }
}

fn required_text(body: &Map<String, Value>, field: &str) -> Result<String> {
    match body.get(field) {
        None | Some(Value::Null) => Err(NewsglotError::RequestMalformed(format!(
            "missing required field: {}",
            field
        ))),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Ok(scalar.to_string()),
        Some(_) => Err(NewsglotError::RequestMalformed(format!(
            "field {} must be a string",
            field
        ))),
    }
}

fn parse_article(body: &Map<String, Value>) -> Result<ArticlePayload> {
    Ok(ArticlePayload {
        news_id: required_text(body, "news_id")?,
        title: required_text(body, "title")?,
        description: required_text(body, "description")?,
        content: required_text(body, "content")?,
    })
}

fn parse_language_list(body: &Map<String, Value>) -> Result<Vec<String>> {
    match body.get("target_languages") {
        Some(Value::Array(items)) => Ok(items
            .iter()
            .map(|item| match item {
                Value::String(key) => key.clone(),
                other => other.to_string(),
            })
            .collect()),
        Some(_) => Err(NewsglotError::RequestMalformed(
            "target_languages must be an array".to_string(),
        )),
        None => Err(NewsglotError::RequestMalformed(
            "missing required field: target_languages".to_string(),
        )),
    }
}

fn lenient_news_id(body: &Map<String, Value>) -> String {
    required_text(body, "news_id").unwrap_or_default()
}
