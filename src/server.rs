//! HTTP API for the restaurant site.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::assistant::{ChatTurn, PromptAssembler, Sender};
use crate::config::Config;
use crate::gemini::{CompletionClient, GeminiClient};
use crate::i18n::{self, Language, LanguageTable};
use crate::menu::{group_by_category, MenuFilter, MenuItem, MenuSection, Tag};
use crate::security::AdminCredential;
use crate::store::{
    MockBackend, Reservation, ReservationRequest, ReservationStatus, StoreError,
    SubmissionOutcome, Testimonial,
};

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Incorrect password. Please try again.")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::InvalidReservation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(StoreError::DuplicateMenuItem(_)) => StatusCode::CONFLICT,
            ApiError::Store(StoreError::MenuItemNotFound(_))
            | ApiError::Store(StoreError::ReservationNotFound(_)) => StatusCode::NOT_FOUND,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<MockBackend>,
    pub assistant: Arc<PromptAssembler>,
    admin: AdminCredential,
}

impl AppState {
    pub fn new(
        backend: Arc<MockBackend>,
        completion: Option<Arc<dyn CompletionClient>>,
        admin_password: &str,
    ) -> Self {
        let assistant = Arc::new(PromptAssembler::new(backend.clone(), completion));
        Self {
            backend,
            assistant,
            admin: AdminCredential::new(admin_password),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let backend = Arc::new(MockBackend::new(config.mock_api_delay));
        let completion = GeminiClient::from_config(config)
            .map(|client| Arc::new(client) as Arc<dyn CompletionClient>);
        if completion.is_none() {
            warn!("API_KEY is not set; the menu assistant will answer offline");
        }
        Self::new(backend, completion, &config.admin_password)
    }

    fn is_admin_password(&self, candidate: &str) -> bool {
        self.admin.verify(candidate)
    }
}

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/menu", get(admin_list_menu).post(admin_add_menu_item))
        .route(
            "/menu/:name",
            put(admin_update_menu_item).delete(admin_delete_menu_item),
        )
        .route("/reservations", get(admin_list_reservations))
        .route("/reservations/:id", patch(admin_update_reservation))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health))
        .route("/api/i18n/:lang", get(translation_table))
        .route("/api/i18n/:lang/:key", get(translate_key))
        .route("/api/menu", get(menu))
        .route("/api/testimonials", get(testimonials))
        .route("/api/reservations", post(submit_reservation))
        .route("/api/chat", post(chat))
        .route("/api/admin/login", post(admin_login))
        .nest("/api/admin", admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &Config) -> Result<()> {
    for (code, report) in i18n::validate_registry() {
        for problem in report.errors.iter().chain(report.warnings.iter()) {
            warn!("Locale '{}': {}", code, problem);
        }
    }

    let state = AppState::from_config(config);
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

// ==================== Public Handlers ====================

async fn health() -> &'static str {
    "OK"
}

async fn translation_table(Path(lang): Path<String>) -> Json<&'static LanguageTable> {
    Json(Language::from_code_or_default(Some(&lang)).table())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub language: String,
    pub key: String,
    pub value: String,
}

async fn translate_key(Path((lang, key)): Path<(String, String)>) -> Json<TranslationResponse> {
    let language = Language::from_code_or_default(Some(&lang));
    let value = i18n::translate(language, &key).to_string();
    Json(TranslationResponse {
        language: language.code().to_string(),
        key,
        value,
    })
}

#[derive(Debug, Deserialize)]
struct MenuQuery {
    tags: Option<String>,
    q: Option<String>,
    lang: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterOption {
    pub tag: Tag,
    pub slug: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Serialize)]
struct MenuResponse {
    language: &'static str,
    filters: Vec<FilterOption>,
    sections: Vec<MenuSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    no_results: Option<String>,
}

async fn menu(State(state): State<AppState>, Query(query): Query<MenuQuery>) -> Json<MenuResponse> {
    let language = Language::from_code_or_default(query.lang.as_deref());
    let filter = MenuFilter::from_params(query.tags.as_deref(), query.q.as_deref());
    let items = state.backend.fetch_menu().await;
    let sections = group_by_category(&items, &filter);

    let filters = Tag::ALL
        .into_iter()
        .map(|tag| FilterOption {
            tag,
            slug: tag.slug().to_string(),
            label: tag.localized(language),
            active: filter.tags.contains(&tag),
        })
        .collect();

    let no_results = sections.is_empty().then(|| {
        format!(
            "{} {}",
            language.translate("menuPage.noResults"),
            language.translate("menuPage.noResultsSuggestion")
        )
    });

    Json(MenuResponse {
        language: language.code(),
        filters,
        sections,
        no_results,
    })
}

async fn testimonials(State(state): State<AppState>) -> Json<Vec<Testimonial>> {
    Json(state.backend.fetch_testimonials().await)
}

async fn submit_reservation(
    State(state): State<AppState>,
    Json(request): Json<ReservationRequest>,
) -> Result<Json<SubmissionOutcome>, ApiError> {
    Ok(Json(state.backend.submit_reservation(request).await?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Turns shown so far. A leading assistant greeting is ignored.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    pub message: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is empty".to_string()));
    }

    let language = Language::from_code_or_default(request.language.as_deref());
    let history = match request.history.split_first() {
        Some((first, rest)) if first.sender == Sender::Ai => rest,
        _ => request.history.as_slice(),
    };

    let reply = state
        .assistant
        .respond(history, &request.message, language)
        .await;
    Ok(Json(ChatResponse { reply }))
}

// ==================== Admin ====================

#[derive(Debug, Deserialize)]
struct LoginRequest {
    password: String,
}

async fn admin_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<StatusCode, ApiError> {
    if state.is_admin_password(&request.password) {
        info!("Admin login succeeded");
        Ok(StatusCode::NO_CONTENT)
    } else {
        warn!("Admin login failed");
        Err(ApiError::Unauthorized)
    }
}

async fn require_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = headers
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !state.is_admin_password(provided) {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

async fn admin_list_menu(State(state): State<AppState>) -> Json<Vec<MenuItem>> {
    Json(state.backend.fetch_menu().await)
}

async fn admin_add_menu_item(
    State(state): State<AppState>,
    Json(item): Json<MenuItem>,
) -> Result<(StatusCode, Json<MenuItem>), ApiError> {
    let item = state.backend.add_menu_item(item).await?;
    state.assistant.invalidate_menu_context();
    Ok((StatusCode::CREATED, Json(item)))
}

async fn admin_update_menu_item(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(mut item): Json<MenuItem>,
) -> Result<Json<MenuItem>, ApiError> {
    // Items are keyed by name; the path wins over the body
    item.name = name;
    let item = state.backend.update_menu_item(item).await?;
    state.assistant.invalidate_menu_context();
    Ok(Json(item))
}

async fn admin_delete_menu_item(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> StatusCode {
    state.backend.delete_menu_item(&name).await;
    state.assistant.invalidate_menu_context();
    StatusCode::NO_CONTENT
}

async fn admin_list_reservations(State(state): State<AppState>) -> Json<Vec<Reservation>> {
    Json(state.backend.fetch_reservations().await)
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: ReservationStatus,
}

async fn admin_update_reservation(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Reservation>, ApiError> {
    Ok(Json(
        state
            .backend
            .update_reservation_status(id, update.status)
            .await?,
    ))
}
