//! HTTP surface: one drawing session per request, results kept per session id.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cosmic_text::fontdb::Database;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::agent::{ChatBackend, KnowledgeBase, respond};
use crate::config::Config;
use crate::error::{AgentError, DrawError};
use crate::session::DrawingSession;
use crate::tools::Variant;

pub const DEFAULT_SESSION: &str = "default";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub variant: Option<Variant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Session {0} is already processing a request")]
    Busy(String),

    #[error("No drawing stored for session {0}")]
    NotFound(String),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Draw(#[from] DrawError),

    #[error("Worker failed: {0}")]
    Worker(String),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::Busy(_) => StatusCode::CONFLICT,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Agent(_) | ServiceError::Draw(_) | ServiceError::Worker(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            log::error!(target: "server", "{self}");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Shared by every handler.
pub struct AppState {
    config: Config,
    fonts: Database,
    chat: Arc<dyn ChatBackend + Send + Sync>,
    knowledge: KnowledgeBase,
    busy: Mutex<HashSet<String>>,
    results: Mutex<LruCache<String, ChatResponse>>,
}

impl AppState {
    pub fn new(config: Config, fonts: Database, chat: Arc<dyn ChatBackend + Send + Sync>) -> Self {
        let knowledge = KnowledgeBase::new(config.agent.kb_dir.clone());
        let stored = NonZeroUsize::new(config.server.max_stored_results).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            fonts,
            chat,
            knowledge,
            busy: Mutex::new(HashSet::new()),
            results: Mutex::new(LruCache::new(stored)),
        }
    }

    /// Run one drawing request to completion. Blocking.
    fn draw(&self, variant: Variant, question: &str) -> Result<ChatResponse, ServiceError> {
        let mut session =
            DrawingSession::new(variant, self.fonts.clone(), self.config.planner.clone())?;
        let message = respond(
            self.chat.as_ref(),
            &mut session,
            question,
            &self.knowledge,
            self.config.agent.max_iterations,
        )?;
        let image = session.export_png_base64()?;
        Ok(ChatResponse { message, image })
    }
}

/// Marks a session id busy until dropped.
struct BusyGuard {
    state: Arc<AppState>,
    session_id: String,
}

impl BusyGuard {
    fn acquire(state: &Arc<AppState>, session_id: &str) -> Result<Self, ServiceError> {
        if !state.busy.lock().insert(session_id.to_string()) {
            return Err(ServiceError::Busy(session_id.to_string()));
        }
        Ok(Self {
            state: Arc::clone(state),
            session_id: session_id.to_string(),
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state.busy.lock().remove(&self.session_id);
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!(target: "server", "ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/chat", post(chat))
        .route("/chat/:session_id", get(last_result).delete(clear_session))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: Arc<AppState>) -> Result<(), String> {
    let bind = state.config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", bind, e))?;
    log::info!(target: "server", "listening on http://{}", bind);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(|e| format!("Server error: {}", e))
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Sketchwright drawing API is running" }))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServiceError> {
    let session_id = request
        .session_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());
    let variant = request.variant.unwrap_or(state.config.agent.variant);
    let _busy = BusyGuard::acquire(&state, &session_id)?;

    log::info!(
        target: "server",
        "session {session_id}: {} request: {}",
        variant.name(),
        request.question
    );

    let worker = Arc::clone(&state);
    let question = request.question;
    let response = tokio::task::spawn_blocking(move || worker.draw(variant, &question))
        .await
        .map_err(|e| ServiceError::Worker(e.to_string()))??;

    state.results.lock().put(session_id, response.clone());
    Ok(Json(response))
}

async fn last_result(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<ChatResponse>, ServiceError> {
    state
        .results
        .lock()
        .get(&session_id)
        .cloned()
        .map(Json)
        .ok_or(ServiceError::NotFound(session_id))
}

async fn clear_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Json<serde_json::Value> {
    state.results.lock().pop(&session_id);
    Json(json!({ "message": format!("Session {session_id} cleared") }))
}
