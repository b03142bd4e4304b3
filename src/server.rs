use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{LocalizationError, Result};
use crate::i18n::{Culture, LanguageItem, LanguageRegistry, RequestCulture};
use crate::middleware::{locale_middleware, session_middleware};
use crate::session::{
    idle_timeout_from_minutes, MemorySessions, SessionStore, DEFAULT_IDLE_TIMEOUT_MINUTES,
};

/// Shared state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<LanguageRegistry>,
    pub sessions: MemorySessions,
}

impl AppState {
    /// Register the configured languages and set up session storage.
    ///
    /// # Returns
    /// * `Err(LocalizationError::MalformedCultureCode)` if a configured culture code is invalid
    pub fn new(config: Config) -> Result<Self> {
        let registry = LanguageRegistry::with_languages(config.languages.iter().cloned())?;
        let idle_timeout = idle_timeout_from_minutes(config.session_idle_timeout_minutes)
            .unwrap_or_else(|| {
                warn!(
                    "Session idle timeout of {} minutes is out of range, using {}",
                    config.session_idle_timeout_minutes, DEFAULT_IDLE_TIMEOUT_MINUTES
                );
                chrono::Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES)
            });
        let sessions = MemorySessions::new(idle_timeout);

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            sessions,
        })
    }
}

/// Build the application router.
///
/// Layer order, outermost first: tracing, session, locale, handlers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(current_language))
        .route("/languages", get(list_languages))
        .route("/language/:code", post(select_language))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.registry),
            locale_middleware,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drop idle sessions.
pub fn spawn_session_purge(sessions: MemorySessions, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                debug!("Purged {} expired sessions", purged);
            }
        }
    })
}

#[derive(Debug, Serialize)]
pub struct CurrentLanguage {
    pub language: LanguageItem,
    pub culture: Culture,
    pub ui_culture: Culture,
}

async fn current_language(
    Extension(session): Extension<SessionStore>,
    Extension(culture): Extension<RequestCulture>,
) -> Json<CurrentLanguage> {
    Json(CurrentLanguage {
        language: session.language(),
        culture: culture.culture().clone(),
        ui_culture: culture.ui_culture().clone(),
    })
}

async fn list_languages(State(state): State<AppState>) -> Json<Vec<LanguageItem>> {
    Json(state.registry.items())
}

async fn select_language(
    State(state): State<AppState>,
    Extension(session): Extension<SessionStore>,
    Path(code): Path<String>,
) -> std::result::Result<Json<LanguageItem>, LocalizationError> {
    let language = state.registry.get(&code)?;
    session.set_language(Some(&language))?;
    info!("Session language switched to {}", language);
    Ok(Json(language))
}

impl IntoResponse for LocalizationError {
    fn into_response(self) -> Response {
        let status = match &self {
            LocalizationError::NotRegistered { .. } => StatusCode::NOT_FOUND,
            LocalizationError::MalformedCultureCode { .. } | LocalizationError::Serialization(_) => {
                error!("Localization failure: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
