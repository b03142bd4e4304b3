//! Locale application middleware
//!
//! Reads the visitor's language from the session and installs its culture as
//! the request culture before any handler runs.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::i18n::{self, Culture, LanguageRegistry, RequestCulture};
use crate::session::SessionStore;

/// Middleware to apply the session language's culture to the request.
///
/// The culture is inserted into request extensions and is also visible through
/// [`i18n::current_culture`] for the duration of the downstream call. A
/// request without an attached session, or whose stored language carries an
/// unusable culture code, is served in the default language.
pub async fn locale_middleware(
    State(registry): State<Arc<LanguageRegistry>>,
    mut req: Request,
    next: Next,
) -> Response {
    let language = match req.extensions().get::<SessionStore>() {
        Some(session) => session.language(),
        None => {
            debug!("No session attached to {}, using default language", req.uri());
            registry.default_language()
        }
    };

    let culture = language.culture().unwrap_or_else(|e| {
        warn!("Ignoring session language {}: {}", language, e);
        registry
            .default_language()
            .culture()
            .unwrap_or_else(|_| Culture::en_us())
    });

    debug!("Applying culture {} to {}", culture, req.uri());

    let request_culture = RequestCulture::new(culture);
    req.extensions_mut().insert(request_culture.clone());

    i18n::scope(request_culture, next.run(req)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LanguageItem;
    use crate::session::{MemorySessions, SessionBackend, LANGUAGE_KEY};
    use axum::{
        body::Body,
        extract::Extension,
        middleware::{self, from_fn_with_state},
        routing::get,
        Router,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn registry() -> Arc<LanguageRegistry> {
        Arc::new(
            LanguageRegistry::with_languages([
                LanguageItem::new("English", "en", "en-US"),
                LanguageItem::new("Greek", "el", "el-GR"),
            ])
            .unwrap(),
        )
    }

    /// Router whose handler reports the task-local culture and counts calls.
    fn app(registry: Arc<LanguageRegistry>, session: Option<SessionStore>, calls: Arc<AtomicUsize>) -> Router {
        let handler = move |Extension(culture): Extension<RequestCulture>| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let active = i18n::current_culture().expect("culture installed");
                assert_eq!(active, culture);
                format!("{}|{}", active.culture(), active.ui_culture())
            }
        };

        let router = Router::new()
            .route("/", get(handler))
            .layer(from_fn_with_state(registry, locale_middleware));

        match session {
            Some(session) => router.layer(middleware::from_fn(move |mut req: Request, next: Next| {
                let session = session.clone();
                async move {
                    req.extensions_mut().insert(session);
                    next.run(req).await
                }
            })),
            None => router,
        }
    }

    async fn body_of(app: Router) -> String {
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn fresh_session(registry: &Arc<LanguageRegistry>) -> (SessionStore, Arc<dyn SessionBackend>) {
        let backend: Arc<dyn SessionBackend> = MemorySessions::default().load_or_create(None).session;
        (SessionStore::new(Arc::clone(&backend), Arc::clone(registry)), backend)
    }

    #[tokio::test]
    async fn test_fresh_session_gets_default_culture() {
        let registry = registry();
        let (session, _) = fresh_session(&registry);
        let calls = Arc::new(AtomicUsize::new(0));

        let body = body_of(app(registry, Some(session), Arc::clone(&calls))).await;

        assert_eq!(body, "en-US|en-US");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_selected_language_culture_applied() {
        let registry = registry();
        let (session, _) = fresh_session(&registry);
        session.set_language(Some(&registry.get("el").unwrap())).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let body = body_of(app(registry, Some(session), Arc::clone(&calls))).await;

        assert_eq!(body, "el-GR|el-GR");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_session_uses_default() {
        let calls = Arc::new(AtomicUsize::new(0));
        let body = body_of(app(registry(), None, Arc::clone(&calls))).await;

        assert_eq!(body, "en-US|en-US");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_corrupted_session_value_uses_default() {
        let registry = registry();
        let (session, backend) = fresh_session(&registry);
        backend.set(LANGUAGE_KEY, "garbage".to_string());
        let calls = Arc::new(AtomicUsize::new(0));

        let body = body_of(app(registry, Some(session), Arc::clone(&calls))).await;

        assert_eq!(body, "en-US|en-US");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stored_malformed_culture_uses_default() {
        let registry = registry();
        let (session, _) = fresh_session(&registry);
        session
            .set_language(Some(&LanguageItem::new("Broken", "xx", "not-a-culture!")))
            .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let body = body_of(app(registry, Some(session), Arc::clone(&calls))).await;

        assert_eq!(body, "en-US|en-US");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_registry_uses_synthetic_default() {
        let calls = Arc::new(AtomicUsize::new(0));
        let body = body_of(app(Arc::new(LanguageRegistry::new()), None, Arc::clone(&calls))).await;

        assert_eq!(body, "en-US|en-US");
    }
}
