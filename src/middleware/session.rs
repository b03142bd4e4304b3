//! Session loading middleware
//!
//! Resolves the visitor's session from the session cookie and attaches a
//! `SessionStore` to the request for everything downstream. A new session is
//! only stored, and its cookie only issued, once something has been written
//! to it.

use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::server::AppState;
use crate::session::SessionStore;

pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_name = &state.config.session_cookie_name;
    let presented = cookie_value(req.headers(), cookie_name);
    let loaded = state.sessions.load_or_create(presented.as_deref());

    let store = SessionStore::new(loaded.session.clone(), Arc::clone(&state.registry));
    req.extensions_mut().insert(store);

    let mut response = next.run(req).await;

    if loaded.is_new && loaded.session.is_modified() {
        state.sessions.commit(&loaded);
        debug!("Committed new session");

        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", cookie_name, loaded.id);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => warn!("Could not build session cookie '{}': {}", cookie_name, e),
        }
    }

    response
}

/// Value of cookie `name` across all `Cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}
