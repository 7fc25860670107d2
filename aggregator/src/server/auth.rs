//! HTTP basic authentication

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::server::state::ServerState;
use crate::utils::sha256_digest;

const REALM: &str = r#"Basic realm="data-aggregation-api""#;

/// Credentials expected on protected routes
#[derive(Debug, Clone)]
pub struct BasicAuthCredentials {
    pub username: String,
    pub password: SecretString,
}

impl BasicAuthCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Compare a presented username/password pair
    ///
    /// Both sides are hashed first so the comparison length does not depend
    /// on the presented values.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = sha256_digest(username.as_bytes()) == sha256_digest(self.username.as_bytes());
        let pass_ok = sha256_digest(password.as_bytes())
            == sha256_digest(self.password.expose_secret().as_bytes());
        user_ok & pass_ok
    }
}

impl Default for BasicAuthCredentials {
    fn default() -> Self {
        Self::new(String::new(), String::new())
    }
}

/// Extract the user and password of an `Authorization: Basic` header
pub fn parse_basic_auth(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Middleware rejecting requests without valid credentials
pub async fn require_basic_auth(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = match parse_basic_auth(request.headers()) {
        Some((username, password)) => state.auth.matches(&username, &password),
        None => false,
    };

    if !authorized {
        debug!("Rejected unauthenticated request to {}", request.uri().path());
        return unauthorized();
    }

    next.run(request).await
}

fn unauthorized() -> Response {
    let mut response = StatusCode::UNAUTHORIZED.into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
    response
}
