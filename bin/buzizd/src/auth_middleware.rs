//! Static bearer-token check.
//!
//! One shared token from the server config gates every endpoint except
//! the public probes. An empty configured token disables the check
//! entirely (local development).

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

#[derive(Clone)]
pub struct TokenState {
    pub token: String,
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "missing authorization token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid token"),
        };
        let body = serde_json::json!({ "code": "UNAUTHORIZED", "message": msg });
        (status, axum::Json(body)).into_response()
    }
}

pub async fn auth_middleware(
    State(state): State<Arc<TokenState>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if state.token.is_empty() || is_public_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    if token != state.token {
        return Err(AuthError::InvalidToken);
    }
    Ok(next.run(request).await)
}

fn is_public_path(path: &str) -> bool {
    matches!(path, "/health" | "/version")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probes_are_public() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/version"));
        assert!(!is_public_path("/kv/office:o1"));
    }
}
