use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::AppState;

/// Require `Authorization: Bearer <api token>` on adapter-facing routes.
pub async fn require_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !bool::from(token.as_bytes().ct_eq(state.api_token.as_bytes())) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{Router, body::Body, http::Request, middleware::from_fn_with_state, routing::get};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use wyr_engine::{Database, Engine};
    use wyr_gateway::dispatcher::Dispatcher;

    use super::*;
    use crate::AppStateInner;

    fn app(dir: &TempDir) -> Router {
        let db = Database::open(&dir.path().join("auth.db")).unwrap();
        let state: AppState = Arc::new(AppStateInner {
            engine: Engine::new(Arc::new(db)),
            dispatcher: Dispatcher::new(),
            api_token: "s3cret-token".to_string(),
        });
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(from_fn_with_state(state.clone(), require_token))
            .with_state(state)
    }

    async fn status_for(dir: &TempDir, auth: Option<&str>) -> StatusCode {
        let mut req = Request::builder().uri("/ping");
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        app(dir).oneshot(req.body(Body::empty()).unwrap()).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_token_must_match_exactly() {
        let dir = TempDir::new().unwrap();
        assert_eq!(status_for(&dir, Some("Bearer s3cret-token")).await, StatusCode::OK);
        assert_eq!(status_for(&dir, Some("Bearer s3cret")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&dir, Some("Bearer s3cret-token2")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&dir, Some("s3cret-token")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&dir, None).await, StatusCode::UNAUTHORIZED);
    }
}
