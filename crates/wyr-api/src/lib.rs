pub mod daily;
pub mod error;
pub mod middleware;
pub mod questions;
pub mod report;
pub mod submissions;
pub mod users;
pub mod votes;

use std::sync::Arc;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
};

use wyr_engine::Engine;
use wyr_gateway::connection;
use wyr_gateway::dispatcher::Dispatcher;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub engine: Engine,
    pub dispatcher: Dispatcher,
    pub api_token: String,
}

/// Full HTTP surface. Everything except health and the report needs the
/// adapter's bearer token.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(report::health))
        .route("/report", get(report::report))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/questions", post(questions::add_question))
        .route("/questions/random", get(questions::random_question))
        .route("/questions/{question_id}", get(questions::get_question))
        .route("/questions/{question_id}/votes", post(votes::cast_vote))
        .route("/users/{user_id}", get(users::get_profile))
        .route("/users/{user_id}/submissions", get(submissions::user_submissions))
        .route("/leaderboard", get(users::leaderboard))
        .route("/submissions", post(submissions::submit))
        .route("/submissions/pending", get(submissions::pending))
        .route("/submissions/{submission_id}/review", post(submissions::review))
        .route(
            "/guilds/{guild_id}/daily",
            put(daily::set_channel).get(daily::get_config).delete(daily::disable),
        )
        .route("/guilds/{guild_id}/daily/test", post(daily::test_post))
        .route("/gateway", get(ws_upgrade))
        .layer(from_fn_with_state(state.clone(), middleware::require_token))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let dispatcher = state.dispatcher.clone();
    ws.on_upgrade(move |socket| connection::handle_connection(socket, dispatcher))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use wyr_engine::Database;

    const TOKEN: &str = "test-token";

    struct TestApp {
        _dir: TempDir,
        state: AppState,
    }

    impl TestApp {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let db = Database::open(&dir.path().join("wyr.db")).unwrap();
            let dispatcher = Dispatcher::new();
            let engine = Engine::new(Arc::new(db)).with_notifier(Arc::new(dispatcher.clone()));
            let state = Arc::new(AppStateInner {
                engine,
                dispatcher,
                api_token: TOKEN.to_string(),
            });
            Self { _dir: dir, state }
        }

        async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let mut builder = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN));
            let body = match body {
                Some(json) => {
                    builder = builder.header(header::CONTENT_TYPE, "application/json");
                    Body::from(json.to_string())
                }
                None => Body::empty(),
            };

            let response = router(self.state.clone())
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        async fn add_question(&self) -> i64 {
            let (status, body) = self
                .send(
                    "POST",
                    "/questions",
                    Some(json!({
                        "question": "Fly or be invisible?",
                        "option_a": "Fly",
                        "option_b": "Be invisible"
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            body["question_id"].as_i64().unwrap()
        }
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = TestApp::new();
        let response = router(app.state.clone())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = TestApp::new();

        let response = router(app.state.clone())
            .oneshot(Request::builder().uri("/leaderboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router(app.state.clone())
            .oneshot(
                Request::builder()
                    .uri("/leaderboard")
                    .header(header::AUTHORIZATION, "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_random_question_empty_store() {
        let app = TestApp::new();
        let (status, _) = app.send("GET", "/questions/random", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_vote_then_duplicate() {
        let app = TestApp::new();
        let question_id = app.add_question().await;
        let uri = format!("/questions/{}/votes", question_id);

        let (status, body) = app
            .send("POST", &uri, Some(json!({ "user_id": 7, "choice": "a" })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "recorded");
        assert_eq!(body["coins_awarded"], 10);
        assert_eq!(body["new_streak"], 1);
        assert_eq!(body["results"]["a_votes"], 1);

        let (status, body) = app
            .send("POST", &uri, Some(json!({ "user_id": 7, "choice": "b" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "already_voted");
        assert_eq!(body["results"]["total_votes"], 1);

        let (status, body) = app.send("GET", "/users/7", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coins"], 10);
        assert_eq!(body["total_votes"], 1);

        let (_, body) = app.send("GET", "/questions/random?user_id=7", None).await;
        assert_eq!(body["already_voted"], true);
        assert_eq!(body["results"]["a_votes"], 1);
    }

    #[tokio::test]
    async fn test_vote_on_missing_question() {
        let app = TestApp::new();
        let (status, _) = app
            .send("POST", "/questions/99/votes", Some(json!({ "user_id": 7, "choice": "a" })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_add_question_rejects_blank_fields() {
        let app = TestApp::new();
        let (status, _) = app
            .send(
                "POST",
                "/questions",
                Some(json!({ "question": "  ", "option_a": "x", "option_b": "y" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submission_review_flow() {
        let app = TestApp::new();
        let (status, body) = app
            .send(
                "POST",
                "/submissions",
                Some(json!({
                    "submitter_id": 5,
                    "question": "Sea or sky?",
                    "option_a": "Sea",
                    "option_b": "Sky"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "pending");
        let submission_id = body["submission_id"].as_i64().unwrap();

        let (_, body) = app.send("GET", "/submissions/pending", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["category"], "General");

        let uri = format!("/submissions/{}/review", submission_id);
        let (status, body) = app
            .send("POST", &uri, Some(json!({ "reviewer_id": 1, "decision": "approve" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "approved");
        let question_id = body["question_id"].as_i64().unwrap();

        let (status, _) = app
            .send("POST", &uri, Some(json!({ "reviewer_id": 2, "decision": "reject" })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = app.send("GET", &format!("/questions/{}", question_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question"], "Sea or sky?");

        let (_, body) = app.send("GET", "/users/5/submissions", None).await;
        assert_eq!(body[0]["status"], "approved");
    }

    #[tokio::test]
    async fn test_daily_config_routes() {
        let app = TestApp::new();

        let (status, _) = app.send("GET", "/guilds/1/daily", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.send("POST", "/guilds/1/daily/test", None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = app
            .send("PUT", "/guilds/1/daily", Some(json!({ "channel_id": 100 })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enabled"], true);

        let (status, _) = app.send("POST", "/guilds/1/daily/test", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let question_id = app.add_question().await;
        let (status, body) = app.send("POST", "/guilds/1/daily/test", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question_id"], question_id);

        let (status, _) = app.send("DELETE", "/guilds/1/daily", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = app.send("GET", "/guilds/1/daily", None).await;
        assert_eq!(body["enabled"], false);

        let (status, _) = app.send("DELETE", "/guilds/2/daily", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_leaderboard_and_report() {
        let app = TestApp::new();
        let question_id = app.add_question().await;
        let uri = format!("/questions/{}/votes", question_id);
        for user_id in [1, 2] {
            app.send("POST", &uri, Some(json!({ "user_id": user_id, "choice": "b" })))
                .await;
        }

        let (_, body) = app.send("GET", "/leaderboard?limit=1", None).await;
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["rank"], 1);
        assert_eq!(entries[0]["user_id"], 1);

        let response = router(app.state.clone())
            .oneshot(Request::builder().uri("/report").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let report: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(report["total_questions"], 1);
        assert_eq!(report["total_votes"], 2);
        assert_eq!(report["questions"][0]["results"]["b_percent"], 100.0);
    }
}
