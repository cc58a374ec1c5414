use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use wyr_types::api::{QuestionReport, ReportResponse};

use crate::AppState;
use crate::error::run_blocking;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "gateway_connections": state.dispatcher.connection_count(),
    }))
}

/// Read-only question statistics, the data behind the dashboard view.
pub async fn report(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let engine = state.engine.clone();
    let rows = run_blocking(move || engine.database().question_stats()).await?;

    let questions: Vec<QuestionReport> = rows
        .into_iter()
        .map(|row| QuestionReport {
            question: row.question.into(),
            results: row.tally.into(),
        })
        .collect();

    Ok(Json(ReportResponse {
        total_questions: questions.len(),
        total_votes: questions.iter().map(|q| q.results.total_votes).sum(),
        questions,
    }))
}
