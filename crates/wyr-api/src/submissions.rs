use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use wyr_types::api::{
    ReviewRequest, ReviewResponse, SubmissionResponse, SubmitQuestionRequest, SubmitQuestionResponse,
};
use wyr_types::models::{SubmissionId, SubmissionStatus, UserId};

use crate::AppState;
use crate::error::run_blocking;
use crate::questions::normalize_payload;

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    5
}

pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitQuestionRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let payload = normalize_payload(req.payload)?;
    let submitter_id = req.submitter_id;

    let engine = state.engine.clone();
    let submission_id = run_blocking(move || engine.submit_question(submitter_id, &payload)).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitQuestionResponse {
            submission_id,
            status: SubmissionStatus::Pending,
        }),
    ))
}

pub async fn pending(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let engine = state.engine.clone();
    let limit = query.limit.clamp(1, 50);
    let rows = run_blocking(move || engine.pending_submissions(limit)).await?;

    Ok(Json(rows.into_iter().map(SubmissionResponse::from).collect::<Vec<_>>()))
}

pub async fn user_submissions(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, StatusCode> {
    let engine = state.engine.clone();
    let rows = run_blocking(move || engine.my_submissions(user_id)).await?;

    Ok(Json(rows.into_iter().map(SubmissionResponse::from).collect::<Vec<_>>()))
}

/// 409 when the submission was already reviewed.
pub async fn review(
    State(state): State<AppState>,
    Path(submission_id): Path<SubmissionId>,
    Json(req): Json<ReviewRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let engine = state.engine.clone();
    let outcome = run_blocking(move || {
        engine.review_submission(submission_id, req.reviewer_id, req.decision)
    })
    .await?;

    Ok(Json(ReviewResponse {
        submission_id: outcome.submission_id,
        status: outcome.status,
        question_id: outcome.question_id,
    }))
}
