use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use wyr_engine::VoteOutcome;
use wyr_types::api::{CastVoteRequest, VoteResponse};
use wyr_types::models::QuestionId;

use crate::AppState;
use crate::error::run_blocking;

/// A repeated vote is not an error: it answers 200 with the current results
/// and `status: already_voted`.
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(question_id): Path<QuestionId>,
    Json(req): Json<CastVoteRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let engine = state.engine.clone();
    let outcome = run_blocking(move || engine.cast_vote(req.user_id, question_id, req.choice)).await?;

    let response = match outcome {
        VoteOutcome::Recorded(result) => (
            StatusCode::CREATED,
            Json(VoteResponse::Recorded {
                choice: result.choice,
                results: result.tally.into(),
                coins_awarded: result.coins_awarded,
                new_streak: result.new_streak,
                balance: result.balance,
            }),
        ),
        VoteOutcome::AlreadyVoted { tally } => (
            StatusCode::OK,
            Json(VoteResponse::AlreadyVoted {
                results: tally.into(),
            }),
        ),
    };

    Ok(response)
}
