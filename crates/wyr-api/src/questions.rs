use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use wyr_types::api::{AddQuestionRequest, AddQuestionResponse, QuestionResponse, RandomQuestionResponse};
use wyr_types::models::{DEFAULT_CATEGORY, QuestionId, QuestionPayload, UserId};

use crate::AppState;
use crate::error::run_blocking;

const QUESTION_MAX_CHARS: usize = 500;
const OPTION_MAX_CHARS: usize = 200;
const CATEGORY_MAX_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RandomQuery {
    /// When set, the response says whether this user already voted.
    pub user_id: Option<UserId>,
}

/// Trim the payload and enforce the length limits the chat embeds can show.
pub(crate) fn normalize_payload(payload: QuestionPayload) -> Result<QuestionPayload, StatusCode> {
    fn field(value: &str, max: usize) -> Result<String, StatusCode> {
        let value = value.trim();
        if value.is_empty() || value.chars().count() > max {
            return Err(StatusCode::BAD_REQUEST);
        }
        Ok(value.to_string())
    }

    let category = if payload.category.trim().is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        field(&payload.category, CATEGORY_MAX_CHARS)?
    };

    Ok(QuestionPayload {
        question: field(&payload.question, QUESTION_MAX_CHARS)?,
        option_a: field(&payload.option_a, OPTION_MAX_CHARS)?,
        option_b: field(&payload.option_b, OPTION_MAX_CHARS)?,
        category,
    })
}

pub async fn add_question(
    State(state): State<AppState>,
    Json(req): Json<AddQuestionRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let payload = normalize_payload(req)?;

    let engine = state.engine.clone();
    let question_id = run_blocking(move || engine.add_question(&payload)).await?;

    Ok((StatusCode::CREATED, Json(AddQuestionResponse { question_id })))
}

pub async fn get_question(
    State(state): State<AppState>,
    Path(question_id): Path<QuestionId>,
) -> Result<impl IntoResponse, StatusCode> {
    let engine = state.engine.clone();
    let row = run_blocking(move || engine.question(question_id)).await?;

    Ok(Json(QuestionResponse::from(row)))
}

/// 204 when there are no questions yet.
pub async fn random_question(
    State(state): State<AppState>,
    Query(query): Query<RandomQuery>,
) -> Result<Response, StatusCode> {
    let engine = state.engine.clone();
    let picked = run_blocking(move || match query.user_id {
        Some(user_id) => engine.random_question_for(user_id),
        None => Ok(engine.random_question()?.map(|q| (q, None))),
    })
    .await?;

    let Some((question, tally)) = picked else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    Ok(Json(RandomQuestionResponse {
        question: question.into(),
        already_voted: tally.is_some(),
        results: tally.map(Into::into),
    })
    .into_response())
}
