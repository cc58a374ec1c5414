use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use wyr_engine::TestDailyOutcome;
use wyr_types::api::{DailyConfigResponse, DailyTestResponse, SetDailyRequest};
use wyr_types::models::GuildId;

use crate::AppState;
use crate::error::run_blocking;

pub async fn get_config(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<impl IntoResponse, StatusCode> {
    let engine = state.engine.clone();
    let config = run_blocking(move || engine.daily_config(guild_id))
        .await?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(DailyConfigResponse::from(config)))
}

pub async fn set_channel(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
    Json(req): Json<SetDailyRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let engine = state.engine.clone();
    let config = run_blocking(move || engine.set_daily_channel(guild_id, req.channel_id)).await?;

    Ok(Json(DailyConfigResponse::from(config)))
}

pub async fn disable(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<impl IntoResponse, StatusCode> {
    let engine = state.engine.clone();
    run_blocking(move || engine.disable_daily(guild_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Post a question to the guild's daily channel right away.
/// 409 when daily posting is off, 404 when there are no questions.
pub async fn test_post(
    State(state): State<AppState>,
    Path(guild_id): Path<GuildId>,
) -> Result<impl IntoResponse, StatusCode> {
    let engine = state.engine.clone();
    let outcome = run_blocking(move || engine.test_daily_post(guild_id)).await?;

    match outcome {
        TestDailyOutcome::Posted(post) => Ok(Json(DailyTestResponse {
            guild_id: post.guild_id,
            channel_id: post.channel_id,
            question_id: post.question.id,
        })),
        TestDailyOutcome::NotEnabled => Err(StatusCode::CONFLICT),
        TestDailyOutcome::NoQuestions => Err(StatusCode::NOT_FOUND),
    }
}
