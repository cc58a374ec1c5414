use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use wyr_types::api::{LeaderboardEntry, UserResponse};
use wyr_types::models::UserId;

use crate::AppState;
use crate::error::run_blocking;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    10
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, StatusCode> {
    let engine = state.engine.clone();
    let user = run_blocking(move || engine.profile(user_id)).await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let engine = state.engine.clone();
    let limit = query.limit.clamp(1, 100);
    let rows = run_blocking(move || engine.leaderboard(limit)).await?;

    let entries: Vec<LeaderboardEntry> = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| LeaderboardEntry {
            rank: i + 1,
            user_id: row.user_id,
            coins: row.coins,
            streak: row.streak,
        })
        .collect();

    Ok(Json(entries))
}
