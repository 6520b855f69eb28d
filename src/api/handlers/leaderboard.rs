use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::position_repo;
use crate::errors::AppError;
use crate::ledger::leaderboard::{self, LeaderboardEntry, LeaderboardMetric, MAX_LIMIT};
use crate::AppState;

use super::ApiResponse;

const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub metric: LeaderboardMetric,
    pub limit: Option<usize>,
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<ApiResponse<Vec<LeaderboardEntry>>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let rows = position_repo::valuations_all(&state.db).await?;
    let board = leaderboard::rank(&rows, query.metric, limit)?;
    Ok(Json(ApiResponse::ok(board)))
}
