use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::db::position_repo;
use crate::errors::AppError;
use crate::ledger::math::position_value;
use crate::ledger::summary::{summarize, PortfolioSummary};
use crate::AppState;

use super::ApiResponse;

/// One open position as shown to its owner. Valuation fields are null
/// for assets with no price observations yet; the summary endpoint, by
/// contrast, refuses to aggregate in that state.
#[derive(Serialize)]
pub struct HoldingView {
    pub symbol: String,
    pub quantity: i64,
    pub average_cost: i64,
    pub total_invested: i64,
    pub realized_gain: i64,
    pub current_price: Option<i64>,
    pub current_value: Option<i64>,
    pub unrealized_gain: Option<i64>,
}

/// Portfolio summary for a user. A user with no open positions (or an
/// unknown id) gets the all-zero summary.
pub async fn summary(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<PortfolioSummary>>, AppError> {
    let rows = position_repo::valuations_for_user(&state.db, user_id).await?;
    let summary = summarize(&rows)?;
    Ok(Json(ApiResponse::ok(summary)))
}

pub async fn positions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<HoldingView>>>, AppError> {
    let rows = position_repo::valuations_for_user(&state.db, user_id).await?;

    let mut holdings = Vec::with_capacity(rows.len());
    for row in rows {
        let current_value = match row.current_price {
            Some(price) => Some(position_value(row.quantity, price)?),
            None => None,
        };
        holdings.push(HoldingView {
            symbol: row.symbol,
            quantity: row.quantity,
            average_cost: row.average_cost,
            total_invested: row.total_invested,
            realized_gain: row.realized_gain,
            current_price: row.current_price,
            current_value,
            unrealized_gain: current_value.map(|v| v - row.total_invested),
        });
    }

    Ok(Json(ApiResponse::ok(holdings)))
}
