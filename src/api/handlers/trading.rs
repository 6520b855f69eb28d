use axum::extract::State;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ledger::engine;
use crate::models::{SellMode, TradeResult};
use crate::AppState;

use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct BuyRequest {
    pub user_id: Uuid,
    pub symbol: String,
    /// Coins to spend, fee included.
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct SellRequest {
    pub user_id: Uuid,
    pub symbol: String,
    pub mode: SellMode,
    /// Percent for `percentage` mode, units for `quantity` mode,
    /// ignored for `all`.
    #[serde(default)]
    pub value: Option<Decimal>,
}

pub async fn buy(
    State(state): State<AppState>,
    Json(req): Json<BuyRequest>,
) -> Result<Json<ApiResponse<TradeResult>>, AppError> {
    let result = engine::buy(&state.db, req.user_id, &req.symbol, req.amount).await?;
    Ok(Json(ApiResponse::ok(result)))
}

pub async fn sell(
    State(state): State<AppState>,
    Json(req): Json<SellRequest>,
) -> Result<Json<ApiResponse<TradeResult>>, AppError> {
    let result =
        engine::sell(&state.db, req.user_id, &req.symbol, req.mode, req.value).await?;
    Ok(Json(ApiResponse::ok(result)))
}
