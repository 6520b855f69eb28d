use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Deserialize;

use crate::db::{asset_repo, price_repo};
use crate::errors::AppError;
use crate::ledger::engine::normalize_symbol;
use crate::ledger::TradeError;
use crate::models::{Asset, PriceObservation};
use crate::AppState;

use super::ApiResponse;

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Asset>>>, AppError> {
    let assets = asset_repo::list_active(&state.db).await?;
    Ok(Json(ApiResponse::ok(assets)))
}

pub async fn latest_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<PriceObservation>>, AppError> {
    let symbol = normalize_symbol(&symbol);
    let asset = asset_repo::get_by_symbol(&state.db, &symbol)
        .await?
        .ok_or_else(|| TradeError::AssetNotFound(symbol.clone()))?;

    let observation = price_repo::latest_for_asset(&state.db, asset.id)
        .await?
        .ok_or(TradeError::NoPriceData(symbol))?;

    Ok(Json(ApiResponse::ok(observation)))
}

#[derive(Debug, Deserialize)]
pub struct PriceHistoryQuery {
    pub limit: Option<usize>,
}

pub async fn price_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<PriceHistoryQuery>,
) -> Result<Json<ApiResponse<Vec<PriceObservation>>>, AppError> {
    let symbol = normalize_symbol(&symbol);
    let limit = query.limit.unwrap_or(50).clamp(1, 500) as i64;

    let asset = asset_repo::get_by_symbol(&state.db, &symbol)
        .await?
        .ok_or(TradeError::AssetNotFound(symbol))?;

    let observations = price_repo::recent_for_asset(&state.db, asset.id, limit).await?;
    Ok(Json(ApiResponse::ok(observations)))
}

#[derive(Debug, Deserialize)]
pub struct RecordPriceRequest {
    /// Hundredths of a coin, > 0.
    pub price: i64,
    /// Defaults to the server clock.
    #[serde(default)]
    pub observed_at: Option<DateTime<Utc>>,
}

/// Price feed ingestion. Appends one observation; the asset's price
/// history is never rewritten.
pub async fn record_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Json(req): Json<RecordPriceRequest>,
) -> Result<Json<ApiResponse<PriceObservation>>, AppError> {
    if req.price <= 0 {
        return Err(AppError::BadRequest("price must be positive".into()));
    }

    let symbol = normalize_symbol(&symbol);
    let asset = asset_repo::get_by_symbol(&state.db, &symbol)
        .await?
        .ok_or_else(|| TradeError::AssetNotFound(symbol.clone()))?;

    let observation = price_repo::record(&state.db, asset.id, req.price, req.observed_at).await?;

    tracing::debug!(symbol = %symbol, price = req.price, "Price observation recorded");
    counter!("price_observations_total").increment(1);

    Ok(Json(ApiResponse::ok(observation)))
}
