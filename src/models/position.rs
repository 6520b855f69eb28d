use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the positions table.
///
/// At most one live row per (user, asset). `quantity` is thousandths of
/// a unit, `average_cost` hundredths of a coin, `total_invested` and
/// `realized_gain` whole coins. A fully liquidated position is deleted,
/// never stored at quantity 0.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Position {
    pub id: Uuid,
    pub user_id: Uuid,
    pub asset_id: Uuid,
    pub quantity: i64,
    pub average_cost: i64,
    pub total_invested: i64,
    pub realized_gain: i64,
    pub opened_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Position row joined with its owner, asset symbol, and the latest
/// price observation. `current_price` is None when the oracle has no
/// data for the asset.
#[derive(Debug, Clone, FromRow)]
pub struct PositionValuation {
    pub user_id: Uuid,
    pub username: String,
    pub symbol: String,
    pub quantity: i64,
    pub average_cost: i64,
    pub total_invested: i64,
    pub realized_gain: i64,
    pub current_price: Option<i64>,
}
