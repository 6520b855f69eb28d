use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the price_observations table.
///
/// Append-only; `price` is hundredths of a coin and always positive.
/// The serial `id` orders observations that share an `observed_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceObservation {
    pub id: i64,
    pub asset_id: Uuid,
    pub price: i64,
    pub observed_at: DateTime<Utc>,
}
