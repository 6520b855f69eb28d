use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the assets table (the tradable catalogue).
///
/// Immutable reference data apart from the `is_active` flag;
/// `min_investment` is whole coins and is enforced on buys.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub symbol: String,
    pub name: String,
    pub category: String,
    pub feed_source: Option<String>,
    pub feed_id: Option<String>,
    pub is_active: bool,
    pub min_investment: i64,
    pub created_at: Option<DateTime<Utc>>,
}
