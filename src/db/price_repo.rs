use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::PriceObservation;

/// Latest observation for an asset. Same-timestamp observations are
/// tie-broken by insertion sequence, newest wins.
pub async fn latest_for_asset(
    pool: &PgPool,
    asset_id: Uuid,
) -> anyhow::Result<Option<PriceObservation>> {
    let obs = sqlx::query_as::<_, PriceObservation>(
        r#"
        SELECT * FROM price_observations
        WHERE asset_id = $1
        ORDER BY observed_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(asset_id)
    .fetch_optional(pool)
    .await?;

    Ok(obs)
}

/// Most recent observations for an asset, newest first.
pub async fn recent_for_asset(
    pool: &PgPool,
    asset_id: Uuid,
    limit: i64,
) -> anyhow::Result<Vec<PriceObservation>> {
    let observations = sqlx::query_as::<_, PriceObservation>(
        r#"
        SELECT * FROM price_observations
        WHERE asset_id = $1
        ORDER BY observed_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(asset_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(observations)
}

/// Append an observation. `observed_at` defaults to now.
pub async fn record(
    pool: &PgPool,
    asset_id: Uuid,
    price: i64,
    observed_at: Option<DateTime<Utc>>,
) -> anyhow::Result<PriceObservation> {
    let obs = sqlx::query_as::<_, PriceObservation>(
        r#"
        INSERT INTO price_observations (asset_id, price, observed_at)
        VALUES ($1, $2, COALESCE($3, NOW()))
        RETURNING *
        "#,
    )
    .bind(asset_id)
    .bind(price)
    .bind(observed_at)
    .fetch_one(pool)
    .await?;

    Ok(obs)
}
