use sqlx::PgPool;
use uuid::Uuid;

use crate::models::PositionValuation;

const VALUATION_COLUMNS: &str = r#"
    p.user_id, u.username, a.symbol,
    p.quantity, p.average_cost, p.total_invested, p.realized_gain,
    lp.price AS current_price
"#;

/// One user's open positions joined against the latest price per asset.
/// `current_price` is NULL for assets with no observations yet.
pub async fn valuations_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> anyhow::Result<Vec<PositionValuation>> {
    let rows = sqlx::query_as::<_, PositionValuation>(&format!(
        r#"
        SELECT {VALUATION_COLUMNS}
        FROM positions p
        JOIN users u ON u.id = p.user_id
        JOIN assets a ON a.id = p.asset_id
        LEFT JOIN LATERAL (
            SELECT price FROM price_observations
            WHERE asset_id = p.asset_id
            ORDER BY observed_at DESC, id DESC
            LIMIT 1
        ) lp ON TRUE
        WHERE p.user_id = $1
        ORDER BY p.opened_at
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Every open position across all users, grouped by user in a stable
/// order. Feeds the leaderboard, which relies on this order for ties.
pub async fn valuations_all(pool: &PgPool) -> anyhow::Result<Vec<PositionValuation>> {
    let rows = sqlx::query_as::<_, PositionValuation>(&format!(
        r#"
        SELECT {VALUATION_COLUMNS}
        FROM positions p
        JOIN users u ON u.id = p.user_id
        JOIN assets a ON a.id = p.asset_id
        LEFT JOIN LATERAL (
            SELECT price FROM price_observations
            WHERE asset_id = p.asset_id
            ORDER BY observed_at DESC, id DESC
            LIMIT 1
        ) lp ON TRUE
        ORDER BY p.user_id, p.opened_at
        "#
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count open positions.
pub async fn count_open(pool: &PgPool) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM positions")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}
