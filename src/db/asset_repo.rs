use sqlx::PgPool;

use crate::models::Asset;

/// Look up an asset by its (already normalized) symbol.
pub async fn get_by_symbol(pool: &PgPool, symbol: &str) -> anyhow::Result<Option<Asset>> {
    let asset = sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE symbol = $1")
        .bind(symbol)
        .fetch_optional(pool)
        .await?;

    Ok(asset)
}

/// All assets currently open for trading.
pub async fn list_active(pool: &PgPool) -> anyhow::Result<Vec<Asset>> {
    let assets =
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE is_active ORDER BY symbol")
            .fetch_all(pool)
            .await?;

    Ok(assets)
}
