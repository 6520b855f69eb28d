//! The transactional buy/sell path.
//!
//! Every trade runs in a single database transaction holding `FOR
//! UPDATE` locks on the user row and the touched position row, so
//! concurrent trades against the same user or position serialize at the
//! database and the balance/position updates stay atomic. Validation
//! failures roll the transaction back untouched.

use metrics::{counter, gauge};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{Asset, Position, SellMode, TradeResult, TradeSide, User};

use super::math::{self, PositionState};
use super::TradeError;

/// Symbols are stored uppercase; accept any casing and stray whitespace
/// from callers.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Infrastructure faults are not business rejections: they log at error
/// level and stay out of the rejection counter.
fn infra_failure(e: &TradeError) -> bool {
    matches!(e, TradeError::Storage(_) | TradeError::Overflow)
}

/// Spend `amount` coins on `symbol` at the latest observed price.
pub async fn buy(
    pool: &PgPool,
    user_id: Uuid,
    symbol: &str,
    amount: i64,
) -> Result<TradeResult, TradeError> {
    match execute_buy(pool, user_id, symbol, amount).await {
        Ok(result) => Ok(result),
        Err(e) if infra_failure(&e) => {
            tracing::error!(user = %user_id, symbol = %symbol, error = %e, "Buy failed");
            Err(e)
        }
        Err(e) => {
            tracing::warn!(user = %user_id, symbol = %symbol, error = %e, "Buy rejected");
            counter!("trades_rejected_total").increment(1);
            Err(e)
        }
    }
}

/// Liquidate part or all of a position in `symbol` at the latest
/// observed price.
pub async fn sell(
    pool: &PgPool,
    user_id: Uuid,
    symbol: &str,
    mode: SellMode,
    value: Option<Decimal>,
) -> Result<TradeResult, TradeError> {
    match execute_sell(pool, user_id, symbol, mode, value).await {
        Ok(result) => Ok(result),
        Err(e) if infra_failure(&e) => {
            tracing::error!(user = %user_id, symbol = %symbol, error = %e, "Sell failed");
            Err(e)
        }
        Err(e) => {
            tracing::warn!(user = %user_id, symbol = %symbol, error = %e, "Sell rejected");
            counter!("trades_rejected_total").increment(1);
            Err(e)
        }
    }
}

async fn execute_buy(
    pool: &PgPool,
    user_id: Uuid,
    symbol: &str,
    amount: i64,
) -> Result<TradeResult, TradeError> {
    math::validate_buy_amount(amount)?;
    let symbol = normalize_symbol(symbol);

    let mut tx = pool.begin().await?;

    // 1. Lock the buyer's balance row.
    let user = lock_user(&mut tx, user_id).await?;

    // 2. Asset gate: must exist, be tradable, and clear its minimum.
    let asset = get_asset(&mut tx, &symbol).await?;
    if !asset.is_active {
        return Err(TradeError::AssetInactive(symbol));
    }
    if amount < asset.min_investment {
        return Err(TradeError::BelowMinInvestment {
            amount,
            minimum: asset.min_investment,
        });
    }
    if amount > user.coins {
        return Err(TradeError::InsufficientFunds {
            required: amount,
            available: user.coins,
        });
    }

    // 3. Price the trade at the latest observation.
    let price = latest_price(&mut tx, asset.id)
        .await?
        .ok_or_else(|| TradeError::NoPriceData(symbol.clone()))?;
    let quote = math::quote_buy(amount, price)?;

    // 4. Fold the fill into the position under the same locks.
    let existing = lock_position(&mut tx, user_id, asset.id).await?;
    let opened = existing.is_none();
    let state = math::apply_buy(existing.map(to_state), &quote, price)?;

    // 5. Debit the coins and persist the new position state.
    let balance = user.coins - quote.total;
    set_balance(&mut tx, user_id, balance).await?;
    let position = upsert_position(&mut tx, user_id, asset.id, &state).await?;

    tx.commit().await?;

    tracing::info!(
        user = %user.username,
        symbol = %symbol,
        amount,
        price,
        quantity = quote.quantity,
        fee = quote.fee,
        "Buy executed"
    );
    counter!("buys_total").increment(1);
    if opened {
        gauge!("open_positions").increment(1.0);
    }

    Ok(TradeResult {
        side: TradeSide::Buy,
        symbol,
        price,
        quantity: quote.quantity,
        subtotal: quote.subtotal,
        fee: quote.fee,
        total: quote.total,
        profit_loss: None,
        position: Some(position),
        balance,
    })
}

async fn execute_sell(
    pool: &PgPool,
    user_id: Uuid,
    symbol: &str,
    mode: SellMode,
    value: Option<Decimal>,
) -> Result<TradeResult, TradeError> {
    let amount = math::parse_sell_amount(mode, value)?;
    let symbol = normalize_symbol(symbol);

    let mut tx = pool.begin().await?;

    // 1. Lock the seller's balance row.
    let user = lock_user(&mut tx, user_id).await?;

    // 2. Asset lookup. Deactivated assets can still be sold out of.
    let asset = get_asset(&mut tx, &symbol).await?;

    // 3. Lock the position and resolve how much to liquidate.
    let position = lock_position(&mut tx, user_id, asset.id)
        .await?
        .ok_or_else(|| TradeError::NoPosition(symbol.clone()))?;
    let to_sell = math::sell_quantity(amount, position.quantity)?;

    // 4. Price and quote; apply_sell rejects zero and oversized sells.
    let price = latest_price(&mut tx, asset.id)
        .await?
        .ok_or_else(|| TradeError::NoPriceData(symbol.clone()))?;
    let quote = math::quote_sell(to_sell, price, position.average_cost)?;
    let next = math::apply_sell(to_state(position.clone()), &quote)?;

    // 5. Credit the proceeds and persist the transition. A fully
    //    liquidated position is deleted, taking its realized gain
    //    history with it.
    let balance = user
        .coins
        .checked_add(quote.total)
        .ok_or(TradeError::Overflow)?;
    set_balance(&mut tx, user_id, balance).await?;
    let row = match next {
        Some(state) => Some(upsert_position(&mut tx, user_id, asset.id, &state).await?),
        None => {
            delete_position(&mut tx, position.id).await?;
            None
        }
    };
    let closed = row.is_none();

    tx.commit().await?;

    tracing::info!(
        user = %user.username,
        symbol = %symbol,
        price,
        quantity = quote.quantity,
        fee = quote.fee,
        profit_loss = quote.profit_loss,
        closed,
        "Sell executed"
    );
    counter!("sells_total").increment(1);
    if closed {
        gauge!("open_positions").decrement(1.0);
    }

    Ok(TradeResult {
        side: TradeSide::Sell,
        symbol,
        price,
        quantity: quote.quantity,
        subtotal: quote.subtotal,
        fee: quote.fee,
        total: quote.total,
        profit_loss: Some(quote.profit_loss),
        position: row,
        balance,
    })
}

// ---------------------------------------------------------------------------
// Transaction-scoped queries
// ---------------------------------------------------------------------------

async fn lock_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<User, TradeError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(TradeError::UserNotFound)
}

async fn get_asset(
    tx: &mut Transaction<'_, Postgres>,
    symbol: &str,
) -> Result<Asset, TradeError> {
    sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE symbol = $1")
        .bind(symbol)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| TradeError::AssetNotFound(symbol.to_string()))
}

async fn lock_position(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    asset_id: Uuid,
) -> Result<Option<Position>, TradeError> {
    let position = sqlx::query_as::<_, Position>(
        "SELECT * FROM positions WHERE user_id = $1 AND asset_id = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(asset_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(position)
}

async fn latest_price(
    tx: &mut Transaction<'_, Postgres>,
    asset_id: Uuid,
) -> Result<Option<i64>, TradeError> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        SELECT price FROM price_observations
        WHERE asset_id = $1
        ORDER BY observed_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(asset_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(|r| r.0))
}

async fn set_balance(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    coins: i64,
) -> Result<(), TradeError> {
    sqlx::query("UPDATE users SET coins = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(coins)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn upsert_position(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    asset_id: Uuid,
    state: &PositionState,
) -> Result<Position, TradeError> {
    let position = sqlx::query_as::<_, Position>(
        r#"
        INSERT INTO positions (user_id, asset_id, quantity, average_cost, total_invested, realized_gain)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id, asset_id) DO UPDATE
        SET quantity = EXCLUDED.quantity,
            average_cost = EXCLUDED.average_cost,
            total_invested = EXCLUDED.total_invested,
            realized_gain = EXCLUDED.realized_gain,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(asset_id)
    .bind(state.quantity)
    .bind(state.average_cost)
    .bind(state.total_invested)
    .bind(state.realized_gain)
    .fetch_one(&mut **tx)
    .await?;

    Ok(position)
}

async fn delete_position(
    tx: &mut Transaction<'_, Postgres>,
    position_id: Uuid,
) -> Result<(), TradeError> {
    sqlx::query("DELETE FROM positions WHERE id = $1")
        .bind(position_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

fn to_state(position: Position) -> PositionState {
    PositionState {
        quantity: position.quantity,
        average_cost: position.average_cost,
        total_invested: position.total_invested,
        realized_gain: position.realized_gain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_and_overflow_classified_as_infra() {
        assert!(infra_failure(&TradeError::Storage(sqlx::Error::RowNotFound)));
        assert!(infra_failure(&TradeError::Overflow));
    }

    #[test]
    fn test_business_rejections_not_classified_as_infra() {
        let rejections = [
            TradeError::UserNotFound,
            TradeError::AssetNotFound("ACME".into()),
            TradeError::AssetInactive("ACME".into()),
            TradeError::InvalidAmount("amount must be positive".into()),
            TradeError::BelowMinInvestment { amount: 5, minimum: 10 },
            TradeError::InsufficientFunds { required: 10, available: 5 },
            TradeError::NoPriceData("ACME".into()),
            TradeError::NoPosition("ACME".into()),
            TradeError::InvalidSellAmount("nothing to sell".into()),
        ];
        for e in rejections {
            assert!(!infra_failure(&e), "{e}");
        }
    }
}
