//! Fixed-point trade arithmetic.
//!
//! Prices and average costs are hundredths of a coin; quantities are
//! thousandths of a unit; coin amounts are plain integers. Every
//! division floors, and every operand stays non-negative, so integer
//! truncation and floor never diverge. Floats never touch money or
//! quantity.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::SellMode;

use super::TradeError;

/// Price scale: 1 coin = 100.
pub const PRICE_SCALE: i64 = 100;
/// Quantity scale: 1 unit = 1000.
pub const QTY_SCALE: i64 = 1_000;
/// quantity × price carries both scales; dividing by this yields coins.
pub const VALUE_DIVISOR: i64 = PRICE_SCALE * QTY_SCALE;
/// Trade fee, basis points (1.5%).
pub const FEE_BPS: i64 = 150;
pub const BPS_DIVISOR: i64 = 10_000;

/// floor(a * b / divisor) computed in i128 so the product cannot wrap.
/// Callers keep a, b ≥ 0 and divisor > 0.
fn mul_div_floor(a: i64, b: i64, divisor: i64) -> Result<i64, TradeError> {
    debug_assert!(a >= 0 && b >= 0 && divisor > 0);
    let q = (a as i128) * (b as i128) / (divisor as i128);
    i64::try_from(q).map_err(|_| TradeError::Overflow)
}

/// Coin value of a quantity at a price: floor(quantity * price / 100_000).
pub fn position_value(quantity: i64, price: i64) -> Result<i64, TradeError> {
    mul_div_floor(quantity, price, VALUE_DIVISOR)
}

/// Weighted-average cost: floor(total_invested * 100_000 / quantity).
/// Re-derived from the running totals on every buy so rounding error
/// cannot compound across a long buy history.
pub fn weighted_average_cost(total_invested: i64, quantity: i64) -> Result<i64, TradeError> {
    mul_div_floor(total_invested, VALUE_DIVISOR, quantity)
}

pub fn validate_buy_amount(amount: i64) -> Result<(), TradeError> {
    if amount <= 0 {
        return Err(TradeError::InvalidAmount("amount must be positive".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Buy
// ---------------------------------------------------------------------------

/// The money and quantity one buy moves, before it touches state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyQuote {
    /// Fee in coins, taken off the top of the requested spend.
    pub fee: i64,
    /// Coins left to convert after the fee.
    pub net_spend: i64,
    /// Quantity acquired, ×1000 scale.
    pub quantity: i64,
    /// Coin value of `quantity` at the trade price.
    pub subtotal: i64,
    /// Coins actually debited: subtotal + fee. Never exceeds the
    /// requested amount — rounding always favors the user.
    pub total: i64,
}

/// Price a buy of `amount` coins at `price`.
///
/// Rejects amounts that floor to zero quantity: charging a fee for an
/// empty fill would both take money for nothing and require persisting
/// a zero-quantity position, which the ledger never does.
pub fn quote_buy(amount: i64, price: i64) -> Result<BuyQuote, TradeError> {
    validate_buy_amount(amount)?;

    let fee = mul_div_floor(amount, FEE_BPS, BPS_DIVISOR)?;
    let net_spend = amount - fee;
    let quantity = mul_div_floor(net_spend, VALUE_DIVISOR, price)?;
    if quantity == 0 {
        return Err(TradeError::InvalidAmount(
            "amount too small to buy any quantity at the current price".into(),
        ));
    }
    let subtotal = mul_div_floor(quantity, price, VALUE_DIVISOR)?;
    let total = subtotal + fee;

    Ok(BuyQuote {
        fee,
        net_spend,
        quantity,
        subtotal,
        total,
    })
}

// ---------------------------------------------------------------------------
// Sell
// ---------------------------------------------------------------------------

/// Parsed, validated sell request value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellAmount {
    /// Whole percent, 1–100.
    Percentage(i64),
    /// Quantity in ×1000 milliunits.
    Quantity(i64),
    All,
}

/// Validate the wire-level sell value and convert it to integers.
///
/// Fractional unit quantities arrive as exact decimals ("2.5") and are
/// scaled to milliunits here, at the boundary; anything finer than the
/// quantity scale, or a non-integral percentage, is rejected. This is
/// the only place the ledger touches `Decimal`.
pub fn parse_sell_amount(mode: SellMode, value: Option<Decimal>) -> Result<SellAmount, TradeError> {
    match mode {
        SellMode::All => Ok(SellAmount::All),
        SellMode::Percentage => {
            let pct = value.ok_or_else(|| {
                TradeError::InvalidSellAmount("percentage mode requires a value".into())
            })?;
            if !pct.fract().is_zero() {
                return Err(TradeError::InvalidSellAmount(
                    "percentage must be a whole number".into(),
                ));
            }
            match pct.to_i64() {
                Some(p) if (1..=100).contains(&p) => Ok(SellAmount::Percentage(p)),
                _ => Err(TradeError::InvalidSellAmount(
                    "percentage must be between 1 and 100".into(),
                )),
            }
        }
        SellMode::Quantity => {
            let units = value.ok_or_else(|| {
                TradeError::InvalidSellAmount("quantity mode requires a value".into())
            })?;
            if units <= Decimal::ZERO {
                return Err(TradeError::InvalidSellAmount(
                    "quantity must be positive".into(),
                ));
            }
            let scaled = units
                .checked_mul(Decimal::from(QTY_SCALE))
                .ok_or_else(|| {
                    TradeError::InvalidSellAmount("quantity out of range".into())
                })?;
            if !scaled.fract().is_zero() {
                return Err(TradeError::InvalidSellAmount(
                    "quantity supports at most 3 decimal places".into(),
                ));
            }
            scaled
                .to_i64()
                .map(SellAmount::Quantity)
                .ok_or(TradeError::Overflow)
        }
    }
}

/// Derive the ×1000 quantity a sell liquidates from a holding of `held`.
pub fn sell_quantity(amount: SellAmount, held: i64) -> Result<i64, TradeError> {
    match amount {
        SellAmount::Percentage(pct) => mul_div_floor(held, pct, 100),
        SellAmount::Quantity(milli) => Ok(milli),
        SellAmount::All => Ok(held),
    }
}

/// The money one sell moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellQuote {
    /// Quantity liquidated, ×1000 scale.
    pub quantity: i64,
    /// Coin value of `quantity` at the trade price.
    pub subtotal: i64,
    /// Fee in coins, deducted from the proceeds.
    pub fee: i64,
    /// Coins credited: subtotal - fee.
    pub total: i64,
    /// Coin cost of the sold share at the position's average cost.
    pub cost_basis: i64,
    /// total - cost_basis; negative on a losing sale.
    pub profit_loss: i64,
}

/// Price a sell of `quantity_to_sell` at `price` against a position
/// carried at `average_cost`.
pub fn quote_sell(
    quantity_to_sell: i64,
    price: i64,
    average_cost: i64,
) -> Result<SellQuote, TradeError> {
    let subtotal = mul_div_floor(quantity_to_sell, price, VALUE_DIVISOR)?;
    let fee = mul_div_floor(subtotal, FEE_BPS, BPS_DIVISOR)?;
    let total = subtotal - fee;
    let cost_basis = mul_div_floor(quantity_to_sell, average_cost, VALUE_DIVISOR)?;
    let profit_loss = total - cost_basis;

    Ok(SellQuote {
        quantity: quantity_to_sell,
        subtotal,
        fee,
        total,
        cost_basis,
        profit_loss,
    })
}

// ---------------------------------------------------------------------------
// Position transitions
// ---------------------------------------------------------------------------

/// The ledger-facing slice of a position row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionState {
    pub quantity: i64,
    pub average_cost: i64,
    pub total_invested: i64,
    pub realized_gain: i64,
}

/// Fold a buy into a position.
///
/// First buy seeds the average cost at the trade price; later buys
/// re-derive it from the running totals (invested ×100_000 / quantity),
/// never by blending the old average.
pub fn apply_buy(
    existing: Option<PositionState>,
    quote: &BuyQuote,
    price: i64,
) -> Result<PositionState, TradeError> {
    match existing {
        None => Ok(PositionState {
            quantity: quote.quantity,
            average_cost: price,
            total_invested: quote.subtotal,
            realized_gain: 0,
        }),
        Some(pos) => {
            let quantity = pos
                .quantity
                .checked_add(quote.quantity)
                .ok_or(TradeError::Overflow)?;
            let total_invested = pos
                .total_invested
                .checked_add(quote.subtotal)
                .ok_or(TradeError::Overflow)?;
            let average_cost = weighted_average_cost(total_invested, quantity)?;

            Ok(PositionState {
                quantity,
                average_cost,
                total_invested,
                realized_gain: pos.realized_gain,
            })
        }
    }
}

/// Fold a sell into a position. Returns the surviving position, or None
/// when the holding was fully liquidated — the row (and its realized
/// gain) is dropped in that case.
///
/// On a partial sell the remaining cost basis is recomputed from the
/// remaining quantity at the unchanged average cost, so the invariant
/// total_invested == floor(quantity * average_cost / 100_000) holds
/// under floor rounding instead of drifting from plain subtraction.
pub fn apply_sell(
    position: PositionState,
    quote: &SellQuote,
) -> Result<Option<PositionState>, TradeError> {
    if quote.quantity == 0 {
        return Err(TradeError::InvalidSellAmount("nothing to sell".into()));
    }
    if quote.quantity > position.quantity {
        return Err(TradeError::InvalidSellAmount(
            "sell quantity exceeds holdings".into(),
        ));
    }

    let remaining = position.quantity - quote.quantity;
    if remaining == 0 {
        return Ok(None);
    }

    let total_invested = mul_div_floor(remaining, position.average_cost, VALUE_DIVISOR)?;
    let realized_gain = position
        .realized_gain
        .checked_add(quote.profit_loss)
        .ok_or(TradeError::Overflow)?;

    Ok(Some(PositionState {
        quantity: remaining,
        average_cost: position.average_cost,
        total_invested,
        realized_gain,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
