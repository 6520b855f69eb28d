use serde::{Deserialize, Serialize};

use super::{Position, TradeSide};

/// How a sell request names the quantity to liquidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellMode {
    /// 1–100 percent of the current holding.
    Percentage,
    /// Units of the asset, up to three decimal places.
    Quantity,
    /// The entire holding.
    All,
}

/// Outcome of one executed buy or sell. Ephemeral — returned to the
/// caller, never persisted.
///
/// `quantity` is thousandths of a unit; `subtotal`, `fee`, `total`,
/// `profit_loss`, and `balance` are whole coins. `position` is None
/// when the sell closed the position.
#[derive(Debug, Clone, Serialize)]
pub struct TradeResult {
    pub side: TradeSide,
    pub symbol: String,
    pub price: i64,
    pub quantity: i64,
    pub subtotal: i64,
    pub fee: i64,
    pub total: i64,
    pub profit_loss: Option<i64>,
    pub position: Option<Position>,
    pub balance: i64,
}
