pub mod engine;
pub mod leaderboard;
pub mod math;
pub mod summary;

use thiserror::Error;

/// Everything that can go wrong inside the trading ledger.
///
/// Validation and business rejections leave state untouched; `Storage`
/// wraps infrastructure failures, after which the caller retries the
/// whole trade from the top (price may have moved between attempts).
#[derive(Debug, Error)]
pub enum TradeError {
    #[error("user not found")]
    UserNotFound,

    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("asset is not tradable: {0}")]
    AssetInactive(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("amount {amount} is below the minimum investment of {minimum}")]
    BelowMinInvestment { amount: i64, minimum: i64 },

    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("no price data for asset: {0}")]
    NoPriceData(String),

    #[error("no open position in {0}")]
    NoPosition(String),

    #[error("invalid sell amount: {0}")]
    InvalidSellAmount(String),

    #[error("arithmetic overflow in trade computation")]
    Overflow,

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}
