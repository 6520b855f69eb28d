//! Portfolio aggregation over open positions.

use serde::Serialize;

use crate::models::PositionValuation;

use super::math::position_value;
use super::TradeError;

/// Totals across one user's open positions. Coin fields keep the
/// ledger's integer scales; only the profit ratio is a float, and it is
/// never fed back into balances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    /// Coins currently tied up in open positions.
    pub total_invested: i64,
    /// Open positions marked to the latest observed prices.
    pub current_value: i64,
    /// Profit already banked by partial sells on still-open positions.
    pub realized_gains: i64,
    /// current_value - total_invested.
    pub unrealized_gains: i64,
    /// realized_gains + unrealized_gains.
    pub total_profit: i64,
    /// total_profit / total_invested, as a percentage. Zero when
    /// nothing is invested.
    pub profit_percent: f64,
    pub holdings_count: usize,
}

impl PortfolioSummary {
    /// The all-zero summary of a user with no open positions.
    pub fn empty() -> Self {
        Self {
            total_invested: 0,
            current_value: 0,
            realized_gains: 0,
            unrealized_gains: 0,
            total_profit: 0,
            profit_percent: 0.0,
            holdings_count: 0,
        }
    }
}

/// Aggregate one user's open positions into a summary.
///
/// A position whose asset has no recorded price cannot be marked to
/// market; the whole summary fails with `NoPriceData` rather than
/// silently valuing the holding at zero.
pub fn summarize(positions: &[PositionValuation]) -> Result<PortfolioSummary, TradeError> {
    if positions.is_empty() {
        return Ok(PortfolioSummary::empty());
    }

    let mut total_invested: i64 = 0;
    let mut current_value: i64 = 0;
    let mut realized_gains: i64 = 0;

    for pos in positions {
        let price = pos
            .current_price
            .ok_or_else(|| TradeError::NoPriceData(pos.symbol.clone()))?;
        let value = position_value(pos.quantity, price)?;

        total_invested = total_invested
            .checked_add(pos.total_invested)
            .ok_or(TradeError::Overflow)?;
        current_value = current_value
            .checked_add(value)
            .ok_or(TradeError::Overflow)?;
        realized_gains = realized_gains
            .checked_add(pos.realized_gain)
            .ok_or(TradeError::Overflow)?;
    }

    let unrealized_gains = current_value - total_invested;
    let total_profit = realized_gains + unrealized_gains;
    let profit_percent = if total_invested > 0 {
        total_profit as f64 / total_invested as f64 * 100.0
    } else {
        0.0
    };

    Ok(PortfolioSummary {
        total_invested,
        current_value,
        realized_gains,
        unrealized_gains,
        total_profit,
        profit_percent,
        holdings_count: positions.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn valuation(
        symbol: &str,
        quantity: i64,
        average_cost: i64,
        total_invested: i64,
        realized_gain: i64,
        current_price: Option<i64>,
    ) -> PositionValuation {
        PositionValuation {
            user_id: Uuid::new_v4(),
            username: "ada".to_string(),
            symbol: symbol.to_string(),
            quantity,
            average_cost,
            total_invested,
            realized_gain,
            current_price,
        }
    }

    #[test]
    fn test_empty_portfolio_is_all_zeros() {
        let summary = summarize(&[]).unwrap();
        assert_eq!(summary.total_invested, 0);
        assert_eq!(summary.current_value, 0);
        assert_eq!(summary.realized_gains, 0);
        assert_eq!(summary.unrealized_gains, 0);
        assert_eq!(summary.total_profit, 0);
        assert_eq!(summary.profit_percent, 0.0);
        assert_eq!(summary.holdings_count, 0);
    }

    #[test]
    fn test_single_position_marked_to_market() {
        // 34.475 units at avg 85.71, invested 2955, price now 120.00
        let rows = vec![valuation("ACME", 34_475, 8_571, 2_955, 0, Some(12_000))];
        let summary = summarize(&rows).unwrap();

        assert_eq!(summary.total_invested, 2_955);
        assert_eq!(summary.current_value, 4_137);
        assert_eq!(summary.unrealized_gains, 1_182);
        assert_eq!(summary.realized_gains, 0);
        assert_eq!(summary.total_profit, 1_182);
        assert_eq!(summary.holdings_count, 1);
        assert!((summary.profit_percent - 40.0).abs() < 0.01);
    }

    #[test]
    fn test_realized_and_unrealized_combine() {
        // Post-sell state of the worked three-trade sequence.
        let rows = vec![valuation("ACME", 17_238, 8_571, 1_477, 560, Some(12_000))];
        let summary = summarize(&rows).unwrap();

        assert_eq!(summary.total_invested, 1_477);
        assert_eq!(summary.current_value, 2_068);
        assert_eq!(summary.unrealized_gains, 591);
        assert_eq!(summary.realized_gains, 560);
        assert_eq!(summary.total_profit, 1_151);
    }

    #[test]
    fn test_multiple_positions_sum() {
        let rows = vec![
            valuation("ACME", 10_000, 10_000, 1_000, 0, Some(11_000)),
            valuation("NOVA", 5_000, 20_000, 1_000, -50, Some(18_000)),
        ];
        let summary = summarize(&rows).unwrap();

        assert_eq!(summary.total_invested, 2_000);
        assert_eq!(summary.current_value, 1_100 + 900);
        assert_eq!(summary.unrealized_gains, 0);
        assert_eq!(summary.realized_gains, -50);
        assert_eq!(summary.total_profit, -50);
        assert_eq!(summary.holdings_count, 2);
        assert!((summary.profit_percent - (-2.5)).abs() < 0.01);
    }

    #[test]
    fn test_missing_price_fails_loudly() {
        let rows = vec![
            valuation("ACME", 10_000, 10_000, 1_000, 0, Some(11_000)),
            valuation("NOVA", 5_000, 20_000, 1_000, 0, None),
        ];
        match summarize(&rows) {
            Err(TradeError::NoPriceData(symbol)) => assert_eq!(symbol, "NOVA"),
            other => panic!("expected NoPriceData, got {other:?}"),
        }
    }

    #[test]
    fn test_underwater_portfolio_reports_negative_percent() {
        let rows = vec![valuation("BITZ", 10_000, 10_000, 1_000, 0, Some(5_000))];
        let summary = summarize(&rows).unwrap();
        assert_eq!(summary.total_profit, -500);
        assert!((summary.profit_percent - (-50.0)).abs() < 0.01);
    }

    #[test]
    fn test_zero_invested_holding_reports_zero_percent() {
        // A dust remainder can carry quantity while its basis floors to
        // zero; the percent guard must yield 0, never divide.
        let rows = vec![valuation("DOGEY", 1, 10_000, 0, 0, Some(10_000))];
        let summary = summarize(&rows).unwrap();
        assert_eq!(summary.total_invested, 0);
        assert_eq!(summary.holdings_count, 1);
        assert_eq!(summary.profit_percent, 0.0);
    }
}
