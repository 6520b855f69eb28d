//! All-user ranking over open positions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::PositionValuation;

use super::summary::{summarize, PortfolioSummary};
use super::TradeError;

pub const MAX_LIMIT: usize = 100;

/// Which summary figure the board sorts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardMetric {
    #[default]
    TotalProfit,
    TotalValue,
    ProfitPercent,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: Uuid,
    pub username: String,
    /// The sorted metric, as a display value. Coin metrics are exact
    /// integers rendered through f64; ranking itself compares the
    /// integer totals.
    pub metric_value: f64,
}

struct Contender {
    user_id: Uuid,
    username: String,
    summary: PortfolioSummary,
}

/// Rank every user holding at least one open position.
///
/// Positions arrive in a stable read order; users keep that order among
/// themselves on metric ties.
pub fn rank(
    positions: &[PositionValuation],
    metric: LeaderboardMetric,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>, TradeError> {
    if limit == 0 || limit > MAX_LIMIT {
        return Err(TradeError::InvalidAmount(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    // Group by user without disturbing read order.
    let mut by_user: Vec<(Uuid, String, Vec<&PositionValuation>)> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    for pos in positions {
        match index.get(&pos.user_id) {
            Some(&i) => by_user[i].2.push(pos),
            None => {
                index.insert(pos.user_id, by_user.len());
                by_user.push((pos.user_id, pos.username.clone(), vec![pos]));
            }
        }
    }

    let mut contenders = Vec::with_capacity(by_user.len());
    for (user_id, username, rows) in by_user {
        let owned: Vec<PositionValuation> = rows.into_iter().cloned().collect();
        contenders.push(Contender {
            user_id,
            username,
            summary: summarize(&owned)?,
        });
    }

    // Stable sort: equal keys keep their read order.
    contenders.sort_by(|a, b| match metric {
        LeaderboardMetric::TotalProfit => b.summary.total_profit.cmp(&a.summary.total_profit),
        LeaderboardMetric::TotalValue => b.summary.current_value.cmp(&a.summary.current_value),
        LeaderboardMetric::ProfitPercent => {
            b.summary.profit_percent.total_cmp(&a.summary.profit_percent)
        }
    });
    contenders.truncate(limit);

    Ok(contenders
        .into_iter()
        .enumerate()
        .map(|(i, c)| LeaderboardEntry {
            rank: i as i64 + 1,
            user_id: c.user_id,
            username: c.username,
            metric_value: match metric {
                LeaderboardMetric::TotalProfit => c.summary.total_profit as f64,
                LeaderboardMetric::TotalValue => c.summary.current_value as f64,
                LeaderboardMetric::ProfitPercent => c.summary.profit_percent,
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valuation(
        user_id: Uuid,
        username: &str,
        symbol: &str,
        quantity: i64,
        total_invested: i64,
        realized_gain: i64,
        current_price: i64,
    ) -> PositionValuation {
        PositionValuation {
            user_id,
            username: username.to_string(),
            symbol: symbol.to_string(),
            quantity,
            average_cost: 10_000,
            total_invested,
            realized_gain,
            current_price: Some(current_price),
        }
    }

    #[test]
    fn test_ranks_by_total_profit_descending() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            // profit: (11000*10000/100_000=1100) - 1000 = 100
            valuation(a, "ada", "ACME", 10_000, 1_000, 0, 11_000),
            // profit: 500 - 1000 = -500
            valuation(b, "bob", "ACME", 10_000, 1_000, 0, 5_000),
            // profit: 1000 - 1000 + 700 realized = 700
            valuation(c, "cyd", "ACME", 10_000, 1_000, 700, 10_000),
        ];

        let board = rank(&rows, LeaderboardMetric::TotalProfit, 10).unwrap();
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].username, "cyd");
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].metric_value, 700.0);
        assert_eq!(board[1].username, "ada");
        assert_eq!(board[1].rank, 2);
        assert_eq!(board[2].username, "bob");
        assert_eq!(board[2].rank, 3);
    }

    #[test]
    fn test_ranks_by_total_value() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            valuation(a, "ada", "ACME", 10_000, 1_000, 0, 5_000), // value 500
            valuation(b, "bob", "ACME", 10_000, 1_000, 0, 20_000), // value 2000
        ];

        let board = rank(&rows, LeaderboardMetric::TotalValue, 10).unwrap();
        assert_eq!(board[0].username, "bob");
        assert_eq!(board[0].metric_value, 2_000.0);
        assert_eq!(board[1].username, "ada");
    }

    #[test]
    fn test_percent_metric_favors_ratio_over_absolute() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            // +1000 on 100_000 invested: 1%
            valuation(a, "whale", "ACME", 1_000_000, 100_000, 0, 10_100),
            // +10 on 100 invested: 10%
            valuation(b, "minnow", "ACME", 1_000, 100, 0, 11_000),
        ];

        let by_profit = rank(&rows, LeaderboardMetric::TotalProfit, 10).unwrap();
        assert_eq!(by_profit[0].username, "whale");

        let by_percent = rank(&rows, LeaderboardMetric::ProfitPercent, 10).unwrap();
        assert_eq!(by_percent[0].username, "minnow");
        assert!((by_percent[0].metric_value - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_positions_grouped_per_user() {
        let a = Uuid::new_v4();
        let rows = vec![
            valuation(a, "ada", "ACME", 10_000, 1_000, 0, 11_000),
            valuation(a, "ada", "NOVA", 10_000, 1_000, 0, 9_000),
        ];

        let board = rank(&rows, LeaderboardMetric::TotalProfit, 10).unwrap();
        assert_eq!(board.len(), 1);
        // 1100 + 900 value against 2000 invested
        assert_eq!(board[0].metric_value, 0.0);
    }

    #[test]
    fn test_ties_keep_read_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            valuation(a, "first", "ACME", 10_000, 1_000, 0, 10_000),
            valuation(b, "second", "ACME", 10_000, 1_000, 0, 10_000),
        ];

        let board = rank(&rows, LeaderboardMetric::TotalProfit, 10).unwrap();
        assert_eq!(board[0].username, "first");
        assert_eq!(board[1].username, "second");
    }

    #[test]
    fn test_truncates_to_limit() {
        let rows: Vec<PositionValuation> = (0..5)
            .map(|i| {
                valuation(
                    Uuid::new_v4(),
                    &format!("user{i}"),
                    "ACME",
                    10_000,
                    1_000,
                    i * 100,
                    10_000,
                )
            })
            .collect();

        let board = rank(&rows, LeaderboardMetric::TotalProfit, 2).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].username, "user4");
        assert_eq!(board[1].rank, 2);
    }

    #[test]
    fn test_limit_out_of_range_rejected() {
        for bad in [0, MAX_LIMIT + 1] {
            assert!(matches!(
                rank(&[], LeaderboardMetric::TotalProfit, bad),
                Err(TradeError::InvalidAmount(_))
            ));
        }
    }

    #[test]
    fn test_zero_invested_contender_ranks_at_zero_percent() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            // Dust position with a floored-to-zero basis.
            valuation(a, "dusty", "ACME", 1, 0, 0, 10_000),
            valuation(b, "earner", "ACME", 10_000, 1_000, 0, 11_000),
        ];

        let board = rank(&rows, LeaderboardMetric::ProfitPercent, 10).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].username, "earner");
        assert_eq!(board[1].username, "dusty");
        assert_eq!(board[1].metric_value, 0.0);
    }

    #[test]
    fn test_missing_price_propagates() {
        let a = Uuid::new_v4();
        let mut row = valuation(a, "ada", "ACME", 10_000, 1_000, 0, 10_000);
        row.current_price = None;
        assert!(matches!(
            rank(&[row], LeaderboardMetric::TotalProfit, 10),
            Err(TradeError::NoPriceData(_))
        ));
    }

    #[test]
    fn test_empty_board() {
        let board = rank(&[], LeaderboardMetric::TotalProfit, 10).unwrap();
        assert!(board.is_empty());
    }

    #[test]
    fn test_metric_parses_from_snake_case() {
        let m: LeaderboardMetric = serde_json::from_str("\"profit_percent\"").unwrap();
        assert_eq!(m, LeaderboardMetric::ProfitPercent);
        assert_eq!(LeaderboardMetric::default(), LeaderboardMetric::TotalProfit);
    }
}
