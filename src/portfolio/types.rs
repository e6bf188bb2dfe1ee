//! Portfolio type definitions with strong typing

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Holding of a single asset within a portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub asset_id: String,
    pub asset_type: String,
    pub quantity: Decimal,
    /// Weighted average cost basis across all buys; untouched by price updates
    pub average_price: Decimal,
    /// Last known market price, set only by explicit price-update events
    pub current_price: Decimal,
    pub market_value: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Position {
    /// Open a new position from the first buy of an asset
    pub fn new(delta: &PositionDelta) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            asset_id: delta.asset_id.clone(),
            asset_type: delta.asset_type.clone(),
            quantity: delta.quantity,
            average_price: delta.price,
            current_price: delta.price,
            market_value: delta.quantity * delta.price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Cost basis of the held quantity
    pub fn invested(&self) -> Decimal {
        self.quantity * self.average_price
    }

    /// Unrealized return against the remaining average cost
    pub fn unrealized_return(&self) -> Decimal {
        self.market_value - self.invested()
    }

    /// Apply a market price, keeping `market_value` consistent
    pub(crate) fn set_current_price(&mut self, price: Decimal) {
        self.current_price = price;
        self.market_value = self.quantity * price;
        self.updated_at = Utc::now();
    }
}

/// Buy activity to merge into a portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionDelta {
    pub asset_id: String,
    pub asset_type: String,
    pub quantity: Decimal,
    pub price: Decimal,
}

/// Market price event for a single asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub asset_id: String,
    pub price: Decimal,
}

/// Aggregate performance read model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_value: Decimal,
    pub total_invested: Decimal,
    pub total_return: Decimal,
    pub return_percentage: Decimal,
    /// Percentage of total market value contributed by each asset type
    pub diversification: HashMap<String, Decimal>,
    pub positions_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn delta(quantity: Decimal, price: Decimal) -> PositionDelta {
        PositionDelta {
            asset_id: "ASSET001".to_string(),
            asset_type: "STOCKS".to_string(),
            quantity,
            price,
        }
    }

    #[test]
    fn new_position_prices_from_delta() {
        let position = Position::new(&delta(dec!(100), dec!(50)));

        assert_eq!(position.quantity, dec!(100));
        assert_eq!(position.average_price, dec!(50));
        assert_eq!(position.current_price, dec!(50));
        assert_eq!(position.market_value, dec!(5000));
        assert_eq!(position.invested(), dec!(5000));
        assert_eq!(position.unrealized_return(), dec!(0));
    }

    #[test]
    fn price_update_keeps_market_value_consistent() {
        let mut position = Position::new(&delta(dec!(100), dec!(50)));
        position.set_current_price(dec!(60));

        assert_eq!(position.average_price, dec!(50));
        assert_eq!(position.current_price, dec!(60));
        assert_eq!(position.market_value, dec!(6000));
        assert_eq!(position.unrealized_return(), dec!(1000));
    }
}
