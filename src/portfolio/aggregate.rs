//! Portfolio aggregate: weighted-average-cost position ledger
//!
//! Owns a user's positions and keeps the derived valuation fields consistent
//! after every mutation. All operations run to completion synchronously; the
//! aggregate performs no locking and assumes exclusive access for the duration
//! of a call (serialization is the service layer's job).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::PortfolioError;
use crate::portfolio::types::{PerformanceSummary, Position, PositionDelta, PriceUpdate};

/// Display name used when the caller does not supply one
pub const DEFAULT_PORTFOLIO_NAME: &str = "Main Portfolio";

/// A user's portfolio of weighted-average-cost positions.
///
/// Fields are private so the derived totals can only change through the
/// operations that recalculate them; at most one position exists per asset id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    id: String,
    owner_id: String,
    name: String,
    positions: Vec<Position>,
    total_value: Decimal,
    total_invested: Decimal,
    total_return: Decimal,
    return_percentage: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Portfolio {
    /// Create an empty portfolio for a user
    pub fn new(owner_id: impl Into<String>, name: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name: name.unwrap_or(DEFAULT_PORTFOLIO_NAME).to_string(),
            positions: Vec::new(),
            total_value: Decimal::ZERO,
            total_invested: Decimal::ZERO,
            total_return: Decimal::ZERO,
            return_percentage: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn total_value(&self) -> Decimal {
        self.total_value
    }

    pub fn total_invested(&self) -> Decimal {
        self.total_invested
    }

    pub fn total_return(&self) -> Decimal {
        self.total_return
    }

    pub fn return_percentage(&self) -> Decimal {
        self.return_percentage
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Merge buy activity into the portfolio.
    ///
    /// Opens a new position on first buy of an asset; otherwise recomputes the
    /// weighted average cost from the currently stored quantity/price and the
    /// incoming delta. The position's `current_price` is not touched by a buy,
    /// so `market_value` is refreshed against the price it already has.
    pub fn add_position(&mut self, delta: &PositionDelta) -> Result<(), PortfolioError> {
        Self::validate_delta(delta)?;

        match self
            .positions
            .iter_mut()
            .find(|p| p.asset_id == delta.asset_id)
        {
            Some(position) => {
                let merged_quantity = position.quantity + delta.quantity;
                position.average_price = (position.quantity * position.average_price
                    + delta.quantity * delta.price)
                    / merged_quantity;
                position.quantity = merged_quantity;
                position.market_value = position.quantity * position.current_price;
                position.updated_at = Utc::now();
            }
            None => self.positions.push(Position::new(delta)),
        }

        self.recalculate();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove quantity from a position, pruning it when fully sold.
    ///
    /// A sell leaves `average_price` and `current_price` alone; only the held
    /// quantity shrinks. Selling exactly the held quantity deletes the
    /// position rather than keeping a zero-quantity record.
    pub fn remove_position(
        &mut self,
        asset_id: &str,
        quantity: Decimal,
    ) -> Result<(), PortfolioError> {
        if quantity <= Decimal::ZERO {
            return Err(PortfolioError::InvalidArgument(
                "quantity must be greater than zero".to_string(),
            ));
        }

        let index = self
            .positions
            .iter()
            .position(|p| p.asset_id == asset_id)
            .ok_or_else(|| PortfolioError::PositionNotFound {
                asset_id: asset_id.to_string(),
            })?;

        let held = self.positions[index].quantity;
        if quantity > held {
            return Err(PortfolioError::InsufficientQuantity {
                asset_id: asset_id.to_string(),
                requested: quantity,
                held,
            });
        }

        if quantity == held {
            self.positions.remove(index);
        } else {
            let position = &mut self.positions[index];
            position.quantity -= quantity;
            position.market_value = position.quantity * position.current_price;
            position.updated_at = Utc::now();
        }

        self.recalculate();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Apply market price events.
    ///
    /// Entries with no matching position are ignored; this never fails.
    /// Aggregates are recalculated once after all entries are processed.
    pub fn update_prices(&mut self, updates: &[PriceUpdate]) {
        for update in updates {
            if let Some(position) = self
                .positions
                .iter_mut()
                .find(|p| p.asset_id == update.asset_id)
            {
                position.set_current_price(update.price);
            }
        }

        self.recalculate();
        self.updated_at = Utc::now();
    }

    /// Position held for an asset, if any
    pub fn position_by_asset(&self, asset_id: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.asset_id == asset_id)
    }

    /// Percentage of total market value per asset type.
    ///
    /// Empty when the portfolio holds no value, so callers never see a
    /// division-by-zero artifact.
    pub fn diversification(&self) -> HashMap<String, Decimal> {
        let mut by_type = HashMap::new();
        if self.total_value.is_zero() {
            return by_type;
        }

        for position in &self.positions {
            let share = (position.market_value / self.total_value) * Decimal::from(100);
            *by_type
                .entry(position.asset_type.clone())
                .or_insert(Decimal::ZERO) += share;
        }
        by_type
    }

    /// Snapshot of the derived valuation fields plus diversification
    pub fn performance(&self) -> PerformanceSummary {
        PerformanceSummary {
            total_value: self.total_value,
            total_invested: self.total_invested,
            total_return: self.total_return,
            return_percentage: self.return_percentage,
            diversification: self.diversification(),
            positions_count: self.positions.len(),
        }
    }

    fn validate_delta(delta: &PositionDelta) -> Result<(), PortfolioError> {
        if delta.asset_id.is_empty() {
            return Err(PortfolioError::InvalidArgument(
                "asset id is required".to_string(),
            ));
        }
        if delta.asset_type.is_empty() {
            return Err(PortfolioError::InvalidArgument(
                "asset type is required".to_string(),
            ));
        }
        if delta.quantity <= Decimal::ZERO {
            return Err(PortfolioError::InvalidArgument(
                "quantity must be greater than zero".to_string(),
            ));
        }
        if delta.price <= Decimal::ZERO {
            return Err(PortfolioError::InvalidArgument(
                "price must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn recalculate(&mut self) {
        self.total_value = self
            .positions
            .iter()
            .map(|p| p.quantity * p.current_price)
            .sum();
        self.total_invested = self
            .positions
            .iter()
            .map(|p| p.quantity * p.average_price)
            .sum();
        self.total_return = self.total_value - self.total_invested;
        self.return_percentage = if self.total_invested > Decimal::ZERO {
            (self.total_return / self.total_invested) * Decimal::from(100)
        } else {
            Decimal::ZERO
        };
    }
}
