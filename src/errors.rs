//! Typed errors for portfolio ledger operations

use rust_decimal::Decimal;
use thiserror::Error;

/// Failures surfaced by portfolio mutations.
///
/// Every mutating operation is all-or-nothing: when one of these is returned,
/// the portfolio and its positions are unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortfolioError {
    /// Position payload rejected before any mutation was applied
    #[error("invalid position data: {0}")]
    InvalidArgument(String),

    /// No position held for the requested asset
    #[error("no position found for asset {asset_id}")]
    PositionNotFound { asset_id: String },

    /// Requested sell quantity exceeds the held quantity
    #[error("insufficient quantity for asset {asset_id}: requested {requested}, held {held}")]
    InsufficientQuantity {
        asset_id: String,
        requested: Decimal,
        held: Decimal,
    },
}
