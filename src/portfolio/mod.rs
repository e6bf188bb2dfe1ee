//! Portfolio position ledger
//!
//! This module owns the weighted-average-cost position ledger:
//! - **Aggregate**: merge buys, sell down positions, recompute valuation
//! - **Repository**: persistence abstraction plus the in-memory backend
//! - **Service**: command-loop actor serializing access per owner
//! - **Types**: positions, deltas, price events, performance read model

pub mod aggregate;
pub mod repository;
pub mod service;
pub mod types;

pub use aggregate::{Portfolio, DEFAULT_PORTFOLIO_NAME};
pub use repository::{InMemoryPortfolioRepository, PortfolioRepository};
pub use service::{start_portfolio_service, PortfolioCommand, PortfolioServiceHandle};
pub use types::{PerformanceSummary, Position, PositionDelta, PriceUpdate};
