pub mod config;
pub mod errors;
pub mod logging;
pub mod portfolio;

pub use config::ServiceConfig;
pub use errors::PortfolioError;
pub use portfolio::{
    start_portfolio_service, InMemoryPortfolioRepository, PerformanceSummary, Portfolio,
    PortfolioRepository, PortfolioServiceHandle, Position, PositionDelta, PriceUpdate,
};
