//! Service configuration

use serde::{Deserialize, Serialize};

use crate::portfolio::aggregate::DEFAULT_PORTFOLIO_NAME;

/// Tunables for the portfolio service actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Display name given to auto-provisioned portfolios
    pub default_portfolio_name: String,
    /// Capacity of the command channel between handles and the actor
    pub command_channel_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_portfolio_name: DEFAULT_PORTFOLIO_NAME.to_string(),
            command_channel_capacity: 100,
        }
    }
}
