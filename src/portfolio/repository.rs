//! Portfolio persistence abstraction
//!
//! The service treats each repository call as atomic; transactional behavior
//! across aggregates is out of scope. The in-memory implementation backs the
//! demo deployment and tests.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use crate::portfolio::aggregate::Portfolio;

/// Stores and retrieves portfolios by id or owning user
#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    /// Persist the portfolio, replacing any previous state under its id
    async fn save(&self, portfolio: Portfolio) -> Result<Portfolio>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Portfolio>>;

    /// A user owns at most one portfolio
    async fn find_by_owner(&self, owner_id: &str) -> Result<Option<Portfolio>>;

    async fn find_all(&self) -> Result<Vec<Portfolio>>;

    /// Returns whether a portfolio existed under the id
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Process-memory repository keyed by portfolio id
#[derive(Default)]
pub struct InMemoryPortfolioRepository {
    portfolios: DashMap<String, Portfolio>,
}

impl InMemoryPortfolioRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortfolioRepository for InMemoryPortfolioRepository {
    async fn save(&self, portfolio: Portfolio) -> Result<Portfolio> {
        self.portfolios
            .insert(portfolio.id().to_string(), portfolio.clone());
        Ok(portfolio)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Portfolio>> {
        Ok(self.portfolios.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Option<Portfolio>> {
        Ok(self
            .portfolios
            .iter()
            .find(|entry| entry.value().owner_id() == owner_id)
            .map(|entry| entry.value().clone()))
    }

    async fn find_all(&self) -> Result<Vec<Portfolio>> {
        Ok(self
            .portfolios
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.portfolios.remove(id).is_some())
    }
}
