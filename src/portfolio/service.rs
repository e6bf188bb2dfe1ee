//! Portfolio service actor with channel-based communication
//!
//! All portfolio operations flow through a message-passing interface. Every
//! command, for every owner, is handled to completion by the single actor
//! loop, so mutations against the same portfolio are serialized without any
//! locking inside the aggregate.

use anyhow::{bail, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::portfolio::aggregate::Portfolio;
use crate::portfolio::repository::PortfolioRepository;
use crate::portfolio::types::{PerformanceSummary, Position, PositionDelta, PriceUpdate};

/// Portfolio service commands
#[derive(Debug)]
pub enum PortfolioCommand {
    Create {
        owner_id: String,
        name: Option<String>,
        response: oneshot::Sender<Result<Portfolio>>,
    },
    GetOrCreate {
        owner_id: String,
        response: oneshot::Sender<Result<Portfolio>>,
    },
    AddPosition {
        owner_id: String,
        delta: PositionDelta,
        response: oneshot::Sender<Result<Portfolio>>,
    },
    RemovePosition {
        owner_id: String,
        asset_id: String,
        quantity: Decimal,
        response: oneshot::Sender<Result<Portfolio>>,
    },
    UpdatePrices {
        owner_id: String,
        updates: Vec<PriceUpdate>,
        response: oneshot::Sender<Result<Portfolio>>,
    },
    GetPerformance {
        owner_id: String,
        response: oneshot::Sender<Result<PerformanceSummary>>,
    },
    GetPosition {
        owner_id: String,
        asset_id: String,
        response: oneshot::Sender<Result<Option<Position>>>,
    },
}

/// Portfolio service actor
pub struct PortfolioService {
    repository: Arc<dyn PortfolioRepository>,
    config: ServiceConfig,
    command_rx: mpsc::Receiver<PortfolioCommand>,
}

impl PortfolioService {
    pub fn new(
        repository: Arc<dyn PortfolioRepository>,
        config: ServiceConfig,
        command_rx: mpsc::Receiver<PortfolioCommand>,
    ) -> Self {
        Self {
            repository,
            config,
            command_rx,
        }
    }

    /// Drain commands until every handle is dropped
    pub async fn run(mut self) -> Result<()> {
        info!("Starting portfolio service");

        while let Some(command) = self.command_rx.recv().await {
            self.handle_command(command).await;
        }

        info!("Command channel closed, stopping portfolio service");
        Ok(())
    }

    async fn handle_command(&self, command: PortfolioCommand) {
        match command {
            PortfolioCommand::Create {
                owner_id,
                name,
                response,
            } => {
                let result = self.create(&owner_id, name).await;
                if let Err(e) = &result {
                    error!("Failed to create portfolio for {}: {}", owner_id, e);
                }
                let _ = response.send(result);
            }

            PortfolioCommand::GetOrCreate { owner_id, response } => {
                let result = self.get_or_create(&owner_id).await;
                if let Err(e) = &result {
                    error!("Failed to load portfolio for {}: {}", owner_id, e);
                }
                let _ = response.send(result);
            }

            PortfolioCommand::AddPosition {
                owner_id,
                delta,
                response,
            } => {
                let result = self.add_position(&owner_id, delta).await;
                if let Err(e) = &result {
                    error!("Failed to add position for {}: {}", owner_id, e);
                }
                let _ = response.send(result);
            }

            PortfolioCommand::RemovePosition {
                owner_id,
                asset_id,
                quantity,
                response,
            } => {
                let result = self.remove_position(&owner_id, &asset_id, quantity).await;
                if let Err(e) = &result {
                    error!("Failed to remove position for {}: {}", owner_id, e);
                }
                let _ = response.send(result);
            }

            PortfolioCommand::UpdatePrices {
                owner_id,
                updates,
                response,
            } => {
                let result = self.update_prices(&owner_id, updates).await;
                if let Err(e) = &result {
                    error!("Failed to update prices for {}: {}", owner_id, e);
                }
                let _ = response.send(result);
            }

            PortfolioCommand::GetPerformance { owner_id, response } => {
                let result = self.get_performance(&owner_id).await;
                if let Err(e) = &result {
                    error!("Failed to read performance for {}: {}", owner_id, e);
                }
                let _ = response.send(result);
            }

            PortfolioCommand::GetPosition {
                owner_id,
                asset_id,
                response,
            } => {
                let result = self.get_position(&owner_id, &asset_id).await;
                let _ = response.send(result);
            }
        }
    }

    async fn create(&self, owner_id: &str, name: Option<String>) -> Result<Portfolio> {
        if owner_id.is_empty() {
            bail!("owner id is required");
        }

        let name = name.unwrap_or_else(|| self.config.default_portfolio_name.clone());
        let portfolio = Portfolio::new(owner_id, Some(&name));
        let saved = self.repository.save(portfolio).await?;

        info!("Portfolio created for user {}", owner_id);
        Ok(saved)
    }

    /// Provisions a portfolio on first lookup miss and persists it
    async fn get_or_create(&self, owner_id: &str) -> Result<Portfolio> {
        if let Some(portfolio) = self.repository.find_by_owner(owner_id).await? {
            return Ok(portfolio);
        }
        self.create(owner_id, None).await
    }

    async fn add_position(&self, owner_id: &str, delta: PositionDelta) -> Result<Portfolio> {
        let mut portfolio = self.get_or_create(owner_id).await?;
        portfolio.add_position(&delta)?;
        let saved = self.repository.save(portfolio).await?;

        info!(
            "Position added to portfolio of user {}: {}",
            owner_id, delta.asset_id
        );
        Ok(saved)
    }

    async fn remove_position(
        &self,
        owner_id: &str,
        asset_id: &str,
        quantity: Decimal,
    ) -> Result<Portfolio> {
        let mut portfolio = self.get_or_create(owner_id).await?;
        portfolio.remove_position(asset_id, quantity)?;
        let saved = self.repository.save(portfolio).await?;

        info!(
            "Position removed from portfolio of user {}: {}",
            owner_id, asset_id
        );
        Ok(saved)
    }

    async fn update_prices(
        &self,
        owner_id: &str,
        updates: Vec<PriceUpdate>,
    ) -> Result<Portfolio> {
        let mut portfolio = self.get_or_create(owner_id).await?;
        portfolio.update_prices(&updates);
        let saved = self.repository.save(portfolio).await?;

        info!("Prices updated in portfolio of user {}", owner_id);
        Ok(saved)
    }

    async fn get_performance(&self, owner_id: &str) -> Result<PerformanceSummary> {
        let portfolio = self.get_or_create(owner_id).await?;
        Ok(portfolio.performance())
    }

    /// Read-only: never provisions a portfolio
    async fn get_position(&self, owner_id: &str, asset_id: &str) -> Result<Option<Position>> {
        let portfolio = self.repository.find_by_owner(owner_id).await?;
        Ok(portfolio.and_then(|p| p.position_by_asset(asset_id).cloned()))
    }
}

/// Portfolio service handle for sending commands
#[derive(Clone)]
pub struct PortfolioServiceHandle {
    command_tx: mpsc::Sender<PortfolioCommand>,
}

impl PortfolioServiceHandle {
    pub fn new(command_tx: mpsc::Sender<PortfolioCommand>) -> Self {
        Self { command_tx }
    }

    /// Create a portfolio for a user, with an optional display name
    pub async fn create(
        &self,
        owner_id: impl Into<String>,
        name: Option<String>,
    ) -> Result<Portfolio> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(PortfolioCommand::Create {
                owner_id: owner_id.into(),
                name,
                response: tx,
            })
            .await?;
        rx.await?
    }

    /// Fetch the user's portfolio, provisioning one on first access
    pub async fn get_or_create(&self, owner_id: impl Into<String>) -> Result<Portfolio> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(PortfolioCommand::GetOrCreate {
                owner_id: owner_id.into(),
                response: tx,
            })
            .await?;
        rx.await?
    }

    /// Merge buy activity into the user's portfolio
    pub async fn add_position(
        &self,
        owner_id: impl Into<String>,
        delta: PositionDelta,
    ) -> Result<Portfolio> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(PortfolioCommand::AddPosition {
                owner_id: owner_id.into(),
                delta,
                response: tx,
            })
            .await?;
        rx.await?
    }

    /// Sell quantity out of a position, pruning it when fully sold
    pub async fn remove_position(
        &self,
        owner_id: impl Into<String>,
        asset_id: impl Into<String>,
        quantity: Decimal,
    ) -> Result<Portfolio> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(PortfolioCommand::RemovePosition {
                owner_id: owner_id.into(),
                asset_id: asset_id.into(),
                quantity,
                response: tx,
            })
            .await?;
        rx.await?
    }

    /// Apply market price events to the user's portfolio
    pub async fn update_prices(
        &self,
        owner_id: impl Into<String>,
        updates: Vec<PriceUpdate>,
    ) -> Result<Portfolio> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(PortfolioCommand::UpdatePrices {
                owner_id: owner_id.into(),
                updates,
                response: tx,
            })
            .await?;
        rx.await?
    }

    /// Valuation totals, diversification and position count in one read
    pub async fn get_performance(
        &self,
        owner_id: impl Into<String>,
    ) -> Result<PerformanceSummary> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(PortfolioCommand::GetPerformance {
                owner_id: owner_id.into(),
                response: tx,
            })
            .await?;
        rx.await?
    }

    /// Position held for an asset, or None when the user holds none
    pub async fn get_position(
        &self,
        owner_id: impl Into<String>,
        asset_id: impl Into<String>,
    ) -> Result<Option<Position>> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(PortfolioCommand::GetPosition {
                owner_id: owner_id.into(),
                asset_id: asset_id.into(),
                response: tx,
            })
            .await?;
        rx.await?
    }
}

/// Start portfolio service and return handle
pub async fn start_portfolio_service(
    repository: Arc<dyn PortfolioRepository>,
    config: ServiceConfig,
) -> Result<PortfolioServiceHandle> {
    let (command_tx, command_rx) = mpsc::channel(config.command_channel_capacity);
    let handle = PortfolioServiceHandle::new(command_tx);

    let service = PortfolioService::new(repository, config, command_rx);

    tokio::spawn(async move {
        if let Err(e) = service.run().await {
            error!("Portfolio service error: {}", e);
        }
    });

    info!("Portfolio service started");
    Ok(handle)
}
