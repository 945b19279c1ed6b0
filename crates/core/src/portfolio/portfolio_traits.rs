use crate::errors::Result;
use crate::portfolio::portfolio_model::{
    NewPortfolioHolding, PortfolioHolding, PortfolioHoldingUpdate,
};
use async_trait::async_trait;

/// Trait for portfolio holding repository operations
#[async_trait]
pub trait PortfolioRepositoryTrait: Send + Sync {
    async fn find_all_portfolio_holdings(&self, user_id: &str) -> Result<Vec<PortfolioHolding>>;
    fn get_holding(&self, user_id: &str, holding_id: &str) -> Result<PortfolioHolding>;
    async fn create_holding(&self, new_holding: NewPortfolioHolding) -> Result<PortfolioHolding>;
    async fn update_holding(
        &self,
        user_id: &str,
        holding_id: &str,
        update: PortfolioHoldingUpdate,
    ) -> Result<PortfolioHolding>;
    async fn delete_holding(&self, user_id: &str, holding_id: &str) -> Result<usize>;
}

/// Trait for portfolio service operations
#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    async fn get_holdings(&self, user_id: &str) -> Result<Vec<PortfolioHolding>>;
    async fn create_holding(&self, new_holding: NewPortfolioHolding) -> Result<PortfolioHolding>;
    async fn update_holding(
        &self,
        user_id: &str,
        holding_id: &str,
        update: PortfolioHoldingUpdate,
    ) -> Result<PortfolioHolding>;
    async fn delete_holding(&self, user_id: &str, holding_id: &str) -> Result<()>;
}
