use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::{Error, Result, ValidationError};
use crate::utils::decimal_utils::ensure_within_max;

use super::portfolio_model::{NewPortfolioHolding, PortfolioHolding, PortfolioHoldingUpdate};
use super::portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};

pub struct PortfolioService {
    repository: Arc<dyn PortfolioRepositoryTrait>,
}

impl PortfolioService {
    pub fn new(repository: Arc<dyn PortfolioRepositoryTrait>) -> Self {
        PortfolioService { repository }
    }

    fn validate_amounts(
        quantity: Option<Decimal>,
        current_value: Option<Decimal>,
        purchase_price: Option<Decimal>,
    ) -> Result<()> {
        if quantity.is_some_and(|q| q <= Decimal::ZERO) {
            return Err(Error::invalid_input("Quantity must be a positive number"));
        }
        if current_value.is_some_and(|v| v < Decimal::ZERO) {
            return Err(Error::invalid_input("Current value cannot be negative"));
        }
        if purchase_price.is_some_and(|p| p < Decimal::ZERO) {
            return Err(Error::invalid_input("Purchase price cannot be negative"));
        }
        for (value, field) in [
            (quantity, "Quantity"),
            (current_value, "Current value"),
            (purchase_price, "Purchase price"),
        ] {
            if let Some(value) = value {
                ensure_within_max(value, field)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn get_holdings(&self, user_id: &str) -> Result<Vec<PortfolioHolding>> {
        self.repository.find_all_portfolio_holdings(user_id).await
    }

    async fn create_holding(
        &self,
        mut new_holding: NewPortfolioHolding,
    ) -> Result<PortfolioHolding> {
        let name = new_holding.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        Self::validate_amounts(
            Some(new_holding.quantity),
            Some(new_holding.current_value),
            new_holding.purchase_price,
        )?;
        new_holding.name = name;
        self.repository.create_holding(new_holding).await
    }

    async fn update_holding(
        &self,
        user_id: &str,
        holding_id: &str,
        update: PortfolioHoldingUpdate,
    ) -> Result<PortfolioHolding> {
        if update.is_empty() {
            return Err(Error::invalid_input("No fields to update"));
        }
        Self::validate_amounts(update.quantity, update.current_value, update.purchase_price)?;
        self.repository
            .update_holding(user_id, holding_id, update)
            .await
    }

    async fn delete_holding(&self, user_id: &str, holding_id: &str) -> Result<()> {
        let deleted = self.repository.delete_holding(user_id, holding_id).await?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Holding {}", holding_id)));
        }
        Ok(())
    }
}
