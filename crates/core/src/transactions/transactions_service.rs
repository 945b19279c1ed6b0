use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rust_decimal::Decimal;

use crate::constants::UNCATEGORIZED_CATEGORY;
use crate::errors::{Error, Result, ValidationError};
use crate::utils::decimal_utils::ensure_within_max;

use super::transactions_model::{NewTransaction, Transaction, TransactionUpdate};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};

pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
}

impl TransactionService {
    pub fn new(repository: Arc<dyn TransactionRepositoryTrait>) -> Self {
        TransactionService { repository }
    }

    fn validate_amount(amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(Error::invalid_input("Amount must be a positive number"));
        }
        ensure_within_max(amount, "Amount")
    }
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    fn get_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        self.repository.list_transactions(user_id)
    }

    async fn create_transaction(&self, mut new_transaction: NewTransaction) -> Result<Transaction> {
        Self::validate_amount(new_transaction.amount)?;
        let category = new_transaction.category.trim();
        if category.is_empty() {
            return Err(ValidationError::MissingField("category".to_string()).into());
        }
        new_transaction.category = category.to_string();
        if new_transaction.date.is_none() {
            new_transaction.date = Some(Utc::now().naive_utc());
        }
        debug!(
            "Creating {} transaction in '{}'",
            new_transaction.transaction_type, new_transaction.category
        );
        self.repository.create_transaction(new_transaction).await
    }

    async fn update_transaction(
        &self,
        user_id: &str,
        transaction_id: &str,
        mut update: TransactionUpdate,
    ) -> Result<Transaction> {
        if update.is_empty() {
            return Err(Error::invalid_input("No fields to update"));
        }
        if let Some(amount) = update.amount {
            Self::validate_amount(amount)?;
        }
        if let Some(category) = update.category.as_deref() {
            let trimmed = category.trim();
            update.category = Some(if trimmed.is_empty() {
                UNCATEGORIZED_CATEGORY.to_string()
            } else {
                trimmed.to_string()
            });
        }
        self.repository
            .update_transaction(user_id, transaction_id, update)
            .await
    }

    async fn delete_transaction(&self, user_id: &str, transaction_id: &str) -> Result<()> {
        let deleted = self
            .repository
            .delete_transaction(user_id, transaction_id)
            .await?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Transaction {}", transaction_id)));
        }
        Ok(())
    }
}
