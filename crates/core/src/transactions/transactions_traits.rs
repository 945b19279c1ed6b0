use chrono::NaiveDateTime;

use crate::errors::Result;
use crate::transactions::transactions_model::{
    CategoryTotal, NewTransaction, Transaction, TransactionUpdate,
};
use async_trait::async_trait;

/// Trait for transaction repository operations
///
/// The range queries are async so callers can issue them concurrently with
/// the other aggregation reads.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Transactions of `user_id` with `start <= date <= end`, both income and expense.
    async fn find_transactions_in_range(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Transaction>>;

    /// Expense totals per category with `start <= date < end`.
    async fn sum_expenses_by_category(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CategoryTotal>>;

    /// All transactions of a user, newest first.
    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>>;
    fn get_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Transaction>;
    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    async fn update_transaction(
        &self,
        user_id: &str,
        transaction_id: &str,
        update: TransactionUpdate,
    ) -> Result<Transaction>;
    async fn delete_transaction(&self, user_id: &str, transaction_id: &str) -> Result<usize>;
}

/// Trait for transaction service operations
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    fn get_transactions(&self, user_id: &str) -> Result<Vec<Transaction>>;
    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    async fn update_transaction(
        &self,
        user_id: &str,
        transaction_id: &str,
        update: TransactionUpdate,
    ) -> Result<Transaction>;
    async fn delete_transaction(&self, user_id: &str, transaction_id: &str) -> Result<()>;
}
