use crate::budgets::budgets_model::{Budget, BudgetUpdate, BudgetWithSpending, NewBudget};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for budget repository operations
#[async_trait]
pub trait BudgetRepositoryTrait: Send + Sync {
    /// Active budgets of `user_id` whose period is `year`/`month`.
    async fn find_active_budgets_for_month(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<Budget>>;

    /// Budgets of a period. `active` filters on `is_active` when set.
    fn list_budgets_for_month(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
        active: Option<bool>,
    ) -> Result<Vec<Budget>>;

    fn find_budget_for_category(
        &self,
        user_id: &str,
        category: &str,
        year: i32,
        month: u32,
    ) -> Result<Option<Budget>>;

    async fn create_budget(&self, new_budget: NewBudget) -> Result<Budget>;
    async fn update_budget(
        &self,
        user_id: &str,
        budget_id: &str,
        update: BudgetUpdate,
    ) -> Result<Budget>;
    async fn delete_budget(&self, user_id: &str, budget_id: &str) -> Result<usize>;
}

/// Trait for budget service operations
#[async_trait]
pub trait BudgetServiceTrait: Send + Sync {
    /// Budgets of a period with their spending. `active_only` defaults to true upstream.
    async fn get_budgets(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
        active_only: bool,
    ) -> Result<Vec<BudgetWithSpending>>;
    async fn create_budget(&self, new_budget: NewBudget) -> Result<Budget>;
    async fn update_budget(
        &self,
        user_id: &str,
        budget_id: &str,
        update: BudgetUpdate,
    ) -> Result<Budget>;
    async fn delete_budget(&self, user_id: &str, budget_id: &str) -> Result<()>;
}
