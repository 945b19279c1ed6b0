use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use log::debug;
use rust_decimal::Decimal;

use crate::constants::DEFAULT_BUDGET_ALERT_THRESHOLD;
use crate::errors::{Error, Result, ValidationError};
use crate::transactions::TransactionRepositoryTrait;
use crate::utils::decimal_utils::ensure_within_max;
use crate::utils::time_utils::{calendar_month_of, month_bounds_utc, DEFAULT_REPORTING_TZ};

use super::budgets_model::{Budget, BudgetUpdate, BudgetWithSpending, NewBudget};
use super::budgets_traits::{BudgetRepositoryTrait, BudgetServiceTrait};

pub struct BudgetService {
    budget_repository: Arc<dyn BudgetRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    timezone: Tz,
}

impl BudgetService {
    pub fn new(
        budget_repository: Arc<dyn BudgetRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    ) -> Self {
        BudgetService {
            budget_repository,
            transaction_repository,
            timezone: DEFAULT_REPORTING_TZ,
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    fn validate_threshold(threshold: i32) -> Result<()> {
        if !(1..=100).contains(&threshold) {
            return Err(Error::invalid_input(
                "Alert threshold must be between 1 and 100",
            ));
        }
        Ok(())
    }

    fn validate_period(year: i32, month: u32) -> Result<()> {
        if !(1..=12).contains(&month) || year < 1970 {
            return Err(Error::invalid_input(format!(
                "Invalid budget period {}/{}",
                month, year
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl BudgetServiceTrait for BudgetService {
    async fn get_budgets(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
        active_only: bool,
    ) -> Result<Vec<BudgetWithSpending>> {
        Self::validate_period(year, month)?;
        let active_filter = if active_only { Some(true) } else { None };
        let budgets = self
            .budget_repository
            .list_budgets_for_month(user_id, year, month, active_filter)?;
        if budgets.is_empty() {
            return Ok(Vec::new());
        }

        let (start, end) = month_bounds_utc(year, month, self.timezone)
            .ok_or_else(|| Error::invalid_input("Invalid budget period"))?;
        let spent_by_category: HashMap<String, Decimal> = self
            .transaction_repository
            .sum_expenses_by_category(user_id, start, end)
            .await?
            .into_iter()
            .map(|row| (row.category, row.total))
            .collect();

        Ok(budgets
            .into_iter()
            .map(|budget| {
                let spent = spent_by_category
                    .get(&budget.category)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                BudgetWithSpending::new(budget, spent)
            })
            .collect())
    }

    async fn create_budget(&self, mut new_budget: NewBudget) -> Result<Budget> {
        let category = new_budget.category.trim().to_string();
        if category.is_empty() {
            return Err(ValidationError::MissingField("category".to_string()).into());
        }
        if new_budget.monthly_limit <= Decimal::ZERO {
            return Err(Error::invalid_input("Monthly limit must be a positive number"));
        }
        ensure_within_max(new_budget.monthly_limit, "Monthly limit")?;

        let (current_year, current_month) = calendar_month_of(Utc::now(), self.timezone);
        let year = new_budget.period_year.unwrap_or(current_year);
        let month = new_budget.period_month.unwrap_or(current_month);
        Self::validate_period(year, month)?;

        let threshold = new_budget
            .alert_threshold
            .unwrap_or(DEFAULT_BUDGET_ALERT_THRESHOLD);
        Self::validate_threshold(threshold)?;

        if self
            .budget_repository
            .find_budget_for_category(&new_budget.user_id, &category, year, month)?
            .is_some()
        {
            return Err(Error::invalid_input(
                "Budget already exists for this category and period",
            ));
        }

        new_budget.category = category;
        new_budget.period_year = Some(year);
        new_budget.period_month = Some(month);
        new_budget.alert_threshold = Some(threshold);
        debug!(
            "Creating budget '{}' for {}/{}",
            new_budget.category, month, year
        );
        self.budget_repository.create_budget(new_budget).await
    }

    async fn update_budget(
        &self,
        user_id: &str,
        budget_id: &str,
        update: BudgetUpdate,
    ) -> Result<Budget> {
        if update.is_empty() {
            return Err(Error::invalid_input("No fields to update"));
        }
        if let Some(limit) = update.monthly_limit {
            if limit <= Decimal::ZERO {
                return Err(Error::invalid_input("Monthly limit must be a positive number"));
            }
            ensure_within_max(limit, "Monthly limit")?;
        }
        if let Some(threshold) = update.alert_threshold {
            Self::validate_threshold(threshold)?;
        }
        self.budget_repository
            .update_budget(user_id, budget_id, update)
            .await
    }

    async fn delete_budget(&self, user_id: &str, budget_id: &str) -> Result<()> {
        let deleted = self.budget_repository.delete_budget(user_id, budget_id).await?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Budget {}", budget_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budgets::BudgetStatus;
    use crate::test_support::{budget, expense, income, utc, MockFinanceStore};
    use rust_decimal_macros::dec;

    fn service(store: &MockFinanceStore) -> BudgetService {
        BudgetService::new(Arc::new(store.clone()), Arc::new(store.clone()))
            .with_timezone(chrono_tz::UTC)
    }

    #[tokio::test]
    async fn budgets_report_month_spending_and_status() {
        let store = MockFinanceStore::new();
        store.push_budget(budget("u1", "Food", dec!(1000), 2026, 3, 80));
        store.push_budget(budget("u1", "Transport", dec!(500), 2026, 3, 80));
        store.push_budget(budget("u1", "Fun", dec!(100), 2026, 3, 80));

        store.push_transaction(expense("u1", "Food", dec!(850), utc(2026, 3, 10)));
        store.push_transaction(expense("u1", "Fun", dec!(120), utc(2026, 3, 31)));
        // Outside the month and income rows never count.
        store.push_transaction(expense("u1", "Transport", dec!(400), utc(2026, 2, 28)));
        store.push_transaction(income("u1", "Transport", dec!(999), utc(2026, 3, 5)));
        // Other users never count.
        store.push_transaction(expense("u2", "Food", dec!(999), utc(2026, 3, 5)));

        let mut budgets = service(&store)
            .get_budgets("u1", 2026, 3, true)
            .await
            .unwrap();
        budgets.sort_by(|a, b| a.budget.category.cmp(&b.budget.category));

        assert_eq!(budgets.len(), 3);
        let food = &budgets[0];
        assert_eq!(food.spent, dec!(850));
        assert_eq!(food.remaining, dec!(150));
        assert_eq!(food.percentage, 85);
        assert_eq!(food.status, BudgetStatus::Warning);

        let fun = &budgets[1];
        assert_eq!(fun.remaining, dec!(-20));
        assert_eq!(fun.status, BudgetStatus::Exceeded);

        let transport = &budgets[2];
        assert_eq!(transport.spent, Decimal::ZERO);
        assert_eq!(transport.percentage, 0);
        assert_eq!(transport.status, BudgetStatus::Ok);
    }

    #[tokio::test]
    async fn duplicate_budget_for_period_is_rejected() {
        let store = MockFinanceStore::new();
        store.push_budget(budget("u1", "Food", dec!(1000), 2026, 3, 80));

        let err = service(&store)
            .create_budget(NewBudget {
                user_id: "u1".to_string(),
                category: "Food".to_string(),
                monthly_limit: dec!(200),
                period_month: Some(3),
                period_year: Some(2026),
                alert_threshold: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn create_applies_default_threshold() {
        let store = MockFinanceStore::new();
        let created = service(&store)
            .create_budget(NewBudget {
                user_id: "u1".to_string(),
                category: "Food".to_string(),
                monthly_limit: dec!(200),
                period_month: Some(4),
                period_year: Some(2026),
                alert_threshold: None,
            })
            .await
            .unwrap();
        assert_eq!(created.alert_threshold, DEFAULT_BUDGET_ALERT_THRESHOLD);
        assert!(created.is_active);
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(BudgetStatus::from_percentage(100, 80), BudgetStatus::Exceeded);
        assert_eq!(BudgetStatus::from_percentage(80, 80), BudgetStatus::Warning);
        assert_eq!(BudgetStatus::from_percentage(79, 80), BudgetStatus::Ok);
    }
}
