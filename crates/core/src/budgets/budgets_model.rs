//! Budget domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::decimal_utils::percentage_of;

/// Domain model representing a monthly category budget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub monthly_limit: Decimal,
    pub period_month: u32,
    pub period_year: i32,
    /// Percentage of the limit at which the budget is flagged as `warning`.
    pub alert_threshold: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new budget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub category: String,
    pub monthly_limit: Decimal,
    /// Defaults to the current month when absent.
    pub period_month: Option<u32>,
    pub period_year: Option<i32>,
    pub alert_threshold: Option<i32>,
}

/// Partial update for an existing budget
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdate {
    pub monthly_limit: Option<Decimal>,
    pub alert_threshold: Option<i32>,
    pub is_active: Option<bool>,
}

impl BudgetUpdate {
    pub fn is_empty(&self) -> bool {
        self.monthly_limit.is_none() && self.alert_threshold.is_none() && self.is_active.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Ok,
    Warning,
    Exceeded,
}

impl BudgetStatus {
    pub fn from_percentage(percentage: i64, alert_threshold: i32) -> Self {
        if percentage >= 100 {
            BudgetStatus::Exceeded
        } else if percentage >= i64::from(alert_threshold) {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Ok
        }
    }
}

/// A budget enriched with the month's spending in its category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetWithSpending {
    #[serde(flatten)]
    pub budget: Budget,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percentage: i64,
    pub status: BudgetStatus,
}

impl BudgetWithSpending {
    pub fn new(budget: Budget, spent: Decimal) -> Self {
        let percentage = percentage_of(spent, budget.monthly_limit);
        let status = BudgetStatus::from_percentage(percentage, budget.alert_threshold);
        BudgetWithSpending {
            remaining: budget.monthly_limit - spent,
            spent,
            percentage,
            status,
            budget,
        }
    }
}
