//! Financial summary models returned to clients and rendered for the LLM.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Income and expense totals over the rolling summary window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialOverview {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_savings: Decimal,
    /// `d/m/yyyy`
    pub period_start: String,
    pub period_end: String,
}

impl FinancialOverview {
    pub fn empty(period_start: String, period_end: String) -> Self {
        FinancialOverview {
            total_income: Decimal::ZERO,
            total_expense: Decimal::ZERO,
            net_savings: Decimal::ZERO,
            period_start,
            period_end,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryTrend {
    Up,
    Down,
    #[default]
    Stable,
}

impl CategoryTrend {
    pub fn emoji(&self) -> &'static str {
        match self {
            CategoryTrend::Up => "📈",
            CategoryTrend::Down => "📉",
            CategoryTrend::Stable => "➡️",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: String,
    pub total: Decimal,
    /// Share of total expense, rounded to a whole percent.
    pub percentage: i64,
    pub trend: CategoryTrend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_value: Decimal,
    /// Holding type to summed market value, ordered by type name.
    pub allocation: BTreeMap<String, Decimal>,
    pub gain_loss: Decimal,
}

impl Default for PortfolioSummary {
    fn default() -> Self {
        PortfolioSummary {
            total_value: Decimal::ZERO,
            allocation: BTreeMap::new(),
            gain_loss: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub category: String,
    pub limit: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// `round(spent / limit * 100)`, 0 when the limit is zero.
    pub percentage: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub name: String,
    pub progress: i64,
    pub days_remaining: Option<i64>,
}

/// Point-in-time view of a user's finances. Computed on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub overview: FinancialOverview,
    pub top_categories: Vec<CategorySummary>,
    pub portfolio: PortfolioSummary,
    pub budgets: Vec<BudgetSummary>,
    pub goals: Vec<GoalSummary>,
}

impl FinancialSummary {
    /// `round(net_savings / total_income * 100)`, 0 without income.
    pub fn saving_rate(&self) -> i64 {
        crate::utils::decimal_utils::percentage_of(
            self.overview.net_savings,
            self.overview.total_income,
        )
    }
}
