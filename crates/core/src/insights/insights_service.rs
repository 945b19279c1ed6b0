//! Aggregates transactions, budgets, goals and holdings into a `FinancialSummary`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;

use crate::budgets::{Budget, BudgetRepositoryTrait};
use crate::constants::{SUMMARY_WINDOW_DAYS, TOP_CATEGORIES_LIMIT, UNCATEGORIZED_CATEGORY};
use crate::errors::{Error, Result};
use crate::goals::{GoalRepositoryTrait, SavingGoal};
use crate::portfolio::{PortfolioHolding, PortfolioRepositoryTrait};
use crate::transactions::{CategoryTotal, Transaction, TransactionRepositoryTrait};
use crate::utils::decimal_utils::{checked_sum, percentage_of};
use crate::utils::time_utils::{
    calendar_month_of, format_short_date_id, month_bounds_utc, DEFAULT_REPORTING_TZ,
};

use super::context_format::format_financial_context;
use super::insights_model::{
    BudgetSummary, CategorySummary, CategoryTrend, FinancialOverview, FinancialSummary,
    GoalSummary, PortfolioSummary,
};
use super::insights_traits::FinancialContextServiceTrait;

/// Read-only aggregator over the four finance repositories.
///
/// The overview and top categories cover the trailing 30 days while budgets
/// cover the calendar month containing `now`, so the two can disagree on
/// what counts as "recent" spending.
pub struct FinancialContextBuilder {
    transaction_repo: Arc<dyn TransactionRepositoryTrait>,
    budget_repo: Arc<dyn BudgetRepositoryTrait>,
    goal_repo: Arc<dyn GoalRepositoryTrait>,
    portfolio_repo: Arc<dyn PortfolioRepositoryTrait>,
    timezone: Tz,
}

impl FinancialContextBuilder {
    pub fn new(
        transaction_repo: Arc<dyn TransactionRepositoryTrait>,
        budget_repo: Arc<dyn BudgetRepositoryTrait>,
        goal_repo: Arc<dyn GoalRepositoryTrait>,
        portfolio_repo: Arc<dyn PortfolioRepositoryTrait>,
    ) -> Self {
        FinancialContextBuilder {
            transaction_repo,
            budget_repo,
            goal_repo,
            portfolio_repo,
            timezone: DEFAULT_REPORTING_TZ,
        }
    }

    /// Timezone used for calendar months and date labels.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    fn summarize_transactions(
        transactions: &[Transaction],
    ) -> Result<(Decimal, Decimal, Vec<CategorySummary>)> {
        let mut total_income = Decimal::ZERO;
        let mut total_expense = Decimal::ZERO;
        let mut by_category: HashMap<&str, Decimal> = HashMap::new();

        for tx in transactions {
            if tx.is_income() {
                total_income = checked_sum(total_income, tx.amount)?;
            } else if tx.is_expense() {
                total_expense = checked_sum(total_expense, tx.amount)?;
                let category = match tx.category.trim() {
                    "" => UNCATEGORIZED_CATEGORY,
                    name => name,
                };
                let total = by_category.entry(category).or_insert(Decimal::ZERO);
                *total = checked_sum(*total, tx.amount)?;
            }
        }

        let mut ranked: Vec<(&str, Decimal)> = by_category.into_iter().collect();
        // Ties are broken by name so the output is stable.
        ranked.sort_by(|(a_name, a_total), (b_name, b_total)| {
            b_total.cmp(a_total).then_with(|| a_name.cmp(b_name))
        });

        let top_categories = ranked
            .into_iter()
            .take(TOP_CATEGORIES_LIMIT)
            .map(|(category, total)| CategorySummary {
                category: category.to_string(),
                total,
                percentage: percentage_of(total, total_expense),
                // Trend needs history this summary does not load.
                trend: CategoryTrend::Stable,
            })
            .collect();

        Ok((total_income, total_expense, top_categories))
    }

    fn summarize_portfolio(holdings: &[PortfolioHolding]) -> Result<PortfolioSummary> {
        let mut total_value = Decimal::ZERO;
        let mut total_cost = Decimal::ZERO;
        let mut allocation: BTreeMap<String, Decimal> = BTreeMap::new();

        for holding in holdings {
            let value = holding.market_value()?;
            total_value = checked_sum(total_value, value)?;
            total_cost = checked_sum(total_cost, holding.cost_basis()?)?;
            let bucket = allocation
                .entry(holding.allocation_key().to_string())
                .or_insert(Decimal::ZERO);
            *bucket = checked_sum(*bucket, value)?;
        }

        Ok(PortfolioSummary {
            total_value,
            allocation,
            gain_loss: total_value - total_cost,
        })
    }

    fn summarize_budgets(budgets: Vec<Budget>, month_spend: Vec<CategoryTotal>) -> Vec<BudgetSummary> {
        let spent_by_category: HashMap<String, Decimal> = month_spend
            .into_iter()
            .map(|row| (row.category, row.total))
            .collect();

        budgets
            .into_iter()
            .map(|budget| {
                let spent = spent_by_category
                    .get(&budget.category)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                BudgetSummary {
                    percentage: percentage_of(spent, budget.monthly_limit),
                    remaining: budget.monthly_limit - spent,
                    limit: budget.monthly_limit,
                    spent,
                    category: budget.category,
                }
            })
            .collect()
    }

    fn summarize_goals(goals: Vec<SavingGoal>, now: DateTime<Utc>) -> Vec<GoalSummary> {
        goals
            .into_iter()
            .map(|goal| GoalSummary {
                progress: goal.progress(),
                days_remaining: goal.days_remaining(now),
                name: goal.name,
            })
            .collect()
    }
}

#[async_trait]
impl FinancialContextServiceTrait for FinancialContextBuilder {
    async fn get_financial_summary(&self, user_id: &str) -> Result<FinancialSummary> {
        self.get_financial_summary_at(user_id, Utc::now()).await
    }

    async fn get_financial_summary_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<FinancialSummary> {
        let window_start = now - Duration::days(SUMMARY_WINDOW_DAYS);
        let (year, month) = calendar_month_of(now, self.timezone);
        let (month_start, month_end) = month_bounds_utc(year, month, self.timezone)
            .ok_or_else(|| Error::Unexpected(format!("Invalid calendar month {}/{}", month, year)))?;

        let (transactions, holdings, budgets, goals, month_spend) = futures::try_join!(
            self.transaction_repo.find_transactions_in_range(
                user_id,
                window_start.naive_utc(),
                now.naive_utc()
            ),
            self.portfolio_repo.find_all_portfolio_holdings(user_id),
            self.budget_repo
                .find_active_budgets_for_month(user_id, year, month),
            self.goal_repo.find_active_goals(user_id),
            self.transaction_repo
                .sum_expenses_by_category(user_id, month_start, month_end),
        )?;

        let (total_income, total_expense, top_categories) =
            Self::summarize_transactions(&transactions)?;
        let portfolio = Self::summarize_portfolio(&holdings)?;

        Ok(FinancialSummary {
            overview: FinancialOverview {
                total_income,
                total_expense,
                net_savings: total_income - total_expense,
                period_start: format_short_date_id(window_start, self.timezone),
                period_end: format_short_date_id(now, self.timezone),
            },
            top_categories,
            portfolio,
            budgets: Self::summarize_budgets(budgets, month_spend),
            goals: Self::summarize_goals(goals, now),
        })
    }

    async fn build_financial_context(&self, user_id: &str) -> Result<String> {
        let summary = self.get_financial_summary(user_id).await?;
        Ok(format_financial_context(&summary))
    }
}
