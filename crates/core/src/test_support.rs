//! In-memory repositories shared by the service tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::budgets::{Budget, BudgetRepositoryTrait, BudgetUpdate, NewBudget};
use crate::errors::{Error, Result};
use crate::goals::{
    GoalContribution, GoalRepositoryTrait, GoalStatus, GoalStatusFilter, NewSavingGoal,
    SavingGoal, SavingGoalUpdate,
};
use crate::portfolio::{
    NewPortfolioHolding, PortfolioHolding, PortfolioHoldingUpdate, PortfolioRepositoryTrait,
};
use crate::transactions::{
    CategoryTotal, NewTransaction, Transaction, TransactionRepositoryTrait, TransactionType,
    TransactionUpdate,
};
use crate::utils::decimal_utils::checked_sum;

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

fn next_id(prefix: &str) -> String {
    format!("{}-{}", prefix, NEXT_ID.fetch_add(1, Ordering::SeqCst))
}

fn stamp() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn utc(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
}

fn transaction(
    user_id: &str,
    transaction_type: TransactionType,
    category: &str,
    amount: Decimal,
    date: NaiveDateTime,
) -> Transaction {
    Transaction {
        id: next_id("tx"),
        user_id: user_id.to_string(),
        transaction_type,
        category: category.to_string(),
        amount,
        date,
        description: None,
        created_at: stamp(),
        updated_at: stamp(),
    }
}

pub fn expense(user_id: &str, category: &str, amount: Decimal, date: NaiveDateTime) -> Transaction {
    transaction(user_id, TransactionType::Expense, category, amount, date)
}

pub fn income(user_id: &str, category: &str, amount: Decimal, date: NaiveDateTime) -> Transaction {
    transaction(user_id, TransactionType::Income, category, amount, date)
}

pub fn budget(
    user_id: &str,
    category: &str,
    limit: Decimal,
    year: i32,
    month: u32,
    alert_threshold: i32,
) -> Budget {
    Budget {
        id: next_id("budget"),
        user_id: user_id.to_string(),
        category: category.to_string(),
        monthly_limit: limit,
        period_month: month,
        period_year: year,
        alert_threshold,
        is_active: true,
        created_at: stamp(),
        updated_at: stamp(),
    }
}

pub fn goal(
    user_id: &str,
    name: &str,
    target: Decimal,
    current: Decimal,
    deadline: Option<NaiveDateTime>,
) -> SavingGoal {
    SavingGoal {
        id: next_id("goal"),
        user_id: user_id.to_string(),
        name: name.to_string(),
        target_amount: target,
        current_amount: current,
        deadline,
        priority: Default::default(),
        status: GoalStatus::Active,
        icon: None,
        created_at: stamp(),
        updated_at: stamp(),
    }
}

pub fn holding(
    user_id: &str,
    holding_type: &str,
    current_value: Decimal,
    purchase_price: Option<Decimal>,
    quantity: Decimal,
) -> PortfolioHolding {
    PortfolioHolding {
        id: next_id("holding"),
        user_id: user_id.to_string(),
        name: format!("{} holding", holding_type),
        holding_type: holding_type.to_string(),
        symbol: None,
        quantity,
        purchase_price,
        current_value,
        created_at: stamp(),
        updated_at: stamp(),
    }
}

#[derive(Default)]
struct StoreState {
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
    goals: Vec<SavingGoal>,
    contributions: Vec<GoalContribution>,
    holdings: Vec<PortfolioHolding>,
    fail_goals: bool,
}

/// One store backing every finance repository trait.
#[derive(Clone, Default)]
pub struct MockFinanceStore {
    state: Arc<Mutex<StoreState>>,
}

impl MockFinanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_transaction(&self, tx: Transaction) {
        self.state.lock().unwrap().transactions.push(tx);
    }

    pub fn push_budget(&self, budget: Budget) {
        self.state.lock().unwrap().budgets.push(budget);
    }

    pub fn push_goal(&self, goal: SavingGoal) {
        self.state.lock().unwrap().goals.push(goal);
    }

    pub fn push_holding(&self, holding: PortfolioHolding) {
        self.state.lock().unwrap().holdings.push(holding);
    }

    pub fn fail_goals(&self) {
        self.state.lock().unwrap().fail_goals = true;
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().transactions.clone()
    }

    pub fn goals(&self) -> Vec<SavingGoal> {
        self.state.lock().unwrap().goals.clone()
    }

    pub fn contributions(&self) -> Vec<GoalContribution> {
        self.state.lock().unwrap().contributions.clone()
    }
}

#[async_trait]
impl TransactionRepositoryTrait for MockFinanceStore {
    async fn find_transactions_in_range(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id && t.date >= start && t.date <= end)
            .cloned()
            .collect())
    }

    async fn sum_expenses_by_category(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CategoryTotal>> {
        let state = self.state.lock().unwrap();
        let mut totals: Vec<CategoryTotal> = Vec::new();
        for tx in state.transactions.iter().filter(|t| {
            t.user_id == user_id && t.is_expense() && t.date >= start && t.date < end
        }) {
            match totals.iter_mut().find(|row| row.category == tx.category) {
                Some(row) => row.total = checked_sum(row.total, tx.amount)?,
                None => totals.push(CategoryTotal {
                    category: tx.category.clone(),
                    total: tx.amount,
                }),
            }
        }
        Ok(totals)
    }

    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let mut rows: Vec<Transaction> = self
            .state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    fn get_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Transaction> {
        self.state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .find(|t| t.user_id == user_id && t.id == transaction_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", transaction_id)))
    }

    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        let mut tx = transaction(
            &new_transaction.user_id,
            new_transaction.transaction_type,
            &new_transaction.category,
            new_transaction.amount,
            new_transaction.date.unwrap_or_else(stamp),
        );
        tx.description = new_transaction.description;
        self.push_transaction(tx.clone());
        Ok(tx)
    }

    async fn update_transaction(
        &self,
        user_id: &str,
        transaction_id: &str,
        update: TransactionUpdate,
    ) -> Result<Transaction> {
        let mut state = self.state.lock().unwrap();
        let tx = state
            .transactions
            .iter_mut()
            .find(|t| t.user_id == user_id && t.id == transaction_id)
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", transaction_id)))?;
        if let Some(amount) = update.amount {
            tx.amount = amount;
        }
        if let Some(category) = update.category {
            tx.category = category;
        }
        Ok(tx.clone())
    }

    async fn delete_transaction(&self, user_id: &str, transaction_id: &str) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.transactions.len();
        state
            .transactions
            .retain(|t| !(t.user_id == user_id && t.id == transaction_id));
        Ok(before - state.transactions.len())
    }
}

#[async_trait]
impl BudgetRepositoryTrait for MockFinanceStore {
    async fn find_active_budgets_for_month(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<Budget>> {
        self.list_budgets_for_month(user_id, year, month, Some(true))
    }

    fn list_budgets_for_month(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
        active: Option<bool>,
    ) -> Result<Vec<Budget>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .budgets
            .iter()
            .filter(|b| {
                b.user_id == user_id
                    && b.period_year == year
                    && b.period_month == month
                    && (active.is_none() || active == Some(b.is_active))
            })
            .cloned()
            .collect())
    }

    fn find_budget_for_category(
        &self,
        user_id: &str,
        category: &str,
        year: i32,
        month: u32,
    ) -> Result<Option<Budget>> {
        Ok(self
            .list_budgets_for_month(user_id, year, month, None)?
            .into_iter()
            .find(|b| b.category == category))
    }

    async fn create_budget(&self, new_budget: NewBudget) -> Result<Budget> {
        let created = budget(
            &new_budget.user_id,
            &new_budget.category,
            new_budget.monthly_limit,
            new_budget.period_year.unwrap_or(2026),
            new_budget.period_month.unwrap_or(1),
            new_budget.alert_threshold.unwrap_or(80),
        );
        self.push_budget(created.clone());
        Ok(created)
    }

    async fn update_budget(
        &self,
        user_id: &str,
        budget_id: &str,
        update: BudgetUpdate,
    ) -> Result<Budget> {
        let mut state = self.state.lock().unwrap();
        let b = state
            .budgets
            .iter_mut()
            .find(|b| b.user_id == user_id && b.id == budget_id)
            .ok_or_else(|| Error::NotFound(format!("Budget {}", budget_id)))?;
        if let Some(limit) = update.monthly_limit {
            b.monthly_limit = limit;
        }
        if let Some(threshold) = update.alert_threshold {
            b.alert_threshold = threshold;
        }
        if let Some(active) = update.is_active {
            b.is_active = active;
        }
        Ok(b.clone())
    }

    async fn delete_budget(&self, user_id: &str, budget_id: &str) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.budgets.len();
        state
            .budgets
            .retain(|b| !(b.user_id == user_id && b.id == budget_id));
        Ok(before - state.budgets.len())
    }
}

#[async_trait]
impl GoalRepositoryTrait for MockFinanceStore {
    async fn find_active_goals(&self, user_id: &str) -> Result<Vec<SavingGoal>> {
        if self.state.lock().unwrap().fail_goals {
            return Err(Error::Repository("goals unavailable".to_string()));
        }
        self.list_goals(user_id, GoalStatusFilter::Only(GoalStatus::Active))
    }

    fn list_goals(&self, user_id: &str, filter: GoalStatusFilter) -> Result<Vec<SavingGoal>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .goals
            .iter()
            .filter(|g| {
                g.user_id == user_id
                    && match filter {
                        GoalStatusFilter::All => true,
                        GoalStatusFilter::Only(status) => g.status == status,
                    }
            })
            .cloned()
            .collect())
    }

    fn get_goal(&self, user_id: &str, goal_id: &str) -> Result<SavingGoal> {
        self.state
            .lock()
            .unwrap()
            .goals
            .iter()
            .find(|g| g.user_id == user_id && g.id == goal_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Goal {}", goal_id)))
    }

    async fn create_goal(&self, new_goal: NewSavingGoal) -> Result<SavingGoal> {
        let mut created = goal(
            &new_goal.user_id,
            &new_goal.name,
            new_goal.target_amount,
            new_goal.current_amount.unwrap_or(Decimal::ZERO),
            new_goal.deadline,
        );
        created.priority = new_goal.priority.unwrap_or_default();
        created.icon = new_goal.icon;
        self.push_goal(created.clone());
        Ok(created)
    }

    async fn update_goal(
        &self,
        user_id: &str,
        goal_id: &str,
        update: SavingGoalUpdate,
    ) -> Result<SavingGoal> {
        let mut state = self.state.lock().unwrap();
        let g = state
            .goals
            .iter_mut()
            .find(|g| g.user_id == user_id && g.id == goal_id)
            .ok_or_else(|| Error::NotFound(format!("Goal {}", goal_id)))?;
        if let Some(name) = update.name {
            g.name = name;
        }
        if let Some(status) = update.status {
            g.status = status;
        }
        Ok(g.clone())
    }

    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.goals.len();
        state
            .goals
            .retain(|g| !(g.user_id == user_id && g.id == goal_id));
        Ok(before - state.goals.len())
    }

    async fn add_contribution(
        &self,
        user_id: &str,
        goal_id: &str,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<SavingGoal> {
        let mut state = self.state.lock().unwrap();
        let g = state
            .goals
            .iter_mut()
            .find(|g| g.user_id == user_id && g.id == goal_id)
            .ok_or_else(|| Error::NotFound(format!("Goal {}", goal_id)))?;
        g.current_amount = checked_sum(g.current_amount, amount)?;
        if g.current_amount >= g.target_amount {
            g.status = GoalStatus::Completed;
        }
        let updated = g.clone();
        state.contributions.push(GoalContribution {
            id: next_id("contribution"),
            goal_id: goal_id.to_string(),
            amount,
            note,
            contributed_at: stamp(),
        });
        Ok(updated)
    }
}

#[async_trait]
impl PortfolioRepositoryTrait for MockFinanceStore {
    async fn find_all_portfolio_holdings(&self, user_id: &str) -> Result<Vec<PortfolioHolding>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .holdings
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect())
    }

    fn get_holding(&self, user_id: &str, holding_id: &str) -> Result<PortfolioHolding> {
        self.state
            .lock()
            .unwrap()
            .holdings
            .iter()
            .find(|h| h.user_id == user_id && h.id == holding_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Holding {}", holding_id)))
    }

    async fn create_holding(&self, new_holding: NewPortfolioHolding) -> Result<PortfolioHolding> {
        let mut created = holding(
            &new_holding.user_id,
            new_holding.holding_type.as_str(),
            new_holding.current_value,
            new_holding.purchase_price,
            new_holding.quantity,
        );
        created.name = new_holding.name;
        created.symbol = new_holding.symbol;
        self.push_holding(created.clone());
        Ok(created)
    }

    async fn update_holding(
        &self,
        user_id: &str,
        holding_id: &str,
        update: PortfolioHoldingUpdate,
    ) -> Result<PortfolioHolding> {
        let mut state = self.state.lock().unwrap();
        let h = state
            .holdings
            .iter_mut()
            .find(|h| h.user_id == user_id && h.id == holding_id)
            .ok_or_else(|| Error::NotFound(format!("Holding {}", holding_id)))?;
        if let Some(value) = update.current_value {
            h.current_value = value;
        }
        if let Some(quantity) = update.quantity {
            h.quantity = quantity;
        }
        Ok(h.clone())
    }

    async fn delete_holding(&self, user_id: &str, holding_id: &str) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.holdings.len();
        state
            .holdings
            .retain(|h| !(h.user_id == user_id && h.id == holding_id));
        Ok(before - state.holdings.len())
    }
}
