use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use finbot_core::budgets::{Budget, BudgetRepositoryTrait, BudgetUpdate, NewBudget};
use finbot_core::constants::DEFAULT_BUDGET_ALERT_THRESHOLD;
use finbot_core::errors::{Error, ValidationError};
use finbot_core::Result;

use super::model::BudgetDB;
use crate::db::{get_connection, run_blocking, WriteHandle};
use crate::errors::StorageError;
use crate::schema::budgets;
use crate::utils::decimal_to_db;

pub struct BudgetRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl BudgetRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

fn month_column(month: u32) -> i32 {
    i32::try_from(month).unwrap_or(i32::MAX)
}

fn load_for_month(
    conn: &mut SqliteConnection,
    user_id: &str,
    year: i32,
    month: u32,
    active: Option<bool>,
) -> Result<Vec<Budget>> {
    let mut query = budgets::table
        .filter(budgets::user_id.eq(user_id))
        .filter(budgets::period_year.eq(year))
        .filter(budgets::period_month.eq(month_column(month)))
        .into_boxed();
    if let Some(active) = active {
        query = query.filter(budgets::is_active.eq(active));
    }
    let rows = query
        .order(budgets::category.asc())
        .select(BudgetDB::as_select())
        .load::<BudgetDB>(conn)
        .map_err(StorageError::from)?;
    Ok(rows.into_iter().map(Budget::from).collect())
}

#[async_trait]
impl BudgetRepositoryTrait for BudgetRepository {
    async fn find_active_budgets_for_month(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<Budget>> {
        let owner = user_id.to_string();
        run_blocking(&self.pool, move |conn| {
            load_for_month(conn, &owner, year, month, Some(true))
        })
        .await
    }

    fn list_budgets_for_month(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
        active: Option<bool>,
    ) -> Result<Vec<Budget>> {
        let mut conn = get_connection(&self.pool)?;
        load_for_month(&mut conn, user_id, year, month, active)
    }

    fn find_budget_for_category(
        &self,
        user_id: &str,
        category: &str,
        year: i32,
        month: u32,
    ) -> Result<Option<Budget>> {
        let mut conn = get_connection(&self.pool)?;
        let row = budgets::table
            .filter(budgets::user_id.eq(user_id))
            .filter(budgets::category.eq(category))
            .filter(budgets::period_year.eq(year))
            .filter(budgets::period_month.eq(month_column(month)))
            .select(BudgetDB::as_select())
            .first::<BudgetDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Budget::from))
    }

    async fn create_budget(&self, new_budget: NewBudget) -> Result<Budget> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Budget> {
                let (Some(period_month), Some(period_year)) =
                    (new_budget.period_month, new_budget.period_year)
                else {
                    return Err(ValidationError::MissingField("period".to_string()).into());
                };
                let now = Utc::now().naive_utc();
                let row = BudgetDB {
                    id: uuid::Uuid::now_v7().to_string(),
                    user_id: new_budget.user_id,
                    category: new_budget.category,
                    monthly_limit: decimal_to_db(new_budget.monthly_limit),
                    period_month: month_column(period_month),
                    period_year,
                    alert_threshold: new_budget
                        .alert_threshold
                        .unwrap_or(DEFAULT_BUDGET_ALERT_THRESHOLD),
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                };
                diesel::insert_into(budgets::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(Budget::from(row))
            })
            .await
    }

    async fn update_budget(
        &self,
        user_id: &str,
        budget_id: &str,
        update: BudgetUpdate,
    ) -> Result<Budget> {
        let owner = user_id.to_string();
        let target = budget_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Budget> {
                let mut row = budgets::table
                    .filter(budgets::id.eq(&target))
                    .filter(budgets::user_id.eq(&owner))
                    .select(BudgetDB::as_select())
                    .first::<BudgetDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| Error::NotFound(format!("Budget {}", target)))?;

                if let Some(limit) = update.monthly_limit {
                    row.monthly_limit = decimal_to_db(limit);
                }
                if let Some(threshold) = update.alert_threshold {
                    row.alert_threshold = threshold;
                }
                if let Some(is_active) = update.is_active {
                    row.is_active = is_active;
                }
                row.updated_at = Utc::now().naive_utc();

                diesel::update(budgets::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(Budget::from(row))
            })
            .await
    }

    async fn delete_budget(&self, user_id: &str, budget_id: &str) -> Result<usize> {
        let owner = user_id.to_string();
        let target = budget_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(
                    budgets::table
                        .filter(budgets::id.eq(target))
                        .filter(budgets::user_id.eq(owner)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_user, setup};
    use rust_decimal_macros::dec;

    fn food_budget(month: u32) -> NewBudget {
        NewBudget {
            user_id: "u1".to_string(),
            category: "Food".to_string(),
            monthly_limit: dec!(1000000),
            period_month: Some(month),
            period_year: Some(2026),
            alert_threshold: None,
        }
    }

    #[tokio::test]
    async fn active_budgets_filter_by_period_and_flag() {
        let ctx = setup();
        insert_user(&ctx, "u1");
        let repo = BudgetRepository::new(ctx.pool.clone(), ctx.writer.clone());

        let october = repo.create_budget(food_budget(10)).await.unwrap();
        assert_eq!(october.alert_threshold, DEFAULT_BUDGET_ALERT_THRESHOLD);
        repo.create_budget(food_budget(11)).await.unwrap();
        let mut transport = food_budget(10);
        transport.category = "Transport".to_string();
        let transport = repo.create_budget(transport).await.unwrap();
        repo.update_budget(
            "u1",
            &transport.id,
            BudgetUpdate { is_active: Some(false), ..Default::default() },
        )
        .await
        .unwrap();

        let active = repo.find_active_budgets_for_month("u1", 2026, 10).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, october.id);

        let all = repo.list_budgets_for_month("u1", 2026, 10, None).unwrap();
        assert_eq!(all.len(), 2);
        assert!(repo.find_budget_for_category("u1", "Food", 2026, 11).unwrap().is_some());
        assert!(repo.find_budget_for_category("u1", "Food", 2026, 12).unwrap().is_none());
    }

    #[tokio::test]
    async fn update_of_foreign_budget_is_not_found() {
        let ctx = setup();
        insert_user(&ctx, "u1");
        let repo = BudgetRepository::new(ctx.pool.clone(), ctx.writer.clone());
        let created = repo.create_budget(food_budget(10)).await.unwrap();

        let err = repo
            .update_budget("u2", &created.id, BudgetUpdate { monthly_limit: Some(dec!(1)), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(repo.delete_budget("u1", &created.id).await.unwrap(), 1);
    }
}
