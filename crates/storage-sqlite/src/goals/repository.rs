use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use finbot_core::constants::INITIAL_CONTRIBUTION_NOTE;
use finbot_core::errors::Error;
use finbot_core::goals::{
    GoalContribution, GoalRepositoryTrait, GoalStatus, GoalStatusFilter, NewSavingGoal, SavingGoal,
    SavingGoalUpdate,
};
use finbot_core::utils::decimal_utils::checked_sum;
use finbot_core::Result;

use super::model::{GoalContributionDB, SavingGoalDB};
use crate::db::{get_connection, run_blocking, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{goal_contributions, saving_goals};
use crate::utils::decimal_to_db;

pub struct GoalRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        GoalRepository { pool, writer }
    }

    /// Contributions of a goal, oldest first.
    pub fn load_contributions(&self, goal_id: &str) -> Result<Vec<GoalContribution>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goal_contributions::table
            .filter(goal_contributions::goal_id.eq(goal_id))
            .order(goal_contributions::contributed_at.asc())
            .select(GoalContributionDB::as_select())
            .load::<GoalContributionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(GoalContribution::from).collect())
    }
}

fn find_owned(conn: &mut SqliteConnection, owner: &str, goal_id: &str) -> Result<SavingGoalDB> {
    saving_goals::table
        .filter(saving_goals::id.eq(goal_id))
        .filter(saving_goals::user_id.eq(owner))
        .select(SavingGoalDB::as_select())
        .first::<SavingGoalDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::NotFound(format!("Goal {}", goal_id)))
}

fn insert_contribution(
    conn: &mut SqliteConnection,
    goal_id: &str,
    amount: Decimal,
    note: Option<String>,
) -> Result<()> {
    diesel::insert_into(goal_contributions::table)
        .values(&GoalContributionDB {
            id: uuid::Uuid::now_v7().to_string(),
            goal_id: goal_id.to_string(),
            amount: decimal_to_db(amount),
            note,
            contributed_at: Utc::now().naive_utc(),
        })
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    async fn find_active_goals(&self, user_id: &str) -> Result<Vec<SavingGoal>> {
        let owner = user_id.to_string();
        run_blocking(&self.pool, move |conn| {
            let rows = saving_goals::table
                .filter(saving_goals::user_id.eq(owner))
                .filter(saving_goals::status.eq(GoalStatus::Active.as_str()))
                .order(saving_goals::created_at.asc())
                .select(SavingGoalDB::as_select())
                .load::<SavingGoalDB>(conn)
                .map_err(StorageError::from)?;
            Ok(rows.into_iter().map(SavingGoal::from).collect())
        })
        .await
    }

    fn list_goals(&self, user_id: &str, filter: GoalStatusFilter) -> Result<Vec<SavingGoal>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = saving_goals::table
            .filter(saving_goals::user_id.eq(user_id))
            .into_boxed();
        if let GoalStatusFilter::Only(status) = filter {
            query = query.filter(saving_goals::status.eq(status.as_str()));
        }
        let rows = query
            .order(saving_goals::created_at.desc())
            .select(SavingGoalDB::as_select())
            .load::<SavingGoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(SavingGoal::from).collect())
    }

    fn get_goal(&self, user_id: &str, goal_id: &str) -> Result<SavingGoal> {
        let mut conn = get_connection(&self.pool)?;
        find_owned(&mut conn, user_id, goal_id).map(SavingGoal::from)
    }

    async fn create_goal(&self, new_goal: NewSavingGoal) -> Result<SavingGoal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<SavingGoal> {
                let now = Utc::now().naive_utc();
                let current = new_goal.current_amount.unwrap_or(Decimal::ZERO);
                let row = SavingGoalDB {
                    id: uuid::Uuid::now_v7().to_string(),
                    user_id: new_goal.user_id,
                    name: new_goal.name,
                    target_amount: decimal_to_db(new_goal.target_amount),
                    current_amount: decimal_to_db(current),
                    deadline: new_goal.deadline,
                    priority: new_goal.priority.unwrap_or_default().as_str().to_string(),
                    status: GoalStatus::Active.as_str().to_string(),
                    icon: new_goal.icon,
                    created_at: now,
                    updated_at: now,
                };
                diesel::insert_into(saving_goals::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                if current > Decimal::ZERO {
                    insert_contribution(
                        conn,
                        &row.id,
                        current,
                        Some(INITIAL_CONTRIBUTION_NOTE.to_string()),
                    )?;
                }
                Ok(SavingGoal::from(row))
            })
            .await
    }

    async fn update_goal(
        &self,
        user_id: &str,
        goal_id: &str,
        update: SavingGoalUpdate,
    ) -> Result<SavingGoal> {
        let owner = user_id.to_string();
        let target = goal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<SavingGoal> {
                let mut row = find_owned(conn, &owner, &target)?;
                if let Some(name) = update.name {
                    row.name = name;
                }
                if let Some(amount) = update.target_amount {
                    row.target_amount = decimal_to_db(amount);
                }
                if let Some(deadline) = update.deadline {
                    row.deadline = Some(deadline);
                }
                if let Some(priority) = update.priority {
                    row.priority = priority.as_str().to_string();
                }
                if let Some(status) = update.status {
                    row.status = status.as_str().to_string();
                }
                if let Some(icon) = update.icon {
                    row.icon = Some(icon);
                }
                row.updated_at = Utc::now().naive_utc();

                diesel::update(saving_goals::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(SavingGoal::from(row))
            })
            .await
    }

    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<usize> {
        let owner = user_id.to_string();
        let target = goal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(
                    saving_goals::table
                        .filter(saving_goals::id.eq(target))
                        .filter(saving_goals::user_id.eq(owner)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }

    async fn add_contribution(
        &self,
        user_id: &str,
        goal_id: &str,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<SavingGoal> {
        let owner = user_id.to_string();
        let target = goal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<SavingGoal> {
                let mut goal = SavingGoal::from(find_owned(conn, &owner, &target)?);
                if goal.status != GoalStatus::Active {
                    return Err(Error::invalid_input("Cannot contribute to a non-active goal"));
                }

                goal.current_amount = checked_sum(goal.current_amount, amount)?;
                insert_contribution(conn, &goal.id, amount, note)?;

                if goal.current_amount >= goal.target_amount {
                    goal.status = GoalStatus::Completed;
                }
                goal.updated_at = Utc::now().naive_utc();

                diesel::update(saving_goals::table.find(&goal.id))
                    .set((
                        saving_goals::current_amount.eq(decimal_to_db(goal.current_amount)),
                        saving_goals::status.eq(goal.status.as_str()),
                        saving_goals::updated_at.eq(goal.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(goal)
            })
            .await
    }
}
