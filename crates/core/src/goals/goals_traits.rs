use rust_decimal::Decimal;

use crate::errors::Result;
use crate::goals::goals_model::{
    ContributionOutcome, GoalStatusFilter, NewGoalContribution, NewSavingGoal, SavingGoal,
    SavingGoalUpdate, SavingGoalWithProgress,
};
use async_trait::async_trait;

/// Trait for goal repository operations
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    /// Goals of `user_id` with status `active`.
    async fn find_active_goals(&self, user_id: &str) -> Result<Vec<SavingGoal>>;
    fn list_goals(&self, user_id: &str, filter: GoalStatusFilter) -> Result<Vec<SavingGoal>>;
    fn get_goal(&self, user_id: &str, goal_id: &str) -> Result<SavingGoal>;
    /// Inserts the goal and, when `current_amount > 0`, an initial contribution.
    async fn create_goal(&self, new_goal: NewSavingGoal) -> Result<SavingGoal>;
    async fn update_goal(
        &self,
        user_id: &str,
        goal_id: &str,
        update: SavingGoalUpdate,
    ) -> Result<SavingGoal>;
    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<usize>;
    /// Atomically records a contribution, adds it to `current_amount` and marks
    /// the goal `completed` once the target is reached.
    async fn add_contribution(
        &self,
        user_id: &str,
        goal_id: &str,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<SavingGoal>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    fn get_goals(
        &self,
        user_id: &str,
        filter: GoalStatusFilter,
    ) -> Result<Vec<SavingGoalWithProgress>>;
    async fn create_goal(&self, new_goal: NewSavingGoal) -> Result<SavingGoalWithProgress>;
    async fn update_goal(
        &self,
        user_id: &str,
        goal_id: &str,
        update: SavingGoalUpdate,
    ) -> Result<SavingGoalWithProgress>;
    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<()>;
    async fn contribute(
        &self,
        user_id: &str,
        goal_id: &str,
        contribution: NewGoalContribution,
    ) -> Result<ContributionOutcome>;
}
