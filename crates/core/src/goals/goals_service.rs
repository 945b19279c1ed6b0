use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use rust_decimal::Decimal;

use crate::errors::{Error, Result, ValidationError};
use crate::utils::decimal_utils::ensure_within_max;

use super::goals_model::{
    ContributionOutcome, GoalStatus, GoalStatusFilter, NewGoalContribution, NewSavingGoal,
    SavingGoalUpdate, SavingGoalWithProgress,
};
use super::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};

const GOAL_COMPLETED_MESSAGE: &str = "Congratulations! Goal completed!";
const CONTRIBUTION_ADDED_MESSAGE: &str = "Contribution added successfully";

pub struct GoalService {
    goal_repo: Arc<dyn GoalRepositoryTrait>,
}

impl GoalService {
    pub fn new(goal_repo: Arc<dyn GoalRepositoryTrait>) -> Self {
        GoalService { goal_repo }
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    fn get_goals(
        &self,
        user_id: &str,
        filter: GoalStatusFilter,
    ) -> Result<Vec<SavingGoalWithProgress>> {
        let now = Utc::now();
        Ok(self
            .goal_repo
            .list_goals(user_id, filter)?
            .into_iter()
            .map(|goal| SavingGoalWithProgress::new(goal, now))
            .collect())
    }

    async fn create_goal(&self, mut new_goal: NewSavingGoal) -> Result<SavingGoalWithProgress> {
        let name = new_goal.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if new_goal.target_amount <= Decimal::ZERO {
            return Err(Error::invalid_input("Target amount must be a positive number"));
        }
        if new_goal.current_amount.is_some_and(|amount| amount < Decimal::ZERO) {
            return Err(Error::invalid_input("Current amount cannot be negative"));
        }
        ensure_within_max(new_goal.target_amount, "Target amount")?;
        if let Some(current) = new_goal.current_amount {
            ensure_within_max(current, "Current amount")?;
        }
        new_goal.name = name;
        let goal = self.goal_repo.create_goal(new_goal).await?;
        Ok(SavingGoalWithProgress::new(goal, Utc::now()))
    }

    async fn update_goal(
        &self,
        user_id: &str,
        goal_id: &str,
        update: SavingGoalUpdate,
    ) -> Result<SavingGoalWithProgress> {
        if update.is_empty() {
            return Err(Error::invalid_input("No fields to update"));
        }
        if let Some(target) = update.target_amount {
            if target <= Decimal::ZERO {
                return Err(Error::invalid_input("Target amount must be a positive number"));
            }
            ensure_within_max(target, "Target amount")?;
        }
        let goal = self.goal_repo.update_goal(user_id, goal_id, update).await?;
        Ok(SavingGoalWithProgress::new(goal, Utc::now()))
    }

    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<()> {
        let deleted = self.goal_repo.delete_goal(user_id, goal_id).await?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Goal {}", goal_id)));
        }
        Ok(())
    }

    async fn contribute(
        &self,
        user_id: &str,
        goal_id: &str,
        contribution: NewGoalContribution,
    ) -> Result<ContributionOutcome> {
        if contribution.amount <= Decimal::ZERO {
            return Err(Error::invalid_input("Amount must be a positive number"));
        }
        ensure_within_max(contribution.amount, "Amount")?;

        let goal = self.goal_repo.get_goal(user_id, goal_id)?;
        if goal.status != GoalStatus::Active {
            return Err(Error::invalid_input("Cannot contribute to a non-active goal"));
        }

        debug!("Adding contribution of {} to goal {}", contribution.amount, goal_id);
        let note = contribution
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let updated = self
            .goal_repo
            .add_contribution(user_id, goal_id, contribution.amount, note)
            .await?;

        let completed = updated.current_amount >= updated.target_amount;
        if completed {
            info!("Goal {} reached its target", goal_id);
        }
        Ok(ContributionOutcome {
            progress: updated.progress(),
            completed,
            message: if completed {
                GOAL_COMPLETED_MESSAGE
            } else {
                CONTRIBUTION_ADDED_MESSAGE
            }
            .to_string(),
            goal: updated,
        })
    }
}
