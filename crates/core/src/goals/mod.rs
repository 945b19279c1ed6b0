//! Goals module - saving goals and their contributions.

mod goals_model;
mod goals_service;
mod goals_traits;

pub use goals_model::{
    ContributionOutcome, GoalContribution, GoalPriority, GoalStatus, GoalStatusFilter,
    NewGoalContribution, NewSavingGoal, SavingGoal, SavingGoalUpdate, SavingGoalWithProgress,
};
pub use goals_service::GoalService;
pub use goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
