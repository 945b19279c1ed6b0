//! SQLite storage implementation for saving goals and their contributions.

mod model;
mod repository;

pub use model::{GoalContributionDB, SavingGoalDB};
pub use repository::GoalRepository;
