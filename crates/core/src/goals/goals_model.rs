//! Goals domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::utils::decimal_utils::percentage_of;
use crate::utils::time_utils::days_until;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl GoalPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalPriority::Low => "low",
            GoalPriority::Medium => "medium",
            GoalPriority::High => "high",
        }
    }
}

impl FromStr for GoalPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(GoalPriority::Low),
            "medium" => Ok(GoalPriority::Medium),
            "high" => Ok(GoalPriority::High),
            other => Err(Error::invalid_input(format!("Unknown goal priority '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Abandoned,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(GoalStatus::Active),
            "completed" => Ok(GoalStatus::Completed),
            "abandoned" => Ok(GoalStatus::Abandoned),
            other => Err(Error::invalid_input(format!("Unknown goal status '{}'", other))),
        }
    }
}

/// Status filter for listing goals; `all` disables filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatusFilter {
    All,
    Only(GoalStatus),
}

impl FromStr for GoalStatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "all" {
            return Ok(GoalStatusFilter::All);
        }
        s.parse().map(GoalStatusFilter::Only)
    }
}

/// Domain model representing a saving goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavingGoal {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: Option<NaiveDateTime>,
    pub priority: GoalPriority,
    pub status: GoalStatus,
    pub icon: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl SavingGoal {
    /// Percent of the target saved so far, capped at 100. 0 when the target is not positive.
    pub fn progress(&self) -> i64 {
        percentage_of(self.current_amount, self.target_amount).min(100)
    }

    /// Whole days left before the deadline, or `None` when there is no deadline.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.deadline
            .map(|deadline| days_until(deadline.and_utc(), now))
    }
}

/// Input model for creating a new saving goal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSavingGoal {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Option<Decimal>,
    pub deadline: Option<NaiveDateTime>,
    pub priority: Option<GoalPriority>,
    pub icon: Option<String>,
}

/// Partial update for an existing saving goal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingGoalUpdate {
    pub name: Option<String>,
    pub target_amount: Option<Decimal>,
    pub deadline: Option<NaiveDateTime>,
    pub priority: Option<GoalPriority>,
    pub status: Option<GoalStatus>,
    pub icon: Option<String>,
}

impl SavingGoalUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.target_amount.is_none()
            && self.deadline.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.icon.is_none()
    }
}

/// A saving goal with its derived progress figures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavingGoalWithProgress {
    #[serde(flatten)]
    pub goal: SavingGoal,
    pub progress: i64,
    pub days_remaining: Option<i64>,
}

impl SavingGoalWithProgress {
    pub fn new(goal: SavingGoal, now: DateTime<Utc>) -> Self {
        SavingGoalWithProgress {
            progress: goal.progress(),
            days_remaining: goal.days_remaining(now),
            goal,
        }
    }
}

/// A single deposit towards a goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalContribution {
    pub id: String,
    pub goal_id: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub contributed_at: NaiveDateTime,
}

/// Input model for recording a contribution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoalContribution {
    pub amount: Decimal,
    pub note: Option<String>,
}

/// Result of a contribution: the updated goal and a user-facing message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContributionOutcome {
    #[serde(flatten)]
    pub goal: SavingGoal,
    pub progress: i64,
    pub completed: bool,
    pub message: String,
}
