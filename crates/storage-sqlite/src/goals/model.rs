//! Database models for saving goals.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use finbot_core::goals::{GoalContribution, GoalPriority, GoalStatus, SavingGoal};

use crate::utils::parse_decimal_tolerant;

/// Database model for saving goals
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::saving_goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct SavingGoalDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub target_amount: String,
    pub current_amount: String,
    pub deadline: Option<NaiveDateTime>,
    pub priority: String,
    pub status: String,
    pub icon: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for goal contributions
#[derive(Queryable, Identifiable, Insertable, Associations, Selectable, PartialEq, Debug, Clone)]
#[diesel(belongs_to(SavingGoalDB, foreign_key = goal_id))]
#[diesel(table_name = crate::schema::goal_contributions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalContributionDB {
    pub id: String,
    pub goal_id: String,
    pub amount: String,
    pub note: Option<String>,
    pub contributed_at: NaiveDateTime,
}

// Conversion to domain models
impl From<SavingGoalDB> for SavingGoal {
    fn from(db: SavingGoalDB) -> Self {
        Self {
            target_amount: parse_decimal_tolerant(&db.target_amount, "target_amount"),
            current_amount: parse_decimal_tolerant(&db.current_amount, "current_amount"),
            priority: db.priority.parse().unwrap_or_else(|_| GoalPriority::default()),
            status: db.status.parse().unwrap_or_else(|_| {
                log::warn!("Unknown goal status '{}' on {}, reading as active", db.status, db.id);
                GoalStatus::Active
            }),
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            deadline: db.deadline,
            icon: db.icon,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<GoalContributionDB> for GoalContribution {
    fn from(db: GoalContributionDB) -> Self {
        Self {
            amount: parse_decimal_tolerant(&db.amount, "amount"),
            id: db.id,
            goal_id: db.goal_id,
            note: db.note,
            contributed_at: db.contributed_at,
        }
    }
}
