//! Database models for budgets.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use finbot_core::budgets::Budget;

use crate::utils::parse_decimal_tolerant;

/// Database model for budgets
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::budgets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BudgetDB {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub monthly_limit: String,
    pub period_month: i32,
    pub period_year: i32,
    pub alert_threshold: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<BudgetDB> for Budget {
    fn from(db: BudgetDB) -> Self {
        Self {
            monthly_limit: parse_decimal_tolerant(&db.monthly_limit, "monthly_limit"),
            id: db.id,
            user_id: db.user_id,
            category: db.category,
            period_month: u32::try_from(db.period_month).unwrap_or_default(),
            period_year: db.period_year,
            alert_threshold: db.alert_threshold,
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
