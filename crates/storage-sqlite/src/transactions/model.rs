//! Database models for transactions.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use finbot_core::transactions::{Transaction, TransactionType};

use crate::utils::parse_decimal_tolerant;

/// Database model for transactions
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub user_id: String,
    pub transaction_type: String,
    pub category: String,
    pub amount: String,
    pub date: NaiveDateTime,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        let transaction_type = db.transaction_type.parse().unwrap_or_else(|_| {
            log::warn!(
                "Unknown transaction type '{}' on {}, reading as expense",
                db.transaction_type,
                db.id
            );
            TransactionType::Expense
        });
        Self {
            amount: parse_decimal_tolerant(&db.amount, "amount"),
            id: db.id,
            user_id: db.user_id,
            transaction_type,
            category: db.category,
            date: db.date,
            description: db.description,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
